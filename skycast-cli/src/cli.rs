use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use skycast_core::{
    Config, FavoriteToggle, FileStore, IpLocationSource, Theme, WeatherApp, WeatherClient,
    WeatherRecord,
};

use crate::view::TerminalView;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather lookups with local preferences")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "New York".
        city: String,
    },

    /// Show current weather for your approximate location.
    Here,

    /// List recent searches, or search one again by its number.
    History {
        /// 1-based entry number to search again.
        index: Option<usize>,
    },

    /// List favorite cities.
    Favorites,

    /// Fetch a city and toggle it as a favorite.
    Fav {
        /// City name.
        city: String,

        /// Remove from favorites by name, without fetching.
        #[arg(long)]
        remove: bool,
    },

    /// Show or set the color theme.
    Theme {
        /// New theme; omit to print the current one.
        #[arg(value_parser = ["light", "dark"])]
        value: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        let store = FileStore::open_default()?;
        let app = WeatherApp::new(WeatherClient::from_config(&config), store);
        let view = TerminalView;

        match self.command {
            None => summary(&app),
            Some(Command::Configure) => configure(config),
            Some(Command::Show { city }) => {
                search(&app, &city, &view).await;
                Ok(())
            }
            Some(Command::Here) => {
                let source = IpLocationSource::new();
                match app.locate_and_search(&source, &view).await {
                    Ok(_) => Ok(()),
                    // The view has already shown the message.
                    Err(_) => std::process::exit(1),
                }
            }
            Some(Command::History { index }) => match index {
                None => {
                    let history = app.preferences().history()?;
                    if history.is_empty() {
                        println!("No recent searches yet. Try `skycast show London`.");
                    } else {
                        for (position, city) in history.iter().enumerate() {
                            println!("{}. {}", position + 1, city);
                        }
                    }
                    Ok(())
                }
                Some(index) => {
                    let history = app.preferences().history()?;
                    let city = index
                        .checked_sub(1)
                        .and_then(|i| history.get(i))
                        .with_context(|| {
                            format!("No history entry {index}; run `skycast history` to list them")
                        })?
                        .clone();
                    search(&app, &city, &view).await;
                    Ok(())
                }
            },
            Some(Command::Favorites) => {
                let favorites = app.preferences().favorites()?;
                if favorites.is_empty() {
                    println!("No favorites yet. Try `skycast fav London`.");
                } else {
                    for entry in &favorites {
                        println!("★ {}, {}  {}°C", entry.name, entry.country, entry.temp_c);
                    }
                }
                Ok(())
            }
            Some(Command::Fav { city, remove }) => {
                if remove {
                    app.preferences().remove_favorite(&city)?;
                    println!("Removed \"{city}\" from favorites.");
                    return Ok(());
                }

                let record = search(&app, &city, &view).await;
                match app.toggle_favorite(&record)? {
                    FavoriteToggle::Added => {
                        println!("Added \"{}\" to favorites.", record.location_name);
                    }
                    FavoriteToggle::Removed => {
                        println!("Removed \"{}\" from favorites.", record.location_name);
                    }
                }
                Ok(())
            }
            Some(Command::Theme { value }) => {
                match value {
                    None => println!("Theme: {}", app.preferences().theme()?),
                    Some(value) => {
                        let theme = Theme::from_stored(&value);
                        app.preferences().set_theme(theme)?;
                        println!("Theme set to {theme}.");
                    }
                }
                Ok(())
            }
        }
    }
}

/// Run a search against the shared view, exiting with code 1 on failure.
async fn search(app: &WeatherApp<FileStore>, city: &str, view: &TerminalView) -> WeatherRecord {
    match app.search_city(city, view).await {
        Ok(record) => record,
        // The view has already shown the message.
        Err(_) => std::process::exit(1),
    }
}

fn configure(mut config: Config) -> Result<()> {
    let entered = inquire::Text::new("OpenWeather API key:")
        .with_help_message("Free keys: https://openweathermap.org/api")
        .prompt()?;

    let entered = entered.trim();
    if entered.is_empty() {
        bail!("No key entered; configuration left unchanged");
    }

    config.set_api_key(entered.to_string());
    config.save()?;
    println!("API key saved to {}.", Config::config_file_path()?.display());
    Ok(())
}

/// Startup summary of persisted state, shown when no subcommand is given.
fn summary(app: &WeatherApp<FileStore>) -> Result<()> {
    let prefs = app.preferences();

    println!("Theme: {}", prefs.theme()?);

    let history = prefs.history()?;
    if history.is_empty() {
        println!("No recent searches yet. Try `skycast show London`.");
    } else {
        println!("Recent searches:");
        for (position, city) in history.iter().enumerate() {
            println!("  {}. {}", position + 1, city);
        }
    }

    let favorites = prefs.favorites()?;
    if !favorites.is_empty() {
        println!("Favorites:");
        for entry in &favorites {
            println!("  ★ {}, {}  {}°C", entry.name, entry.country, entry.temp_c);
        }
    }

    Ok(())
}
