use chrono::Local;
use skycast_core::{ErrorKind, WeatherRecord, WeatherView};

/// Renders fetch outcomes on the terminal: the weather card goes to stdout,
/// progress and problems to stderr.
pub struct TerminalView;

impl WeatherView for TerminalView {
    fn on_loading_changed(&self, loading: bool) {
        if loading {
            eprintln!("Fetching current weather...");
        }
    }

    fn on_success(&self, record: &WeatherRecord) {
        println!();
        println!(
            "  {}  {}, {}",
            record.condition_kind().emoji(),
            record.location_name,
            record.country_code
        );
        println!(
            "  {}°C, feels like {}°C",
            record.temperature_c.round(),
            record.feels_like_c.round()
        );
        println!("  {}", condition_line(record));
        println!("  {}", metrics_line(record));
        println!(
            "  Observed {}",
            record
                .observed_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
        );
        println!();
    }

    fn on_error(&self, _kind: ErrorKind, message: &str) {
        eprintln!("{message}");
    }
}

/// The provider's detailed description, or the coarse category label when
/// the description is blank.
fn condition_line(record: &WeatherRecord) -> &str {
    if record.condition_description.is_empty() {
        record.condition_kind().label()
    } else {
        record.condition_description.as_str()
    }
}

fn metrics_line(record: &WeatherRecord) -> String {
    format!(
        "Humidity {}%  Wind {:.1} m/s  Pressure {} hPa",
        record.humidity_pct, record.wind_speed_ms, record.pressure_hpa
    )
}
