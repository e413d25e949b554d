use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinates, as supplied by a location source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Normalized current-weather reading for one place.
///
/// Derived from a provider response; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    /// Relative humidity, clamped to 0..=100 during normalization.
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed_ms: f64,
    /// Coarse category as reported by the provider, e.g. "Clear" or "Rain".
    pub condition_category: String,
    pub condition_description: String,
    pub observed_at: DateTime<Utc>,
}

impl WeatherRecord {
    /// Every float field must be finite; returns the offending field name.
    pub fn validate(&self) -> Result<(), &'static str> {
        let fields = [
            (self.temperature_c, "main.temp"),
            (self.feels_like_c, "main.feels_like"),
            (self.pressure_hpa, "main.pressure"),
            (self.wind_speed_ms, "wind.speed"),
        ];

        for (value, name) in fields {
            if !value.is_finite() {
                return Err(name);
            }
        }

        Ok(())
    }

    pub fn condition_kind(&self) -> ConditionKind {
        ConditionKind::from_category(&self.condition_category)
    }
}

/// A place saved by the user, with the reading captured at save time.
///
/// The temperature is a snapshot; it is not refreshed later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub name: String,
    pub country: String,
    pub temp_c: i32,
}

impl FavoriteEntry {
    pub fn from_record(record: &WeatherRecord) -> Self {
        Self {
            name: record.location_name.clone(),
            country: record.country_code.clone(),
            temp_c: record.temperature_c.round() as i32,
        }
    }
}

/// Display theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parse a stored value; anything other than "dark" is the default.
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" { Theme::Dark } else { Theme::Light }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather condition categories the provider reports.
///
/// Categories outside the known set map to `Other`, which still carries a
/// usable icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Smoke,
    Haze,
    Dust,
    Fog,
    Sand,
    Ash,
    Squall,
    Tornado,
    Other,
}

impl ConditionKind {
    pub fn from_category(category: &str) -> Self {
        match category {
            "Clear" => Self::Clear,
            "Clouds" => Self::Clouds,
            "Rain" => Self::Rain,
            "Drizzle" => Self::Drizzle,
            "Thunderstorm" => Self::Thunderstorm,
            "Snow" => Self::Snow,
            "Mist" => Self::Mist,
            "Smoke" => Self::Smoke,
            "Haze" => Self::Haze,
            "Dust" => Self::Dust,
            "Fog" => Self::Fog,
            "Sand" => Self::Sand,
            "Ash" => Self::Ash,
            "Squall" => Self::Squall,
            "Tornado" => Self::Tornado,
            _ => Self::Other,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::Clouds => "☁️",
            Self::Rain => "🌧️",
            Self::Drizzle => "🌦️",
            Self::Thunderstorm => "⛈️",
            Self::Snow => "❄️",
            Self::Mist | Self::Haze | Self::Fog => "🌫️",
            Self::Smoke | Self::Squall => "💨",
            Self::Dust | Self::Sand | Self::Tornado => "🌪️",
            Self::Ash => "🌋",
            Self::Other => "🌤️",
        }
    }

    /// Short human-readable name for the category.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "Clear sky",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Mist => "Mist",
            Self::Smoke => "Smoke",
            Self::Haze => "Haze",
            Self::Dust => "Dust",
            Self::Fog => "Fog",
            Self::Sand => "Sand",
            Self::Ash => "Volcanic ash",
            Self::Squall => "Squall",
            Self::Tornado => "Tornado",
            Self::Other => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_record() -> WeatherRecord {
        WeatherRecord {
            location_name: "London".to_string(),
            country_code: "GB".to_string(),
            temperature_c: 17.6,
            feels_like_c: 16.9,
            humidity_pct: 72,
            pressure_hpa: 1013.0,
            wind_speed_ms: 4.1,
            condition_category: "Clouds".to_string(),
            condition_description: "broken clouds".to_string(),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn known_categories_map_to_their_icon() {
        assert_eq!(ConditionKind::from_category("Clear"), ConditionKind::Clear);
        assert_eq!(ConditionKind::from_category("Rain"), ConditionKind::Rain);
        assert_eq!(ConditionKind::Clear.emoji(), "☀️");
        assert_eq!(ConditionKind::Thunderstorm.emoji(), "⛈️");
    }

    #[test]
    fn unknown_category_falls_back_to_default_icon() {
        let kind = ConditionKind::from_category("Sharknado");
        assert_eq!(kind, ConditionKind::Other);
        assert_eq!(kind.emoji(), "🌤️");
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(ConditionKind::Clear.label(), "Clear sky");
        assert_eq!(ConditionKind::Ash.label(), "Volcanic ash");
        assert_eq!(ConditionKind::from_category("Sharknado").label(), "Unknown");
    }

    #[test]
    fn validate_accepts_finite_fields() {
        assert!(sample_record().validate().is_ok());
    }

    #[test]
    fn validate_names_the_non_finite_field() {
        let mut record = sample_record();
        record.wind_speed_ms = f64::NAN;
        assert_eq!(record.validate(), Err("wind.speed"));

        let mut record = sample_record();
        record.temperature_c = f64::INFINITY;
        assert_eq!(record.validate(), Err("main.temp"));
    }

    #[test]
    fn favorite_snapshot_rounds_temperature() {
        let record = sample_record();
        let favorite = FavoriteEntry::from_record(&record);
        assert_eq!(favorite.name, "London");
        assert_eq!(favorite.country, "GB");
        assert_eq!(favorite.temp_c, 18);
    }

    #[test]
    fn theme_round_trips_and_defaults_to_light() {
        assert_eq!(Theme::from_stored("dark"), Theme::Dark);
        assert_eq!(Theme::from_stored("light"), Theme::Light);
        assert_eq!(Theme::from_stored("solarized"), Theme::Light);
        assert_eq!(Theme::Dark.as_str(), "dark");
        assert_eq!(Theme::default(), Theme::Light);
    }
}
