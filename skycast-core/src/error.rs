use thiserror::Error;

/// Failure of one fetch action, shown to the user verbatim.
///
/// Every variant is terminal for the action that produced it; none are fatal
/// to the process. The Display strings are the user-facing messages, so they
/// stay free of internal jargon.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Please enter a city name.")]
    EmptyInput,

    #[error(
        "API key not configured.\n\
         Hint: run `skycast configure` or set SKYCAST_API_KEY."
    )]
    Unconfigured,

    #[error("City \"{0}\" not found. Please try another one.")]
    NotFound(String),

    #[error("Invalid API key. Please check your configuration.")]
    Unauthorized,

    #[error("Weather service error: {0}")]
    Provider(String),

    #[error("Failed to fetch weather data. Please check your connection.")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response from the weather service: {0}")]
    Parse(String),

    #[error("Location lookup is not available. Please search by city name.")]
    GeolocationUnavailable,

    #[error("Unable to get your location. Please enable location access.")]
    GeolocationDenied,
}

/// Discriminant handed to the view next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyInput,
    Unconfigured,
    NotFound,
    Unauthorized,
    Provider,
    Network,
    Parse,
    GeolocationUnavailable,
    GeolocationDenied,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::EmptyInput => ErrorKind::EmptyInput,
            FetchError::Unconfigured => ErrorKind::Unconfigured,
            FetchError::NotFound(_) => ErrorKind::NotFound,
            FetchError::Unauthorized => ErrorKind::Unauthorized,
            FetchError::Provider(_) => ErrorKind::Provider,
            FetchError::Network(_) => ErrorKind::Network,
            FetchError::Parse(_) => ErrorKind::Parse,
            FetchError::GeolocationUnavailable => ErrorKind::GeolocationUnavailable,
            FetchError::GeolocationDenied => ErrorKind::GeolocationDenied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_city() {
        let err = FetchError::NotFound("Nowhereville".to_string());
        assert_eq!(
            err.to_string(),
            "City \"Nowhereville\" not found. Please try another one."
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn provider_message_carries_the_status_line() {
        let err = FetchError::Provider("503 Service Unavailable".to_string());
        assert!(err.to_string().contains("503 Service Unavailable"));
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[test]
    fn unconfigured_message_points_at_configure() {
        let err = FetchError::Unconfigured;
        assert!(err.to_string().contains("skycast configure"));
        assert_eq!(err.kind(), ErrorKind::Unconfigured);
    }
}
