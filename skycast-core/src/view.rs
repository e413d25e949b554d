use crate::{error::ErrorKind, model::WeatherRecord};

/// Rendering collaborator for fetch actions.
///
/// The orchestrator reports loading transitions and then exactly one terminal
/// call per action: `on_success` or `on_error`. Receivers take `&self` so a
/// single view instance can serve overlapping searches; implementations that
/// mutate state bring their own interior mutability.
pub trait WeatherView {
    fn on_loading_changed(&self, loading: bool);
    fn on_success(&self, record: &WeatherRecord);
    fn on_error(&self, kind: ErrorKind, message: &str);
}
