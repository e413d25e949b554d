//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - The weather fetch workflow: provider client, response normalization,
//!   and error classification
//! - Local preferences: theme, search history, and favorites over a
//!   swappable storage backing
//! - The [`app::WeatherApp`] orchestrator that drives a [`view::WeatherView`]
//!   and drops superseded responses
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or
//! services.

pub mod app;
pub mod config;
pub mod error;
pub mod geo;
pub mod model;
pub mod provider;
pub mod store;
pub mod view;

pub use app::{RequestGuard, RequestId, WeatherApp};
pub use config::Config;
pub use error::{ErrorKind, FetchError};
pub use geo::{IpLocationSource, LocationSource};
pub use model::{ConditionKind, Coordinates, FavoriteEntry, Theme, WeatherRecord};
pub use provider::WeatherClient;
pub use store::{FavoriteToggle, FileStore, MemoryStore, PreferenceStore, Preferences};
pub use view::WeatherView;
