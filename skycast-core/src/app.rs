use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    error::FetchError,
    geo::LocationSource,
    model::{FavoriteEntry, WeatherRecord},
    provider::WeatherClient,
    store::{FavoriteToggle, PreferenceStore, Preferences},
    view::WeatherView,
};

/// Ticket for one issued fetch, checked at completion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(u64);

/// Monotonic request-id guard.
///
/// Issuing a new id supersedes all earlier ones; a completion whose id is no
/// longer current must not touch the display or history. This gives rapid
/// repeated searches newest-wins semantics instead of last-to-land-wins.
#[derive(Debug, Default)]
pub struct RequestGuard {
    latest: AtomicU64,
}

impl RequestGuard {
    pub fn issue(&self) -> RequestId {
        RequestId(self.latest.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest.load(Ordering::Relaxed) == id.0
    }
}

/// One user-facing weather lookup session: client + preferences + guard.
///
/// Drives the view with loading transitions and exactly one terminal call per
/// action, and records successful lookups in the search history. The record
/// from a successful search is returned so callers can thread it into
/// [`toggle_favorite`](Self::toggle_favorite) explicitly; there is no
/// "currently displayed city" held anywhere in here.
pub struct WeatherApp<S> {
    client: WeatherClient,
    prefs: Preferences<S>,
    guard: RequestGuard,
}

impl<S: PreferenceStore> WeatherApp<S> {
    pub fn new(client: WeatherClient, store: S) -> Self {
        Self {
            client,
            prefs: Preferences::new(store),
            guard: RequestGuard::default(),
        }
    }

    pub fn preferences(&self) -> &Preferences<S> {
        &self.prefs
    }

    /// Search by place name, driving `view` through the whole action.
    pub async fn search_city(
        &self,
        city: &str,
        view: &dyn WeatherView,
    ) -> Result<WeatherRecord, FetchError> {
        if city.trim().is_empty() {
            return Err(self.reject(FetchError::EmptyInput, view));
        }
        if !self.client.is_configured() {
            return Err(self.reject(FetchError::Unconfigured, view));
        }

        let ticket = self.guard.issue();
        view.on_loading_changed(true);
        let outcome = self.client.fetch_by_name(city).await;
        self.finish(ticket, outcome, view)
    }

    /// Search by coordinates. Also records history, using the place name the
    /// provider resolves the coordinates to.
    pub async fn search_coords(
        &self,
        lat: f64,
        lon: f64,
        view: &dyn WeatherView,
    ) -> Result<WeatherRecord, FetchError> {
        if !self.client.is_configured() {
            return Err(self.reject(FetchError::Unconfigured, view));
        }

        let ticket = self.guard.issue();
        view.on_loading_changed(true);
        let outcome = self.client.fetch_by_coords(lat, lon).await;
        self.finish(ticket, outcome, view)
    }

    /// Resolve the device location, then search by the resulting coordinates.
    pub async fn locate_and_search(
        &self,
        source: &dyn LocationSource,
        view: &dyn WeatherView,
    ) -> Result<WeatherRecord, FetchError> {
        match source.current().await {
            Ok(coords) => self.search_coords(coords.latitude, coords.longitude, view).await,
            Err(err) => Err(self.reject(err, view)),
        }
    }

    /// Toggle the place from a fetch result in the favorites set.
    pub fn toggle_favorite(&self, record: &WeatherRecord) -> anyhow::Result<FavoriteToggle> {
        self.prefs.toggle_favorite(FavoriteEntry::from_record(record))
    }

    /// Validation and setup failures: no request was issued, so no loading
    /// transition is shown either.
    fn reject(&self, err: FetchError, view: &dyn WeatherView) -> FetchError {
        view.on_error(err.kind(), &err.to_string());
        err
    }

    fn finish(
        &self,
        ticket: RequestId,
        outcome: Result<WeatherRecord, FetchError>,
        view: &dyn WeatherView,
    ) -> Result<WeatherRecord, FetchError> {
        if !self.guard.is_current(ticket) {
            tracing::debug!("Dropping completion of superseded request");
            return outcome;
        }

        view.on_loading_changed(false);
        match &outcome {
            Ok(record) => {
                // A failure to persist history must not fail the search that
                // already succeeded.
                if let Err(err) = self.prefs.push_history(&record.location_name) {
                    tracing::warn!("Failed to record search history: {err:#}");
                }
                view.on_success(record);
            }
            Err(err) => view.on_error(err.kind(), &err.to_string()),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_id_is_current_until_superseded() {
        let guard = RequestGuard::default();

        let first = guard.issue();
        assert!(guard.is_current(first));

        let second = guard.issue();
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn ids_are_monotonic() {
        let guard = RequestGuard::default();
        let a = guard.issue();
        let b = guard.issue();
        let c = guard.issue();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(guard.is_current(c));
    }
}
