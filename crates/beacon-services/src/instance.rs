use serde::Serialize;
use std::time::{Duration, Instant};

/// One announced endpoint.
///
/// Never mutated once accepted: announcing the same `url` again replaces
/// the record. `registered_at` is stamped by the server and is not part of
/// the JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    url: String,
    name: String,
    #[serde(skip)]
    registered_at: Instant,
}

impl Instance {
    /// A new announcement, registered now.
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_registered_at(url, name, Instant::now())
    }

    pub fn with_registered_at(
        url: impl Into<String>,
        name: impl Into<String>,
        registered_at: Instant,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            registered_at,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registered_at(&self) -> Instant {
        self.registered_at
    }

    /// Time since registration as seen at `now`. Zero if `now` is earlier.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.registered_at)
    }

    pub fn is_expired(&self, now: Instant, lifetime: Duration) -> bool {
        self.age(now) >= lifetime
    }

    /// Clamp `registered_at` so it is not earlier than `floor`.
    pub(crate) fn not_earlier_than(mut self, floor: Instant) -> Self {
        self.registered_at = self.registered_at.max(floor);
        self
    }
}
