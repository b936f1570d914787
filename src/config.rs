//! Client configuration for the upstream origin and refresh coordination.

// self
use crate::_prelude::*;

/// Default upstream origin.
pub const DEFAULT_BASE_URL: &str = "https://v2.aptner.com";
/// Default upper bound a caller waits for a refresh led by a concurrent caller.
pub const DEFAULT_REFRESH_WAIT: Duration = Duration::from_secs(30);

/// Connection and coordination settings shared by every operation of a client.
#[derive(Clone, Debug)]
pub struct Config {
	/// Upstream origin every request path is joined onto.
	pub base_url: Url,
	/// Upper bound a follower waits for an in-flight refresh to settle.
	///
	/// An expired wait is a liveness safeguard, not an error; the waiter
	/// proceeds and its own retry path decides what happens next.
	pub refresh_wait: Duration,
}
impl Config {
	/// Overrides the upstream origin (mock-server tests rely on this).
	pub fn with_base_url(mut self, base_url: Url) -> Self {
		self.base_url = base_url;

		self
	}

	/// Overrides the bounded refresh wait (defaults to 30 seconds).
	pub fn with_refresh_wait(mut self, wait: Duration) -> Self {
		self.refresh_wait = wait;

		self
	}
}
impl Default for Config {
	fn default() -> Self {
		Self {
			base_url: Url::parse(DEFAULT_BASE_URL).expect("Default base URL should parse."),
			refresh_wait: DEFAULT_REFRESH_WAIT,
		}
	}
}
