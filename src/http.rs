//! The long-lived upstream session and its process-wide holder.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
// self
use crate::{_prelude::*, config::Config, error::ConfigError};

/// Reusable connection context bound to the upstream origin.
///
/// Clones share the underlying connection pool, so handing out copies never
/// creates a second live session.
#[derive(Clone, Debug)]
pub struct Session {
	generation: u64,
	http: ReqwestClient,
	origin: Url,
}
impl Session {
	/// Returns the underlying HTTP handle.
	pub fn http(&self) -> &ReqwestClient {
		&self.http
	}

	/// Identifies which holder-created session this handle belongs to.
	///
	/// Two handles with equal generations share one connection pool.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Joins a request path (query string included) onto the session origin.
	pub fn url(&self, path: &str) -> Result<Url, url::ParseError> {
		self.origin.join(path)
	}
}

/// Lazily creates and owns the single shared [`Session`].
///
/// The session is replaced, never mutated in place; [`SessionHolder::close`]
/// drops it and a later call recreates a fresh one.
#[derive(Debug, Default)]
pub struct SessionHolder {
	generations: AtomicU64,
	slot: Mutex<Option<Session>>,
}
impl SessionHolder {
	/// Returns the current session, creating one from `config` when absent.
	pub fn get(&self, config: &Config) -> Result<Session> {
		let mut slot = self.slot.lock();

		if let Some(session) = slot.as_ref() {
			return Ok(session.clone());
		}

		let headers = {
			let mut map = HeaderMap::new();

			map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

			map
		};
		let http =
			ReqwestClient::builder().default_headers(headers).build().map_err(ConfigError::from)?;
		let session = Session {
			generation: self.generations.fetch_add(1, Ordering::Relaxed) + 1,
			http,
			origin: config.base_url.clone(),
		};

		*slot = Some(session.clone());

		Ok(session)
	}

	/// Generation of the live session, if one exists.
	pub fn generation(&self) -> Option<u64> {
		self.slot.lock().as_ref().map(Session::generation)
	}

	/// Drops the shared session.
	///
	/// Never fails; shutdown must not fail the process. Later use recreates
	/// the session on demand.
	pub fn close(&self) {
		self.slot.lock().take();
	}
}
