//! In-memory credential store holding the login pair and the derived bearer header.

// self
use crate::{_prelude::*, auth::secret::Secret};

/// Login pair seeded by `initialize` and reused for every token exchange.
#[derive(Clone, Debug)]
pub struct Login {
	/// Portal account identifier.
	pub id: String,
	/// Portal account password.
	pub password: Secret,
}

#[derive(Debug, Default)]
struct CredentialState {
	authorization: Option<Secret>,
	login: Option<Login>,
}

/// Process-lifetime mutable credential state.
///
/// Any operation may read the authorization header; only the refresh
/// coordinator writes it. The header value, when present, was produced by the
/// most recent successful token exchange. Credentials live in memory only and
/// are never persisted.
#[derive(Debug, Default)]
pub struct CredentialStore(RwLock<CredentialState>);
impl CredentialStore {
	/// Stores the login pair, replacing any previous one (credential rotation).
	pub fn set_login(&self, id: impl Into<String>, password: impl Into<String>) {
		self.0.write().login = Some(Login { id: id.into(), password: Secret::new(password) });
	}

	/// Returns the stored login pair, if any.
	pub fn login(&self) -> Option<Login> {
		self.0.read().login.clone()
	}

	/// Returns the current `Authorization` header value, if one was issued.
	pub fn authorization(&self) -> Option<Secret> {
		self.0.read().authorization.clone()
	}

	/// Derives and stores `Bearer <token>` from a successful exchange.
	pub fn set_bearer(&self, access_token: &str) {
		self.0.write().authorization = Some(Secret::new(format!("Bearer {access_token}")));
	}

	/// Removes the header so the token exchange itself is unauthenticated.
	///
	/// A stale value must never reach the token endpoint.
	pub fn clear_authorization(&self) {
		self.0.write().authorization = None;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn bearer_header_follows_the_latest_exchange() {
		let store = CredentialStore::default();

		assert!(store.authorization().is_none());

		store.set_bearer("T1");

		assert_eq!(store.authorization().as_ref().map(Secret::expose), Some("Bearer T1"));

		store.set_bearer("T2");

		assert_eq!(store.authorization().as_ref().map(Secret::expose), Some("Bearer T2"));

		store.clear_authorization();

		assert!(store.authorization().is_none());
	}

	#[test]
	fn login_rotation_replaces_the_stored_pair() {
		let store = CredentialStore::default();

		assert!(store.login().is_none());

		store.set_login("first", "old");
		store.set_login("second", "new");

		let login = store.login().expect("Login should be stored after rotation.");

		assert_eq!(login.id, "second");
		assert_eq!(login.password.expose(), "new");
	}
}
