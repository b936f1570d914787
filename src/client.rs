//! The credentialed client: request execution with silent re-authentication
//! and exactly one retry.
//!
//! [`Client::request`] is the sole entry point business wrappers use; they
//! never touch credentials or sessions directly. A 401 on a business call
//! routes through [`Client::authenticate`], which coalesces concurrent
//! refreshes into one token exchange, then the original call is re-issued
//! once with the refreshed header. The second attempt never triggers another
//! refresh cycle, so retries are bounded by construction.

// crates.io
use reqwest::{Response, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{CredentialStore, RefreshCoordinator},
	config::Config,
	error::{ConfigError, TransportError},
	http::SessionHolder,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Path of the token endpoint. Exempt from 401 recovery so a login failure
/// can never recurse into another login.
pub const TOKEN_PATH: &str = "/auth/token";

const BODY_PREVIEW_LIMIT: usize = 256;

/// Token endpoint success document.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
	access_token: String,
}

/// Credentialed async client for the Aptner portal.
///
/// Cloning is cheap; every clone shares the same session holder, credential
/// store, and refresh coordinator, so concurrent logical operations observe
/// one credential and one live session.
#[derive(Clone, Debug)]
pub struct Client {
	/// Credential state shared by every operation.
	pub credentials: Arc<CredentialStore>,
	/// Single-flight refresh coordination.
	pub refresh: Arc<RefreshCoordinator>,
	/// Holder of the long-lived upstream session.
	pub session: Arc<SessionHolder>,
	config: Config,
}
impl Client {
	/// Creates a client for the provided configuration.
	pub fn new(config: Config) -> Self {
		Self {
			credentials: Arc::new(CredentialStore::default()),
			refresh: Arc::new(RefreshCoordinator::new(config.refresh_wait)),
			session: Arc::new(SessionHolder::default()),
			config,
		}
	}

	/// Returns the active configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Seeds the login pair and eagerly authenticates once.
	///
	/// Called once per process, or again on credential rotation. A rejected
	/// exchange surfaces as [`Error::Refresh`] wrapping the credential
	/// failure; no automatic retry is performed.
	pub async fn initialize(
		&self,
		id: impl Into<String>,
		password: impl Into<String>,
	) -> Result<()> {
		self.credentials.set_login(id, password);
		self.authenticate().await?;

		if self.credentials.authorization().is_some() {
			Ok(())
		} else {
			Err(Error::MissingAuthorization)
		}
	}

	/// Refreshes the bearer token, coalescing concurrent callers into one
	/// upstream exchange.
	pub async fn authenticate(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "authenticate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.refresh.run(self.exchange_token())).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Issues `method path`, recovering from a stale credential with one
	/// silent re-authentication and one retry.
	///
	/// A JSON body is attached only for `PUT`/`POST` when supplied. Non-2xx,
	/// non-401 statuses are hard errors; an empty or non-JSON 2xx body yields
	/// `Ok(None)`.
	pub async fn request(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<Option<Value>> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "request");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self.perform(method.clone(), path, body).await?;

				if response.status() != StatusCode::UNAUTHORIZED || path == TOKEN_PATH {
					return self.read_json(response).await;
				}

				self.authenticate().await?;

				let response = self.perform(method, path, body).await?;

				// Exactly one retry; a second 401 is surfaced like any other
				// failure instead of looping back into authentication.
				self.read_json(response).await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Releases the shared session; safe to call repeatedly.
	///
	/// Invoked once at process teardown. A later request recreates the
	/// session on demand.
	pub fn shutdown(&self) {
		self.session.close();
	}

	/// Issues a request and deserializes the mandatory JSON document it
	/// returns. Service wrappers use this instead of [`Client::request`] when
	/// an empty body would be a broken upstream contract.
	pub(crate) async fn fetch_document<T>(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let value = self
			.request(method, path, body)
			.await?
			.ok_or_else(|| Error::EmptyResponse { path: path.into() })?;

		serde_path_to_error::deserialize(value)
			.map_err(|source| Error::ResponseParse { source, path: path.into() })
	}

	async fn exchange_token(&self) -> Result<()> {
		let login = self.credentials.login().ok_or(ConfigError::MissingLogin)?;

		// The exchange itself must be unauthenticated; a stale header never
		// reaches the token endpoint.
		self.credentials.clear_authorization();

		let body = serde_json::json!({ "id": login.id, "password": login.password.expose() });
		let response = self.perform(Method::POST, TOKEN_PATH, Some(&body)).await?;
		let status = response.status();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(Error::Credential {
				status: status.as_u16(),
				reason: body_preview(&bytes),
			});
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);
		let token: TokenResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::ResponseParse { source, path: TOKEN_PATH.into() })?;

		self.credentials.set_bearer(&token.access_token);

		Ok(())
	}

	async fn perform(
		&self,
		method: Method,
		path: &str,
		body: Option<&Value>,
	) -> Result<Response> {
		let session = self.session.get(&self.config)?;
		let url = session
			.url(path)
			.map_err(|source| ConfigError::InvalidPath { path: path.into(), source })?;
		let mut request = session.http().request(method.clone(), url);

		if let Some(header) = self.credentials.authorization() {
			request = request.header(AUTHORIZATION, header.expose());
		}
		if let Some(body) = body.filter(|_| method == Method::POST || method == Method::PUT) {
			request = request.json(body);
		}

		request.send().await.map_err(|e| TransportError::from(e).into())
	}

	async fn read_json(&self, response: Response) -> Result<Option<Value>> {
		let status = response.status();
		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(Error::Upstream { status: status.as_u16(), body: body_preview(&bytes) });
		}
		if bytes.is_empty() {
			return Ok(None);
		}

		// A non-JSON 2xx body is tolerated, not an error.
		Ok(serde_json::from_slice(&bytes).ok())
	}
}

fn body_preview(bytes: &[u8]) -> String {
	String::from_utf8_lossy(bytes).chars().take(BODY_PREVIEW_LIMIT).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn body_preview_truncates_and_tolerates_invalid_utf8() {
		let long = "x".repeat(BODY_PREVIEW_LIMIT * 2);

		assert_eq!(body_preview(long.as_bytes()).len(), BODY_PREVIEW_LIMIT);
		assert_eq!(body_preview(&[0xFF, 0xFE]), "\u{FFFD}\u{FFFD}");
	}
}
