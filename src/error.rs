//! Client-level error types shared across the core and the service wrappers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint rejected the stored credentials (non-2xx exchange).
	#[error("Token endpoint rejected the credentials with HTTP {status}: {reason}.")]
	Credential {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Truncated response body.
		reason: String,
	},
	/// Upstream returned a non-recoverable status on a business call.
	///
	/// Covers every non-2xx, non-401 first attempt as well as any non-2xx
	/// response (a second 401 included) on the single post-refresh retry.
	#[error("Upstream returned HTTP {status}: {body}.")]
	Upstream {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// A token refresh failed, whether led by this caller or a concurrent one.
	///
	/// Followers of an in-flight refresh observe the leader's failure through
	/// the shared [`Arc`] rather than silently proceeding.
	#[error("Token refresh failed.")]
	Refresh(#[source] Arc<Error>),
	/// Authentication finished without producing an authorization header.
	///
	/// Reachable when the bounded wait on a concurrent refresh expired before
	/// that refresh published its token.
	#[error("Authentication completed without an authorization header.")]
	MissingAuthorization,
	/// Upstream returned an empty body where a document was expected.
	#[error("Upstream returned an empty body for `{path}`.")]
	EmptyResponse {
		/// Request path that produced the empty body.
		path: String,
	},
	/// Upstream returned JSON that does not match the expected document shape.
	#[error("Upstream returned an unexpected document for `{path}`.")]
	ResponseParse {
		/// Structured parsing failure pointing at the offending field.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Request path that produced the document.
		path: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP session could not be constructed.
	#[error("HTTP session could not be constructed.")]
	SessionBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Request path cannot be joined onto the configured base address.
	#[error("Request path `{path}` is not valid relative to the base address.")]
	InvalidPath {
		/// Offending request path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// No credentials have been stored yet.
	#[error("No credentials are stored; call `initialize` before authenticating.")]
	MissingLogin,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn session_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::SessionBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::session_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the upstream service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
