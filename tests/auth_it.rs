// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use aptner_client::{Client, Config, Error, error::ConfigError, url::Url};

fn test_client(server: &MockServer) -> Client {
	let base_url = Url::parse(&server.base_url()).expect("Mock server URL should parse.");

	Client::new(Config::default().with_base_url(base_url))
}

#[tokio::test]
async fn initialize_attaches_the_issued_bearer_token() {
	let server = MockServer::start_async().await;
	let client = test_client(&server);
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/auth/token")
				.json_body(serde_json::json!({ "id": "u", "password": "p" }));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accessToken\":\"T1\"}");
		})
		.await;
	let history = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/pc/monthly-access-history")
				.header("authorization", "Bearer T1");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"monthlyParkingHistoryList\":[]}");
		})
		.await;

	client.initialize("u", "p").await.expect("Initialization should succeed.");

	let access = client
		.vehicle_access(None)
		.await
		.expect("History lookup should carry the issued token.");

	token.assert_async().await;
	history.assert_async().await;
	assert!(access.is_empty());
}

#[tokio::test]
async fn concurrent_authentication_coalesces_into_one_exchange() {
	let server = MockServer::start_async().await;
	let client = test_client(&server);
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accessToken\":\"T1\"}")
				.delay(Duration::from_millis(200));
		})
		.await;

	client.credentials.set_login("u", "p");

	let (a, b, c, d) = tokio::join!(
		client.authenticate(),
		client.authenticate(),
		client.authenticate(),
		client.authenticate(),
	);

	for outcome in [a, b, c, d] {
		outcome.expect("Every coalesced caller should succeed.");
	}

	token.assert_calls_async(1).await;
	assert_eq!(client.refresh.metrics().attempts(), 1);
	assert_eq!(client.refresh.metrics().coalesced(), 3);
	assert!(client.credentials.authorization().is_some());
}

#[tokio::test]
async fn rejected_exchange_surfaces_a_credential_error_without_retry() {
	let server = MockServer::start_async().await;
	let client = test_client(&server);
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(401).body("{\"message\":\"bad login\"}");
		})
		.await;
	let err = client
		.initialize("u", "wrong")
		.await
		.expect_err("Initialization should fail when the exchange is rejected.");

	// Exactly one exchange: a 401 from the token endpoint itself never
	// triggers a nested authentication attempt.
	token.assert_calls_async(1).await;
	assert!(matches!(
		err,
		Error::Refresh(ref shared) if matches!(**shared, Error::Credential { status: 401, .. })
	));
	assert!(client.credentials.authorization().is_none());
}

#[tokio::test]
async fn authenticate_without_stored_login_fails_fast() {
	let server = MockServer::start_async().await;
	let client = test_client(&server);
	let err = client
		.authenticate()
		.await
		.expect_err("Authentication should fail before credentials are seeded.");

	assert!(matches!(
		err,
		Error::Refresh(ref shared)
			if matches!(**shared, Error::Config(ConfigError::MissingLogin))
	));
}

#[tokio::test]
async fn re_authentication_replaces_the_stored_header() {
	let server = MockServer::start_async().await;
	let client = test_client(&server);
	let first_token = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accessToken\":\"T1\"}");
		})
		.await;

	client.initialize("u", "p").await.expect("Initialization should succeed.");
	first_token.delete_async().await;

	let second_token = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accessToken\":\"T2\"}");
		})
		.await;

	client.authenticate().await.expect("Re-authentication should succeed.");
	second_token.assert_async().await;

	let header = client.credentials.authorization().expect("Header should be present.");

	assert_eq!(header.expose(), "Bearer T2");
}

#[tokio::test]
async fn malformed_token_document_is_a_parse_error() {
	let server = MockServer::start_async().await;
	let client = test_client(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token\":\"not-the-field\"}");
		})
		.await;
	client.credentials.set_login("u", "p");

	let err = client
		.authenticate()
		.await
		.expect_err("A document without accessToken should fail to parse.");

	assert!(matches!(
		err,
		Error::Refresh(ref shared) if matches!(**shared, Error::ResponseParse { .. })
	));
	assert!(client.credentials.authorization().is_none());
}
