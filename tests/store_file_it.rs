// std
use std::{fs, path::PathBuf};
// crates.io
use httpmock::prelude::*;
// self
use paypal_api::{
	_preludet::*,
	auth::{Credentials, TokenSecret},
	client::Client,
	config::{ClientConfig, Environment},
	request::Method,
	store::{FileTokenStore, TokenStore},
};

fn scratch_path(name: &str) -> PathBuf {
	let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();

	std::env::temp_dir()
		.join(format!("paypal-api-{}-{nanos}", std::process::id()))
		.join(name)
}

fn file_backed_client(base_url: &str, path: &PathBuf) -> paypal_api::client::ReqwestApiClient {
	let config = ClientConfig::builder(
		Environment::Custom(Url::parse(base_url).expect("Mock server URL should parse.")),
		Credentials::new("abc", "xyz").expect("Credentials fixture should be valid."),
	)
	.token_cache_path(path)
	.build()
	.expect("Configuration should build.");

	Client::new(config).expect("File-backed client should build.")
}

#[tokio::test]
async fn persisted_token_is_reused_across_clients() {
	let server = MockServer::start_async().await;
	let path = scratch_path("token");
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"persisted\",\"token_type\":\"Bearer\",\"expires_in\":32400}");
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/test").header("authorization", "Bearer persisted");
			then.status(200).body("{}");
		})
		.await;

	for _ in 0..2 {
		let client = file_backed_client(&server.base_url(), &path);
		let request = client.request(Method::Get, "/v1/test").build().expect("GET should build.");

		client.send(request).await.expect("GET should succeed.");
	}

	assert_eq!(fs::read_to_string(&path).expect("Token file should exist."), "persisted");

	token_mock.assert_calls_async(1).await;
	api_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn invalidation_removes_the_token_file() {
	let path = scratch_path("token");
	let store = FileTokenStore::new(&path);

	store.store(TokenSecret::new("stale")).await.expect("Seeding the token file should succeed.");

	let client = file_backed_client("https://api.sandbox.paypal.com", &path);
	let token = client.auth().token().await.expect("Cold start should read the token file.");

	assert_eq!(token.expose(), "stale");

	client.auth().invalidate().await;

	assert!(!path.exists());
	assert!(store.load().await.expect("Loading a missing file should succeed.").is_none());
}
