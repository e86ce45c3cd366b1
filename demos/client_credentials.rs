//! Demonstrates the client-credentials login, token reuse, and a partner call carrying the
//! merchant assertion against a local mock of the PayPal API.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use paypal_api::{
	auth::{Credentials, PayerId},
	client::Client,
	config::{ClientConfig, Environment},
	model::{Validate, orders::Ideal},
	request::Method,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/oauth2/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":32400}",
			);
		})
		.await;
	let orders_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/checkout/orders").header_exists("paypal-auth-assertion");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"id\":\"5O190127TN364715T\",\"status\":\"CREATED\"}");
		})
		.await;
	let credentials = Credentials::new("demo-partner", "demo-secret")?
		.with_payer_id(PayerId::new("MERCHANT42")?)
		.with_action_hash("demo-action");
	let config =
		ClientConfig::builder(Environment::Custom(Url::parse(&server.base_url())?), credentials)
			.build()?;
	let client = Client::new(config)?;
	let payment_source = Ideal {
		name: Some("Mr J Smith".into()),
		country_code: Some("NL".into()),
		iban_last_chars: None,
	};

	payment_source.validate(None)?;

	for _ in 0..2 {
		let request = client
			.request(Method::Post, "/v2/checkout/orders")
			.json(&serde_json::json!({
				"intent": "CAPTURE",
				"payment_source": { "ideal": &payment_source },
			}))
			.build()?;
		let order = client.send(request).await?.json::<serde_json::Value>()?;

		println!("Created order {}.", order["id"]);
	}

	token_mock.assert_calls_async(1).await;
	orders_mock.assert_calls_async(2).await;

	Ok(())
}
