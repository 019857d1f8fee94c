//! Integration tests for the batch updater: credential consultation,
//! auth-failure retry, zero-fill fallbacks, and batch halting.

use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{bearer_token, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hwtrack_core::Product;
use hwtrack_inventory::{
    update_quantities, CredentialManager, CredentialProvider, InventoryClient, InventoryError,
};

/// Scripted provider: hands out pre-programmed tokens in order, `None`
/// when the script runs dry.
struct ScriptedProvider {
    tokens: Mutex<Vec<Option<String>>>,
}

impl ScriptedProvider {
    fn new(tokens: &[Option<&str>]) -> Self {
        Self {
            tokens: Mutex::new(
                tokens
                    .iter()
                    .rev()
                    .map(|t| t.map(str::to_string))
                    .collect(),
            ),
        }
    }
}

impl CredentialProvider for ScriptedProvider {
    async fn acquire(&self) -> Result<Option<String>, InventoryError> {
        Ok(self.tokens.lock().expect("lock poisoned").pop().flatten())
    }
}

fn make_product(page_name: &str, uid: &str) -> Product {
    Product {
        car_name: format!("Car {page_name}"),
        sku: format!("HW-{page_name}"),
        page_name: page_name.to_string(),
        max_qty: 0,
        current_qty: None,
        image_url: String::new(),
        price: String::new(),
        uid: uid.to_string(),
    }
}

fn test_client(base_url: &str) -> InventoryClient {
    InventoryClient::new(base_url, 5, "hwtrack-test/0.1").expect("failed to build client")
}

fn manager(provider: ScriptedProvider, max_attempts: u32) -> CredentialManager<ScriptedProvider> {
    CredentialManager::new(provider, Duration::from_secs(600), max_attempts)
}

#[tokio::test]
async fn enriches_batch_with_one_credential_acquisition() {
    let server = MockServer::start().await;
    for (uid, available) in [("uid-a", 7), ("uid-b", 3)] {
        Mock::given(method("GET"))
            .and(path(format!("/api/product/{uid}/inventory")))
            .and(bearer_token("tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
                "inventory": { "maximum": 10, "available": available }
            })))
            .mount(&server)
            .await;
    }

    let mut products = vec![make_product("car-a", "uid-a"), make_product("car-b", "uid-b")];
    let mut manager = manager(ScriptedProvider::new(&[Some("tok-1")]), 3);
    let client = test_client(&server.uri());

    let report = update_quantities(&mut products, &mut manager, &client, 0).await;

    assert_eq!(report.updated, 2);
    assert!(report.failed.is_empty());
    assert_eq!(products[0].current_qty, Some(7));
    assert_eq!(products[0].max_qty, 10);
    assert_eq!(products[1].current_qty, Some(3));
}

#[tokio::test]
async fn product_without_uid_is_zero_filled_without_lookup() {
    let server = MockServer::start().await;

    let mut products = vec![make_product("car-a", "")];
    // A provider with no scripted tokens: any acquisition attempt would
    // return None, but none should happen for a uid-less product.
    let mut manager = manager(ScriptedProvider::new(&[]), 3);
    let client = test_client(&server.uri());

    let report = update_quantities(&mut products, &mut manager, &client, 0).await;

    assert_eq!(report.updated, 0);
    assert_eq!(report.failed, vec!["car-a".to_string()]);
    assert_eq!(products[0].current_qty, Some(0));
    assert_eq!(products[0].max_qty, 0);
    assert!(!manager.attempts_exhausted());
}

#[tokio::test]
async fn auth_failure_refreshes_once_and_retries_the_item() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/product/uid-a/inventory"))
        .and(bearer_token("tok-stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/product/uid-a/inventory"))
        .and(bearer_token("tok-fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "inventory": { "maximum": 20, "available": 5 }
        })))
        .mount(&server)
        .await;

    let mut products = vec![make_product("car-a", "uid-a")];
    let mut manager = manager(
        ScriptedProvider::new(&[Some("tok-stale"), Some("tok-fresh")]),
        3,
    );
    let client = test_client(&server.uri());

    let report = update_quantities(&mut products, &mut manager, &client, 0).await;

    assert_eq!(report.updated, 1);
    assert!(report.failed.is_empty());
    assert_eq!(products[0].current_qty, Some(5));
    assert_eq!(products[0].max_qty, 20);
}

#[tokio::test]
async fn persistent_auth_failure_fails_the_item_and_continues() {
    let server = MockServer::start().await;

    // Every token is rejected for uid-a; uid-b succeeds with the second token.
    Mock::given(method("GET"))
        .and(path("/api/product/uid-a/inventory"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/product/uid-b/inventory"))
        .and(bearer_token("tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "inventory": { "maximum": 8, "available": 2 }
        })))
        .mount(&server)
        .await;

    let mut products = vec![make_product("car-a", "uid-a"), make_product("car-b", "uid-b")];
    let mut manager = manager(ScriptedProvider::new(&[Some("tok-1"), Some("tok-2")]), 3);
    let client = test_client(&server.uri());

    let report = update_quantities(&mut products, &mut manager, &client, 0).await;

    assert_eq!(report.updated, 1);
    assert_eq!(report.failed, vec!["car-a".to_string()]);
    assert_eq!(products[0].current_qty, Some(0));
    assert_eq!(products[1].current_qty, Some(2));
}

#[tokio::test]
async fn batch_halts_when_no_credential_can_be_acquired() {
    let server = MockServer::start().await;

    let mut products = vec![make_product("car-a", "uid-a"), make_product("car-b", "uid-b")];
    // Provider never produces a token and the budget is one attempt.
    let mut manager = manager(ScriptedProvider::new(&[None]), 1);
    let client = test_client(&server.uri());

    let report = update_quantities(&mut products, &mut manager, &client, 0).await;

    assert_eq!(report.updated, 0);
    assert_eq!(
        report.failed,
        vec!["car-a".to_string(), "car-b".to_string()]
    );
    assert!(manager.attempts_exhausted());
    assert_eq!(products[0].current_qty, Some(0));
    assert_eq!(products[1].current_qty, Some(0));
}

#[tokio::test]
async fn transient_server_error_fails_only_that_item() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/product/uid-a/inventory"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/product/uid-b/inventory"))
        .and(bearer_token("tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "inventory": { "maximum": 15, "available": 9 }
        })))
        .mount(&server)
        .await;

    let mut products = vec![make_product("car-a", "uid-a"), make_product("car-b", "uid-b")];
    let mut manager = manager(ScriptedProvider::new(&[Some("tok-1")]), 3);
    let client = test_client(&server.uri());

    let report = update_quantities(&mut products, &mut manager, &client, 0).await;

    assert_eq!(report.updated, 1);
    assert_eq!(report.failed, vec!["car-a".to_string()]);
    assert_eq!(products[1].current_qty, Some(9));
    assert_eq!(products[1].max_qty, 15);
}
