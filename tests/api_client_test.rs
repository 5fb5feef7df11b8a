use chrono::NaiveDate;
use httpmock::prelude::*;
use tempfile::TempDir;

use renoquote::config::settings::ApiConfig;
use renoquote::domain::model::OrderRequest;
use renoquote::utils::error::QuoteError;
use renoquote::{ApiClient, LocalStorage};

fn client_for(server: &MockServer, dir: &TempDir) -> ApiClient<LocalStorage> {
    let config = ApiConfig {
        base_url: server.base_url(),
        timeout_seconds: 5,
    };
    ApiClient::new(&config, LocalStorage::new(dir.path())).unwrap()
}

fn order() -> OrderRequest {
    OrderRequest {
        phone: "+996555123456".to_string(),
        service: 1,
        address: "Бишкек, ул. Киевская 95".to_string(),
        start_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
    }
}

#[tokio::test]
async fn styles_decode_with_aliases_and_skip_malformed_records() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let api = client_for(&server, &dir);

    let catalog = server.mock(|when, then| {
        when.method(GET).path("/services/categories/");
        then.status(200).json_body(serde_json::json!([
            {
                "id": "std",
                "name": "Стандарт",
                "pricePerSqm": 15000,
                "timeMultiplier": 1.0,
                "features": ["Шпаклевка", "Покраска"]
            },
            // Older record shape: title/price, no multiplier
            { "id": 7, "title": "Премиум", "price": 22000 },
            // Drifted record: no price at all, must be skipped
            { "id": 9, "name": "Сломанный" }
        ]));
    });

    let styles = api.fetch_styles().await.unwrap();
    catalog.assert();

    assert_eq!(styles.len(), 2);
    assert_eq!(styles[0].id, "std");
    assert_eq!(styles[0].price_per_sqm, 15_000.0);
    assert_eq!(styles[0].features.len(), 2);
    assert_eq!(styles[1].id, "7");
    assert_eq!(styles[1].name, "Премиум");
    assert_eq!(styles[1].price_per_sqm, 22_000.0);
    assert_eq!(styles[1].time_multiplier, 1.0);
}

#[tokio::test]
async fn styles_endpoint_failure_is_an_error() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let api = client_for(&server, &dir);

    server.mock(|when, then| {
        when.method(GET).path("/services/categories/");
        then.status(500);
    });

    let result = api.fetch_styles().await;
    assert!(matches!(
        result,
        Err(QuoteError::UnexpectedStatus { status: 500, .. })
    ));
}

#[tokio::test]
async fn submitted_order_returns_the_created_id() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let api = client_for(&server, &dir);

    let orders = server.mock(|when, then| {
        when.method(POST)
            .path("/orders/")
            .json_body_partial(r#"{ "service": 1, "start_date": "2025-06-02" }"#);
        then.status(201).json_body(serde_json::json!({ "id": 123 }));
    });

    let order_id = api.submit_order(&order()).await.unwrap();
    orders.assert();
    assert_eq!(order_id, "123");
}

#[tokio::test]
async fn server_field_errors_are_surfaced_verbatim() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let api = client_for(&server, &dir);

    server.mock(|when, then| {
        when.method(POST).path("/orders/");
        then.status(400).json_body(serde_json::json!({
            "phone": ["Enter a valid phone number."],
            "end_date": ["Must be after start_date."]
        }));
    });

    let err = api.submit_order(&order()).await.unwrap_err();
    match err {
        QuoteError::OrderRejected { fields } => {
            assert_eq!(fields["phone"], vec!["Enter a valid phone number."]);
            assert_eq!(fields["end_date"], vec!["Must be after start_date."]);
        }
        other => panic!("expected OrderRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn unparseable_4xx_becomes_unexpected_status() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let api = client_for(&server, &dir);

    server.mock(|when, then| {
        when.method(POST).path("/orders/");
        then.status(403).body("forbidden");
    });

    let err = api.submit_order(&order()).await.unwrap_err();
    assert!(matches!(
        err,
        QuoteError::UnexpectedStatus { status: 403, .. }
    ));
}

#[tokio::test]
async fn login_stores_tokens_and_authorizes_later_requests() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let api = client_for(&server, &dir);

    let login = server.mock(|when, then| {
        when.method(POST)
            .path("/auth/login/")
            .json_body(serde_json::json!({ "phone": "+996555123456", "password": "secret" }));
        then.status(200).json_body(
            serde_json::json!({ "access": "access-1", "refresh": "refresh-1" }),
        );
    });
    let catalog = server.mock(|when, then| {
        when.method(GET)
            .path("/services/categories/")
            .header("authorization", "Bearer access-1");
        then.status(200).json_body(serde_json::json!([]));
    });

    api.login("+996555123456", "secret").await.unwrap();
    login.assert();
    assert_eq!(api.session().access_token().await.as_deref(), Some("access-1"));

    api.fetch_styles().await.unwrap();
    catalog.assert();

    api.logout().await.unwrap();
    assert!(api.session().access_token().await.is_none());
    assert!(api.session().refresh_token().await.is_none());
}

#[tokio::test]
async fn failed_login_does_not_store_tokens() {
    let server = MockServer::start();
    let dir = TempDir::new().unwrap();
    let api = client_for(&server, &dir);

    server.mock(|when, then| {
        when.method(POST).path("/auth/login/");
        then.status(401)
            .json_body(serde_json::json!({ "detail": "Invalid credentials" }));
    });

    assert!(api.login("+996555123456", "wrong").await.is_err());
    assert!(api.session().access_token().await.is_none());
}
