//! End-to-end flow through the public router: add a product, then list
//! the fixed-category subset, against a mocked document store.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use httpmock::prelude::*;
use tower::ServiceExt;

use gamevault::config::{ServerSettings, Settings, StoreSettings};
use gamevault::nlp::NerConfig;
use gamevault::server::{create_router, AppState};

fn settings_for(store: &MockServer, nlp: &MockServer) -> Settings {
    Settings {
        store: StoreSettings {
            endpoint: store.base_url(),
            key: gamevault::config::DEFAULT_STORE_KEY.to_string(),
            database: "GameVault".to_string(),
            container: "Products".to_string(),
        },
        nlp: NerConfig {
            endpoint: nlp.base_url(),
            ..Default::default()
        },
        server: ServerSettings::default(),
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn add_then_list_round_trip() {
    let store = MockServer::start();
    let nlp = MockServer::start();

    let item = serde_json::json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "name": "Chrono Trigger",
        "category": "Retro",
        "price": 19.99,
    });

    let create_mock = store.mock(|when, then| {
        when.method(POST)
            .path("/dbs/GameVault/colls/Products/docs")
            .json_body(item.clone());
        then.status(201).json_body(item.clone());
    });
    let query_mock = store.mock(|when, then| {
        when.method(POST)
            .path("/dbs/GameVault/colls/Products/docs")
            .header("x-ms-documentdb-isquery", "True");
        then.status(200)
            .json_body(serde_json::json!({ "Documents": [item.clone()] }));
    });

    let app = create_router(AppState::new(&settings_for(&store, &nlp)));

    // Insert
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/add_product")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(item.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ack = json_body(response).await;
    assert_eq!(ack["message"], "Product added successfully");
    create_mock.assert();

    // List
    let response = app
        .oneshot(
            Request::builder()
                .uri("/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = json_body(response).await;
    let products = listing["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Chrono Trigger");
    query_mock.assert();
}

#[tokio::test]
async fn listing_is_empty_when_store_has_no_matches() {
    let store = MockServer::start();
    let nlp = MockServer::start();
    store.mock(|when, then| {
        when.method(POST)
            .path("/dbs/GameVault/colls/Products/docs")
            .header("x-ms-documentdb-isquery", "True");
        then.status(200)
            .json_body(serde_json::json!({ "Documents": [] }));
    });

    let app = create_router(AppState::new(&settings_for(&store, &nlp)));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let listing = json_body(response).await;
    assert_eq!(listing["products"].as_array().unwrap().len(), 0);
}
