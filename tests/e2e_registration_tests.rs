//! End-to-end tests for the public registration endpoints.

mod common;

use common::{TestClient, TestServer};
use reqwest::StatusCode;

#[tokio::test]
async fn create_and_fetch_registration() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_registration("Chess Club", "chess@example.org")
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: serde_json::Value = response.json().await.unwrap();
    assert_eq!(created["club_name"], "Chess Club");
    assert_eq!(created["approved"], true);

    let id = created["id"].as_str().unwrap();
    let response = client.get_registration(id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: serde_json::Value = response.json().await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn list_returns_registrations_in_creation_order() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for name in ["Alpha", "Beta", "Gamma"] {
        let response = client
            .create_registration(name, "contact@example.org")
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = client.list_registrations().await;
    assert_eq!(response.status(), StatusCode::OK);
    let list: serde_json::Value = response.json().await.unwrap();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["club_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
}

#[tokio::test]
async fn invalid_registration_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.create_registration("", "contact@example.org").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.create_registration("Chess Club", "not-an-email").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_registration_is_not_found() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_registration("missing").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
