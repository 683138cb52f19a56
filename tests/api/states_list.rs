use fake::faker::address::en::StateName;
use fake::Fake;

use crate::helpers::{rendered_ids, rendered_names, spawn_app, FakeStorage};

#[tokio::test]
async fn states_list_returns_200_and_html() {
    let app = spawn_app(FakeStorage::with_names(&["California"])).await;

    let response = app.get("/states_list").await;

    assert_eq!(response.status().as_u16(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));
    let body = response.text().await.expect("Failed to read body");
    assert_eq!(rendered_names(&body), vec!["California"]);
}

#[tokio::test]
async fn states_are_rendered_in_alphabetical_order() {
    let app = spawn_app(FakeStorage::with_names(&["Texas", "Arizona", "Nevada"])).await;

    let body = app.get("/states_list").await.text().await.expect("Failed to read body");

    assert_eq!(rendered_names(&body), vec!["Arizona", "Nevada", "Texas"]);
}

#[tokio::test]
async fn any_set_of_states_is_rendered_sorted() {
    let names: Vec<String> = (0..25).map(|_| StateName().fake()).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let app = spawn_app(FakeStorage::with_names(&refs)).await;

    let body = app.get("/states_list").await.text().await.expect("Failed to read body");

    let mut expected = names.clone();
    expected.sort();
    assert_eq!(rendered_names(&body), expected);
}

#[tokio::test]
async fn states_sharing_a_name_keep_storage_order() {
    let app = spawn_app(FakeStorage::with_names(&["Ohio", "Alaska", "Ohio", "Ohio"])).await;
    let ids = app.storage.ids();
    let expected = vec![ids[1].clone(), ids[0].clone(), ids[2].clone(), ids[3].clone()];

    for _ in 0..10 {
        let body = app.get("/states_list").await.text().await.expect("Failed to read body");
        assert_eq!(rendered_ids(&body), expected);
    }
}

#[tokio::test]
async fn empty_storage_renders_an_empty_list() {
    let app = spawn_app(FakeStorage::default()).await;

    let response = app.get("/states_list").await;

    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("<H1>States</H1>"));
    assert!(rendered_names(&body).is_empty());
}

#[tokio::test]
async fn trailing_slash_serves_the_same_page() {
    let app = spawn_app(FakeStorage::with_names(&["Utah", "Iowa"])).await;

    let without = app.get("/states_list").await;
    let with = app.get("/states_list/").await;

    assert_eq!(without.status().as_u16(), 200);
    assert_eq!(with.status().as_u16(), 200);
    assert_eq!(
        without.text().await.expect("Failed to read body"),
        with.text().await.expect("Failed to read body")
    );
}

#[tokio::test]
async fn storage_failure_returns_500() {
    let app = spawn_app(FakeStorage::failing()).await;

    let response = app.get("/states_list").await;

    assert_eq!(response.status().as_u16(), 500);
}
