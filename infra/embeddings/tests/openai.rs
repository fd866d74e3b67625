use mockito::Matcher;
use serde_json::json;
use sgate_domain::config::{OpenAiConfig, Secret};
use sgate_embeddings::{Embedder, EmbeddingError, OpenAiEmbedder};

fn config(base_url: String) -> OpenAiConfig {
    OpenAiConfig {
        api_key: Secret::new("sk-test"),
        base_url,
        model: "text-embedding-3-small".to_owned(),
        timeout_secs: 5,
        max_input_chars: 16,
    }
}

#[tokio::test]
async fn returns_first_vector() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "text-embedding-3-small",
            "input": "test embedding"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": [{ "embedding": [0.1, 0.2, 0.3], "index": 0 }] }).to_string())
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config(server.url())).expect("client");
    let vector = embedder.generate_embedding("  test embedding  ").await.expect("vector");

    assert_eq!(vector.len(), 3);
    mock.assert_async().await;
}

#[tokio::test]
async fn long_input_is_truncated_before_sending() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/embeddings")
        .match_body(Matcher::PartialJson(json!({ "input": "0123456789abcdef" })))
        .with_status(200)
        .with_body(json!({ "data": [{ "embedding": [1.0] }] }).to_string())
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config(server.url())).expect("client");
    embedder.generate_embedding("0123456789abcdefXYZ").await.expect("vector");

    mock.assert_async().await;
}

#[tokio::test]
async fn provider_error_body_is_not_propagated() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided: sk-te***"}}"#)
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config(server.url())).expect("client");
    let err = embedder.generate_embedding("hello").await.expect_err("401");

    assert!(matches!(err, EmbeddingError::Status { status: 401, .. }));
    assert!(err.is_upstream());
    assert!(!err.to_string().contains("Incorrect API key"));
}

#[tokio::test]
async fn empty_data_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/embeddings")
        .with_status(200)
        .with_body(json!({ "data": [] }).to_string())
        .create_async()
        .await;

    let embedder = OpenAiEmbedder::new(&config(server.url())).expect("client");
    let err = embedder.generate_embedding("hello").await.expect_err("empty");
    assert!(matches!(err, EmbeddingError::EmptyResponse { .. }));
}

#[tokio::test]
async fn blank_input_never_reaches_the_provider() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/embeddings").expect(0).create_async().await;

    let embedder = OpenAiEmbedder::new(&config(server.url())).expect("client");
    let err = embedder.generate_embedding("   ").await.expect_err("blank");

    assert!(matches!(err, EmbeddingError::InvalidInput { .. }));
    mock.assert_async().await;
}
