use pmk_integrations::{PineconeClient, PineconeConfig, Vector, VectorIndex, VectorQuery};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_indexes_uses_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/indexes"))
        .and(header("api-key", "pc-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexes": [{
                "name": "prd", "dimension": 768, "metric": "cosine",
                "host": "prd-abc.svc.pinecone.io", "status": {"ready": true, "state": "Ready"}
            }]
        })))
        .mount(&server)
        .await;

    let client =
        PineconeClient::new(PineconeConfig::new("pc-key").with_base_url(server.uri())).unwrap();
    let indexes = client.list_indexes().await.unwrap();
    assert_eq!(indexes[0].name, "prd");
    assert!(indexes[0].ready);
}

#[tokio::test]
async fn test_upsert_and_query_on_index_host() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"upsertedCount": 2})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [{"id": "US-001", "score": 0.92, "metadata": {"title": "Capture"}}]
        })))
        .mount(&server)
        .await;

    let client =
        PineconeClient::new(PineconeConfig::new("pc-key").with_host(server.uri())).unwrap();
    let vectors = vec![
        Vector { id: "US-001".into(), values: vec![0.1, 0.2], metadata: None },
        Vector { id: "US-002".into(), values: vec![0.3, 0.4], metadata: None },
    ];
    assert_eq!(client.upsert(vectors, Some("stories")).await.unwrap(), 2);

    let matches = client
        .query(VectorQuery {
            vector: vec![0.1, 0.2],
            top_k: 1,
            namespace: Some("stories".into()),
            include_metadata: true,
        })
        .await
        .unwrap();
    assert_eq!(matches[0].id, "US-001");
}
