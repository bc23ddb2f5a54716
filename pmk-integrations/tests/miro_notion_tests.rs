use pmk_core::PmkError;
use pmk_integrations::{
    BoardCanvas, DocumentPublisher, MiroClient, MiroConfig, NotionClient, NotionConfig, Position,
    StickyNote,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_miro_board_and_sticky_note() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/boards"))
        .and(header("authorization", "Bearer miro-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "uXjVO123=", "viewLink": "https://miro.com/app/board/uXjVO123=/"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/boards/uXjVO123=/sticky_notes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "345"})))
        .expect(1)
        .mount(&server)
        .await;

    let miro = MiroClient::new(MiroConfig::new("miro-token").with_base_url(server.uri())).unwrap();
    let board = miro.create_board("Notes", "Personas and journey").await.unwrap();
    assert_eq!(board.url, "https://miro.com/app/board/uXjVO123=/");

    let note = StickyNote {
        content: "Writer".into(),
        color: "light_yellow".into(),
        position: Position { x: 0.0, y: 0.0 },
    };
    assert_eq!(miro.create_sticky_note(&board.id, note).await.unwrap(), "345");
}

#[tokio::test]
async fn test_miro_server_error_is_vendor_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let miro = MiroClient::new(MiroConfig::new("t").with_base_url(server.uri())).unwrap();
    let err = miro.create_board("b", "d").await.unwrap_err();
    assert!(matches!(err, PmkError::VendorApi { status: 500, .. }));
}

#[tokio::test]
async fn test_notion_page_and_chunked_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/pages"))
        .and(header("notion-version", "2022-06-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "page-1", "url": "https://www.notion.so/page1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/blocks/page-1/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(2)
        .mount(&server)
        .await;

    let notion = NotionClient::new(
        NotionConfig::new("secret").with_database_id("db-1").with_base_url(server.uri()),
    )
    .unwrap();
    let page = notion.create_page("Notes PRD").await.unwrap();
    assert_eq!(page.page_id, "page-1");

    let blocks: Vec<_> = (0..150)
        .map(|i| json!({"object": "block", "type": "paragraph", "paragraph": {"rich_text": [
            {"type": "text", "text": {"content": format!("line {i}")}}
        ]}}))
        .collect();
    notion.append_blocks(&page.page_id, blocks).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let patch_sizes: Vec<usize> = requests
        .iter()
        .filter(|r| r.method.as_str() == "PATCH")
        .map(|r| r.body_json::<serde_json::Value>().unwrap()["children"].as_array().unwrap().len())
        .collect();
    assert_eq!(patch_sizes, vec![100, 50]);
}

#[tokio::test]
async fn test_notion_without_database_is_config_error() {
    let notion = NotionClient::new(NotionConfig::new("secret")).unwrap();
    let err = notion.create_page("x").await.unwrap_err();
    assert!(matches!(err, PmkError::Config(_)));
}
