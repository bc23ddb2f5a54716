//! Notion adapter and PRD-to-block rendering.

use crate::config::NotionConfig;
use crate::http::{VendorHttp, headers};
use crate::traits::DocumentPublisher;
use async_trait::async_trait;
use pmk_core::{PmkError, PrdDocument, PublishedPage, Result, Vendor};
use serde::Deserialize;
use serde_json::{Value, json};

pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Notion accepts at most this many children per append request.
pub const MAX_BLOCKS_PER_REQUEST: usize = 100;

/// Notion rejects rich-text items longer than this many characters.
pub const MAX_RICH_TEXT_CHARS: usize = 2000;

#[derive(Deserialize)]
struct PageResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

pub struct NotionClient {
    http: VendorHttp,
    database_id: Option<String>,
    title_property: String,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().unwrap_or(NOTION_API_BASE);
        let bearer = format!("Bearer {}", config.api_key);
        let headers = headers(
            Vendor::Notion,
            &[("authorization", &bearer)],
            &[("notion-version", NOTION_VERSION)],
        )?;
        let http = VendorHttp::new(Vendor::Notion, base_url, headers, config.timeout)?;
        Ok(Self {
            http,
            database_id: config.prd_database_id,
            title_property: config.title_property,
        })
    }
}

#[async_trait]
impl DocumentPublisher for NotionClient {
    async fn create_page(&self, title: &str) -> Result<PublishedPage> {
        let database_id = self.database_id.as_deref().ok_or_else(|| {
            PmkError::Config("NOTION_PRD_DATABASE_ID is not set; cannot publish PRD".to_string())
        })?;
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": {
                self.title_property.as_str(): { "title": rich_text(title) }
            }
        });
        let page: PageResponse = self.http.post("/pages", &body).await?;
        let url = page
            .url
            .unwrap_or_else(|| format!("https://www.notion.so/{}", page.id.replace('-', "")));
        Ok(PublishedPage { page_id: page.id, url })
    }

    async fn append_blocks(&self, page_id: &str, blocks: Vec<Value>) -> Result<()> {
        let path = format!("/blocks/{page_id}/children");
        for chunk in blocks.chunks(MAX_BLOCKS_PER_REQUEST) {
            let _: Value = self.http.patch(&path, &json!({ "children": chunk })).await?;
        }
        Ok(())
    }
}

/// Split text into rich-text items that each stay within the vendor limit.
pub fn rich_text(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![json!({ "type": "text", "text": { "content": "" } })];
    }
    chars
        .chunks(MAX_RICH_TEXT_CHARS)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "type": "text", "text": { "content": content } })
        })
        .collect()
}

fn block(kind: &str, text: &str) -> Value {
    json!({ "object": "block", "type": kind, kind: { "rich_text": rich_text(text) } })
}

fn section(blocks: &mut Vec<Value>, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    blocks.push(block("heading_2", heading));
    blocks.extend(items.iter().map(|item| block("bulleted_list_item", item)));
}

/// Render a PRD as Notion block objects, section by section.
pub fn prd_blocks(prd: &PrdDocument) -> Vec<Value> {
    let mut blocks = vec![block("heading_2", "Overview"), block("paragraph", &prd.overview)];
    section(&mut blocks, "Goals", &prd.goals);
    section(&mut blocks, "Non-Goals", &prd.non_goals);

    let requirements: Vec<String> = prd
        .functional_requirements
        .iter()
        .map(|req| {
            let mut line = format!("{} ({}): {}", req.id, req.priority, req.description);
            if !req.user_story_ids.is_empty() {
                line.push_str(&format!(" [{}]", req.user_story_ids.join(", ")));
            }
            line
        })
        .collect();
    section(&mut blocks, "Functional Requirements", &requirements);
    section(&mut blocks, "Success Metrics", &prd.success_metrics);
    section(&mut blocks, "Risks", &prd.risks);
    blocks
}
