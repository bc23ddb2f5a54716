//! Vendor-neutral seams used by the workflow steps.

use async_trait::async_trait;
use pmk_core::{Priority, PublishedPage, Result, VisualBoard};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleInput {
    pub name: String,
    pub description: String,
    /// ISO-8601 dates.
    pub starts_at: String,
    pub ends_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCycle {
    pub id: String,
    pub number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub estimate: Option<u32>,
    pub cycle_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIssue {
    pub id: String,
    pub identifier: String,
    pub url: String,
}

/// Sprint and issue tracking (Linear).
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Team used when the caller does not name one.
    fn default_team_id(&self) -> Option<&str>;

    async fn create_cycle(&self, team_id: &str, input: CycleInput) -> Result<CreatedCycle>;

    async fn create_issue(&self, team_id: &str, input: IssueInput) -> Result<CreatedIssue>;
}

/// Board element position in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickyNote {
    pub content: String,
    pub color: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeItem {
    pub content: String,
    /// Vendor shape name, e.g. `rectangle`, `round_rectangle`, `circle`.
    pub shape: String,
    pub fill_color: String,
    pub position: Position,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub content: String,
    pub position: Position,
}

/// Visual board canvas (Miro).
#[async_trait]
pub trait BoardCanvas: Send + Sync {
    async fn create_board(&self, name: &str, description: &str) -> Result<VisualBoard>;

    async fn create_sticky_note(&self, board_id: &str, note: StickyNote) -> Result<String>;

    async fn create_shape(&self, board_id: &str, shape: ShapeItem) -> Result<String>;

    async fn create_text(&self, board_id: &str, text: TextItem) -> Result<String>;
}

/// Document publishing (Notion).
#[async_trait]
pub trait DocumentPublisher: Send + Sync {
    async fn create_page(&self, title: &str) -> Result<PublishedPage>;

    /// Append block objects to a page. Implementations split large lists into
    /// vendor-sized requests.
    async fn append_blocks(&self, page_id: &str, blocks: Vec<Value>) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    pub name: String,
    pub dimension: u32,
    pub metric: String,
    pub host: String,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexRequest {
    pub name: String,
    pub dimension: u32,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub top_k: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub include_metadata: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Vector search (Pinecone).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn list_indexes(&self) -> Result<Vec<IndexSummary>>;

    async fn describe_index(&self, name: &str) -> Result<IndexSummary>;

    async fn create_index(&self, request: CreateIndexRequest) -> Result<IndexSummary>;

    /// Returns the number of vectors the index accepted.
    async fn upsert(&self, vectors: Vec<Vector>, namespace: Option<&str>) -> Result<u32>;

    async fn query(&self, query: VectorQuery) -> Result<Vec<VectorMatch>>;
}
