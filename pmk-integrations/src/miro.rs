//! Miro REST v2 adapter.

use crate::config::MiroConfig;
use crate::http::{VendorHttp, headers};
use crate::traits::{BoardCanvas, ShapeItem, StickyNote, TextItem};
use async_trait::async_trait;
use pmk_core::{Result, Vendor, VisualBoard};
use serde::Deserialize;
use serde_json::json;

pub const MIRO_API_BASE: &str = "https://api.miro.com/v2";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BoardResponse {
    id: String,
    #[serde(default)]
    view_link: Option<String>,
}

#[derive(Deserialize)]
struct ItemResponse {
    id: String,
}

pub struct MiroClient {
    http: VendorHttp,
}

impl MiroClient {
    pub fn new(config: MiroConfig) -> Result<Self> {
        let base_url = config.base_url.as_deref().unwrap_or(MIRO_API_BASE);
        let bearer = format!("Bearer {}", config.access_token);
        let headers = headers(Vendor::Miro, &[("authorization", &bearer)], &[])?;
        let http = VendorHttp::new(Vendor::Miro, base_url, headers, config.timeout)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl BoardCanvas for MiroClient {
    async fn create_board(&self, name: &str, description: &str) -> Result<VisualBoard> {
        let body = json!({ "name": name, "description": description });
        let board: BoardResponse = self.http.post("/boards", &body).await?;
        let url = board
            .view_link
            .unwrap_or_else(|| format!("https://miro.com/app/board/{}/", board.id));
        Ok(VisualBoard { id: board.id, url })
    }

    async fn create_sticky_note(&self, board_id: &str, note: StickyNote) -> Result<String> {
        let body = json!({
            "data": { "content": note.content, "shape": "square" },
            "style": { "fillColor": note.color },
            "position": { "x": note.position.x, "y": note.position.y },
        });
        let item: ItemResponse =
            self.http.post(&format!("/boards/{board_id}/sticky_notes"), &body).await?;
        Ok(item.id)
    }

    async fn create_shape(&self, board_id: &str, shape: ShapeItem) -> Result<String> {
        let body = json!({
            "data": { "content": shape.content, "shape": shape.shape },
            "style": { "fillColor": shape.fill_color },
            "position": { "x": shape.position.x, "y": shape.position.y },
            "geometry": { "width": shape.width, "height": shape.height },
        });
        let item: ItemResponse =
            self.http.post(&format!("/boards/{board_id}/shapes"), &body).await?;
        Ok(item.id)
    }

    async fn create_text(&self, board_id: &str, text: TextItem) -> Result<String> {
        let body = json!({
            "data": { "content": text.content },
            "position": { "x": text.position.x, "y": text.position.y },
        });
        let item: ItemResponse = self.http.post(&format!("/boards/{board_id}/texts"), &body).await?;
        Ok(item.id)
    }
}
