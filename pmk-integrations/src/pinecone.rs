//! Pinecone adapter: control plane for indexes, data plane for vectors.

use crate::config::PineconeConfig;
use crate::http::{VendorHttp, headers};
use crate::traits::{
    CreateIndexRequest, IndexSummary, Vector, VectorIndex, VectorMatch, VectorQuery,
};
use async_trait::async_trait;
use pmk_core::{PmkError, Result, Vendor};
use serde::Deserialize;
use serde_json::json;

pub const PINECONE_CONTROL_BASE: &str = "https://api.pinecone.io";
pub const PINECONE_API_VERSION: &str = "2024-07";

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Deserialize)]
struct IndexModel {
    name: String,
    dimension: u32,
    metric: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

impl From<IndexModel> for IndexSummary {
    fn from(model: IndexModel) -> Self {
        IndexSummary {
            name: model.name,
            dimension: model.dimension,
            metric: model.metric,
            host: model.host,
            ready: model.status.map(|s| s.ready).unwrap_or(false),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: u32,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}

pub struct PineconeClient {
    control: VendorHttp,
    data: Option<VendorHttp>,
}

/// Index hosts are reported without a scheme.
fn host_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

impl PineconeClient {
    pub fn new(config: PineconeConfig) -> Result<Self> {
        let headers = headers(
            Vendor::Pinecone,
            &[("api-key", &config.api_key)],
            &[("x-pinecone-api-version", PINECONE_API_VERSION)],
        )?;
        let control_base = config.base_url.as_deref().unwrap_or(PINECONE_CONTROL_BASE);
        let control =
            VendorHttp::new(Vendor::Pinecone, control_base, headers.clone(), config.timeout)?;
        let data = config
            .host
            .as_deref()
            .map(|host| VendorHttp::new(Vendor::Pinecone, host_url(host), headers, config.timeout))
            .transpose()?;
        Ok(Self { control, data })
    }

    fn data_plane(&self) -> Result<&VendorHttp> {
        self.data.as_ref().ok_or_else(|| {
            PmkError::Config(
                "PINECONE_HOST is not set; vector operations need the index host".into(),
            )
        })
    }
}

#[async_trait]
impl VectorIndex for PineconeClient {
    async fn list_indexes(&self) -> Result<Vec<IndexSummary>> {
        let list: IndexList = self.control.get("/indexes").await?;
        Ok(list.indexes.into_iter().map(IndexSummary::from).collect())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexSummary> {
        let model: IndexModel = self.control.get(&format!("/indexes/{name}")).await?;
        Ok(model.into())
    }

    async fn create_index(&self, request: CreateIndexRequest) -> Result<IndexSummary> {
        let body = json!({
            "name": request.name,
            "dimension": request.dimension,
            "metric": request.metric,
            "spec": { "serverless": { "cloud": request.cloud, "region": request.region } },
        });
        let model: IndexModel = self.control.post("/indexes", &body).await?;
        Ok(model.into())
    }

    async fn upsert(&self, vectors: Vec<Vector>, namespace: Option<&str>) -> Result<u32> {
        let mut body = json!({ "vectors": vectors });
        if let Some(namespace) = namespace {
            body["namespace"] = json!(namespace);
        }
        let response: UpsertResponse = self.data_plane()?.post("/vectors/upsert", &body).await?;
        Ok(response.upserted_count)
    }

    async fn query(&self, query: VectorQuery) -> Result<Vec<VectorMatch>> {
        let response: QueryResponse = self.data_plane()?.post("/query", &query).await?;
        Ok(response.matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_url_adds_scheme() {
        assert_eq!(host_url("idx-abc.svc.pinecone.io"), "https://idx-abc.svc.pinecone.io");
        assert_eq!(host_url("http://localhost:5080"), "http://localhost:5080");
    }

    #[tokio::test]
    async fn test_vector_ops_need_host() {
        let client = PineconeClient::new(PineconeConfig::new("key")).unwrap();
        let err = client.upsert(vec![], None).await.unwrap_err();
        assert!(matches!(err, PmkError::Config(_)));
    }
}
