//! Vendor diagnostics: confirm a key works and show what it can see.

use anyhow::{Context, Result, anyhow};
use pmk_integrations::{IndexSummary, Integrations, LinearClient, LinearConfig};

pub async fn linear_teams() -> Result<()> {
    let config = LinearConfig::from_env()
        .ok_or_else(|| anyhow!("LINEAR_API_KEY is not set"))?;
    let teams = LinearClient::new(config)?.teams().await.context("listing Linear teams")?;
    if teams.is_empty() {
        println!("No teams visible to this key");
    }
    for team in teams {
        println!("{:<8} {:<36} {}", team.key, team.id, team.name);
    }
    Ok(())
}

/// One line per index in the configured Pinecone project.
pub async fn index_lines(integrations: &Integrations) -> Result<Vec<String>> {
    let index = integrations
        .vector_index
        .as_ref()
        .ok_or_else(|| anyhow!("PINECONE_API_KEY is not set"))?;
    let indexes = index.list_indexes().await.context("listing Pinecone indexes")?;
    Ok(indexes.iter().map(format_index).collect())
}

pub async fn pinecone_indexes(integrations: &Integrations) -> Result<()> {
    let lines = index_lines(integrations).await?;
    if lines.is_empty() {
        println!("No indexes in this project");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn format_index(index: &IndexSummary) -> String {
    let state = if index.ready { "ready" } else { "initializing" };
    format!(
        "{:<24} dim={:<5} {:<10} {:<12} {}",
        index.name, index.dimension, index.metric, state, index.host
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pmk_core::{PmkError, Result as PmkResult};
    use pmk_integrations::{CreateIndexRequest, Vector, VectorIndex, VectorMatch, VectorQuery};
    use std::sync::Arc;

    struct FixedIndexes(Vec<IndexSummary>);

    #[async_trait]
    impl VectorIndex for FixedIndexes {
        async fn list_indexes(&self) -> PmkResult<Vec<IndexSummary>> {
            Ok(self.0.clone())
        }

        async fn describe_index(&self, name: &str) -> PmkResult<IndexSummary> {
            self.0
                .iter()
                .find(|i| i.name == name)
                .cloned()
                .ok_or_else(|| PmkError::Validation(format!("no index {name}")))
        }

        async fn create_index(&self, _request: CreateIndexRequest) -> PmkResult<IndexSummary> {
            Err(PmkError::Validation("read-only".into()))
        }

        async fn upsert(&self, _vectors: Vec<Vector>, _namespace: Option<&str>) -> PmkResult<u32> {
            Ok(0)
        }

        async fn query(&self, _query: VectorQuery) -> PmkResult<Vec<VectorMatch>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn test_index_lines_use_injected_index() {
        let index = IndexSummary {
            name: "prd-search".into(),
            dimension: 768,
            metric: "cosine".into(),
            host: "prd-search-abc.svc.pinecone.io".into(),
            ready: true,
        };
        let integrations =
            Integrations::none().with_vector_index(Arc::new(FixedIndexes(vec![index])));
        let lines = index_lines(&integrations).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("prd-search"));
        assert!(lines[0].contains("dim=768"));
        assert!(lines[0].contains("ready"));
    }

    #[tokio::test]
    async fn test_missing_pinecone_is_reported() {
        let err = index_lines(&Integrations::none()).await.unwrap_err();
        assert!(err.to_string().contains("PINECONE_API_KEY"));
    }
}
