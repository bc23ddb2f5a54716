//! # pmk-integrations
//!
//! Thin HTTP adapters for the services the workflow publishes to.
//!
//! - [`LinearClient`] implements [`IssueTracker`] (GraphQL)
//! - [`MiroClient`] implements [`BoardCanvas`] (REST v2)
//! - [`NotionClient`] implements [`DocumentPublisher`]
//! - [`PineconeClient`] implements [`VectorIndex`]
//!
//! Every adapter shares [`VendorHttp`] for timeouts and status mapping. Steps depend only
//! on the traits, so they can be exercised against in-memory fakes.

pub mod batch;
pub mod config;
pub mod http;
pub mod linear;
pub mod miro;
pub mod notion;
pub mod pinecone;
pub mod traits;

use std::sync::Arc;

pub use batch::run_best_effort;
pub use config::{IntegrationsConfig, LinearConfig, MiroConfig, NotionConfig, PineconeConfig};
pub use http::{DEFAULT_TIMEOUT, VendorHttp};
pub use linear::{LinearClient, LinearTeam, LinearUser};
pub use miro::MiroClient;
pub use notion::{NotionClient, prd_blocks};
pub use pinecone::PineconeClient;
pub use traits::{
    BoardCanvas, CreateIndexRequest, CreatedCycle, CreatedIssue, CycleInput, DocumentPublisher,
    IndexSummary, IssueInput, IssueTracker, Position, ShapeItem, StickyNote, TextItem, Vector,
    VectorIndex, VectorMatch, VectorQuery,
};

/// The adapters available to a workflow. A `None` slot means the vendor is not configured.
#[derive(Clone, Default)]
pub struct Integrations {
    pub issue_tracker: Option<Arc<dyn IssueTracker>>,
    pub board_canvas: Option<Arc<dyn BoardCanvas>>,
    pub document_publisher: Option<Arc<dyn DocumentPublisher>>,
    pub vector_index: Option<Arc<dyn VectorIndex>>,
}

impl Integrations {
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a client for every configured vendor.
    pub fn from_config(config: &IntegrationsConfig) -> pmk_core::Result<Self> {
        let mut integrations = Self::none();
        if let Some(linear) = &config.linear {
            integrations.issue_tracker = Some(Arc::new(LinearClient::new(linear.clone())?));
        }
        if let Some(miro) = &config.miro {
            integrations.board_canvas = Some(Arc::new(MiroClient::new(miro.clone())?));
        }
        if let Some(notion) = &config.notion {
            integrations.document_publisher = Some(Arc::new(NotionClient::new(notion.clone())?));
        }
        if let Some(pinecone) = &config.pinecone {
            integrations.vector_index = Some(Arc::new(PineconeClient::new(pinecone.clone())?));
        }
        Ok(integrations)
    }

    pub fn with_issue_tracker(mut self, tracker: Arc<dyn IssueTracker>) -> Self {
        self.issue_tracker = Some(tracker);
        self
    }

    pub fn with_board_canvas(mut self, canvas: Arc<dyn BoardCanvas>) -> Self {
        self.board_canvas = Some(canvas);
        self
    }

    pub fn with_document_publisher(mut self, publisher: Arc<dyn DocumentPublisher>) -> Self {
        self.document_publisher = Some(publisher);
        self
    }

    pub fn with_vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }
}

impl std::fmt::Debug for Integrations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integrations")
            .field("issue_tracker", &self.issue_tracker.is_some())
            .field("board_canvas", &self.board_canvas.is_some())
            .field("document_publisher", &self.document_publisher.is_some())
            .field("vector_index", &self.vector_index.is_some())
            .finish()
    }
}
