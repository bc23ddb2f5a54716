use crate::config::{DEFAULT_MAX_WORKFLOW_RUNS, ServerConfig};
use crate::envelope::Responder;
use pmk_agent::{AgentContext, ConversationalWorkflow, WorkflowRun};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Workflow runs held in memory, keyed by session id. Runs are cloned in and out so no
/// run is ever shared mutably between requests.
///
/// Holds at most `capacity` runs; inserting a new session at capacity evicts the run
/// that was updated least recently.
pub struct WorkflowRegistry {
    runs: RwLock<HashMap<String, WorkflowRun>>,
    capacity: usize,
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKFLOW_RUNS)
    }
}

impl WorkflowRegistry {
    pub fn new(capacity: usize) -> Self {
        Self { runs: RwLock::new(HashMap::new()), capacity: capacity.max(1) }
    }

    pub async fn insert(&self, run: WorkflowRun) {
        let mut runs = self.runs.write().await;
        let session_id = run.session.session_id.clone();
        if !runs.contains_key(&session_id) && runs.len() >= self.capacity {
            let oldest = runs
                .iter()
                .min_by_key(|(_, run)| run.session.updated_at)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                runs.remove(&oldest);
                debug!(session.id = %oldest, capacity = self.capacity, "evicted workflow run");
            }
        }
        runs.insert(session_id, run);
    }

    pub async fn get(&self, session_id: &str) -> Option<WorkflowRun> {
        self.runs.read().await.get(session_id).cloned()
    }

    pub async fn remove(&self, session_id: &str) -> Option<WorkflowRun> {
        self.runs.write().await.remove(session_id)
    }

    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub context: AgentContext,
    pub workflow: Arc<ConversationalWorkflow>,
    pub registry: Arc<WorkflowRegistry>,
    expose_error_details: bool,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            context: config.context.clone(),
            workflow: Arc::new(ConversationalWorkflow::new(config.context.clone())),
            registry: Arc::new(WorkflowRegistry::new(config.security.max_workflow_runs)),
            expose_error_details: config.security.expose_error_details,
        }
    }

    pub fn responder(&self, agent_type: &'static str, session_id: Option<String>) -> Responder {
        Responder::start(agent_type, session_id, self.expose_error_details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmk_agent::WorkflowRequest;

    fn run(session_id: &str) -> WorkflowRun {
        WorkflowRun::new(WorkflowRequest::new("idea").with_session_id(session_id))
    }

    #[tokio::test]
    async fn test_registry_evicts_least_recently_updated() {
        let registry = WorkflowRegistry::new(2);
        let b = run("b");
        let mut a = run("a");
        a.session.updated_at = b.session.updated_at + std::time::Duration::from_secs(60);
        registry.insert(b).await;
        registry.insert(a).await;
        registry.insert(registry.get("a").await.unwrap()).await;
        assert_eq!(registry.len().await, 2);

        registry.insert(run("c")).await;

        assert_eq!(registry.len().await, 2);
        assert!(registry.get("b").await.is_none());
        assert!(registry.get("a").await.is_some());
        assert!(registry.get("c").await.is_some());
    }

    #[tokio::test]
    async fn test_remove_forgets_run() {
        let registry = WorkflowRegistry::default();
        registry.insert(run("a")).await;
        assert!(registry.remove("a").await.is_some());
        assert!(registry.remove("a").await.is_none());
        assert!(registry.is_empty().await);
    }
}
