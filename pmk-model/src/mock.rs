use async_trait::async_trait;
use pmk_core::{Llm, LlmRequest, LlmResponse, PmkError, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

type Responder = Arc<dyn Fn(&LlmRequest) -> Result<LlmResponse> + Send + Sync>;

/// Scripted model for tests and offline runs.
///
/// Queued responses are served first, in order. Once the queue is empty the responder
/// (if any) answers every further request. Every request is recorded.
pub struct MockLlm {
    name: String,
    queue: Mutex<VecDeque<Result<LlmResponse>>>,
    responder: Option<Responder>,
    delay: Option<Duration>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queue: Mutex::new(VecDeque::new()),
            responder: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, response: LlmResponse) -> Self {
        self.push(Ok(response))
    }

    /// Queue a plain-text response.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(LlmResponse::text(text))
    }

    /// Queue a JSON payload rendered as response text.
    pub fn with_json(self, value: serde_json::Value) -> Self {
        self.with_text(value.to_string())
    }

    pub fn with_error(self, error: PmkError) -> Self {
        self.push(Err(error))
    }

    /// Answer requests computed from the request itself once the queue is drained.
    pub fn with_responder(
        mut self,
        responder: impl Fn(&LlmRequest) -> Result<LlmResponse> + Send + Sync + 'static,
    ) -> Self {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Sleep before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn push(mut self, item: Result<LlmResponse>) -> Self {
        self.queue.get_mut().push_back(item);
        self
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_content(&self, req: LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().await.push(req.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(scripted) = self.queue.lock().await.pop_front() {
            return scripted;
        }

        match &self.responder {
            Some(responder) => responder(&req),
            None => Err(PmkError::Model(format!("{} has no scripted response left", self.name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_llm_serves_queue_in_order() {
        let mock = MockLlm::new("test").with_text("first").with_text("second");

        let req = LlmRequest::from_prompt("test", "hi");
        let a = mock.generate_content(req.clone()).await.unwrap();
        let b = mock.generate_content(req.clone()).await.unwrap();
        assert_eq!(a.text_content(), "first");
        assert_eq!(b.text_content(), "second");
        assert!(mock.generate_content(req).await.is_err());
        assert_eq!(mock.call_count().await, 3);
    }

    #[tokio::test]
    async fn test_mock_llm_responder_sees_prompt() {
        let mock = MockLlm::new("echo")
            .with_responder(|req| Ok(LlmResponse::text(req.prompt_text().to_uppercase())));

        let resp = mock.generate_content(LlmRequest::from_prompt("m", "hello")).await.unwrap();
        assert_eq!(resp.text_content(), "HELLO");
        assert_eq!(mock.requests().await[0].prompt_text(), "hello");
    }

    #[tokio::test]
    async fn test_mock_llm_scripted_error() {
        let mock = MockLlm::new("failing").with_error(PmkError::Model("boom".into()));
        let err = mock.generate_content(LlmRequest::from_prompt("m", "x")).await.unwrap_err();
        assert!(matches!(err, PmkError::Model(_)));
    }
}
