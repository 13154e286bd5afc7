//! Mock backend for deterministic testing
//!
//! Returns scripted responses without any network traffic, split into small
//! increments so streaming consumers see more than one piece. Every call is
//! recorded, and the call log marks when each stream starts and finishes, so
//! tests can check ordering between calls.

use crate::{GenerationBackend, GenerationError, GenerationRequest, TextStream};
use async_trait::async_trait;
use futures::stream;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What a scripted call does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Stream this text, then finish
    Text(String),

    /// Fail before any increment is produced
    FailBefore(GenerationError),

    /// Stream `partial`, then fail
    FailAfter {
        /// Text streamed before the failure
        partial: String,
        /// The failure
        error: GenerationError,
    },
}

/// Entry in the call log (calls are numbered from 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallEvent {
    /// `stream()` was invoked
    Started(usize),
    /// The stream yielded its last increment and ended
    Finished(usize),
    /// The call failed, before or during streaming
    Failed(usize),
}

/// Mock generation backend
///
/// # Examples
///
/// ```
/// use longread_llm::{GenerationBackend, GenerationRequest, MockBackend, ReasoningLevel};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let backend = MockBackend::new("default")
///     .reply_on(2, "second call")
///     .add_response("Chapter 9", "matched by content");
///
/// let ask = |msg: &str| GenerationRequest::new("sys", msg, ReasoningLevel::High);
/// assert_eq!(backend.generate(ask("a")).await.unwrap(), "default");
/// assert_eq!(backend.generate(ask("b")).await.unwrap(), "second call");
/// assert_eq!(backend.generate(ask("... Chapter 9 ...")).await.unwrap(), "matched by content");
/// assert_eq!(backend.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_reply: String,
    piece_size: usize,
    by_call: Arc<Mutex<HashMap<usize, MockReply>>>,
    by_content: Arc<Mutex<Vec<(String, MockReply)>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    events: Arc<Mutex<Vec<CallEvent>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBackend {
    /// Create a mock that answers every call with `reply`
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            default_reply: reply.into(),
            piece_size: 8,
            by_call: Arc::new(Mutex::new(HashMap::new())),
            by_content: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of chars per streamed increment (minimum 1)
    pub fn with_piece_size(mut self, chars: usize) -> Self {
        self.piece_size = chars.max(1);
        self
    }

    /// Script the reply of the n-th call (1-based)
    pub fn script(self, call: usize, reply: MockReply) -> Self {
        lock(&self.by_call).insert(call, reply);
        self
    }

    /// Answer the n-th call with `text`
    pub fn reply_on(self, call: usize, text: impl Into<String>) -> Self {
        self.script(call, MockReply::Text(text.into()))
    }

    /// Fail the n-th call before it streams anything
    pub fn fail_on(self, call: usize, error: GenerationError) -> Self {
        self.script(call, MockReply::FailBefore(error))
    }

    /// Stream `partial` on the n-th call, then fail
    pub fn fail_mid_stream(self, call: usize, partial: impl Into<String>, error: GenerationError) -> Self {
        self.script(
            call,
            MockReply::FailAfter {
                partial: partial.into(),
                error,
            },
        )
    }

    /// Answer any call whose message contains `marker` with `text`
    pub fn add_response(self, marker: impl Into<String>, text: impl Into<String>) -> Self {
        lock(&self.by_content).push((marker.into(), MockReply::Text(text.into())));
        self
    }

    /// Fail any call whose message contains `marker`
    pub fn add_error(self, marker: impl Into<String>, error: GenerationError) -> Self {
        lock(&self.by_content).push((marker.into(), MockReply::FailBefore(error)));
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    /// Every request received, in call order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock(&self.requests).clone()
    }

    /// The call log
    pub fn events(&self) -> Vec<CallEvent> {
        lock(&self.events).clone()
    }

    /// Forget recorded calls (scripts are kept)
    pub fn reset(&self) {
        lock(&self.requests).clear();
        lock(&self.events).clear();
    }

    fn reply_for(&self, call: usize, message: &str) -> MockReply {
        if let Some(reply) = lock(&self.by_call).get(&call) {
            return reply.clone();
        }
        lock(&self.by_content)
            .iter()
            .find(|(marker, _)| message.contains(marker.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| MockReply::Text(self.default_reply.clone()))
    }

    fn pieces(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.piece_size)
            .map(|piece| piece.iter().collect())
            .collect()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

struct Playback {
    pieces: std::vec::IntoIter<String>,
    error: Option<GenerationError>,
    call: usize,
    events: Arc<Mutex<Vec<CallEvent>>>,
    done: bool,
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn stream(&self, request: GenerationRequest) -> Result<TextStream, GenerationError> {
        let call = {
            let mut requests = lock(&self.requests);
            requests.push(request.clone());
            requests.len()
        };
        lock(&self.events).push(CallEvent::Started(call));

        let (text, error) = match self.reply_for(call, &request.message) {
            MockReply::Text(text) => (text, None),
            MockReply::FailBefore(error) => {
                lock(&self.events).push(CallEvent::Failed(call));
                return Err(error);
            }
            MockReply::FailAfter { partial, error } => (partial, Some(error)),
        };

        let playback = Playback {
            pieces: self.pieces(&text).into_iter(),
            error,
            call,
            events: Arc::clone(&self.events),
            done: false,
        };

        let increments = stream::unfold(playback, |mut playback| async move {
            if let Some(piece) = playback.pieces.next() {
                return Some((Ok(piece), playback));
            }
            if playback.done {
                return None;
            }
            playback.done = true;
            match playback.error.take() {
                Some(error) => {
                    lock(&playback.events).push(CallEvent::Failed(playback.call));
                    Some((Err(error), playback))
                }
                None => {
                    lock(&playback.events).push(CallEvent::Finished(playback.call));
                    None
                }
            }
        });

        Ok(Box::pin(increments))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReasoningLevel;
    use futures::StreamExt;

    fn request(message: &str) -> GenerationRequest {
        GenerationRequest::new("system", message, ReasoningLevel::High)
    }

    #[tokio::test]
    async fn test_mock_default_reply() {
        let backend = MockBackend::new("Test response");
        assert_eq!(backend.generate(request("any")).await.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_streams_in_pieces() {
        let backend = MockBackend::new("第一章开始了").with_piece_size(2);
        let pieces: Vec<_> = backend
            .stream(request("x"))
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;
        let pieces: Vec<String> = pieces.into_iter().map(Result::unwrap).collect();
        assert_eq!(pieces, vec!["第一", "章开", "始了"]);
    }

    #[tokio::test]
    async fn test_mock_call_log() {
        let backend = MockBackend::new("ok").fail_on(2, GenerationError::RateLimited);

        backend.generate(request("1")).await.unwrap();
        assert!(backend.generate(request("2")).await.is_err());

        assert_eq!(
            backend.events(),
            vec![
                CallEvent::Started(1),
                CallEvent::Finished(1),
                CallEvent::Started(2),
                CallEvent::Failed(2),
            ]
        );
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_fail_mid_stream() {
        let backend = MockBackend::new("unused")
            .with_piece_size(100)
            .fail_mid_stream(1, "partial", GenerationError::Stream("cut".into()));

        let items: Vec<_> = backend.stream(request("x")).await.unwrap().collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Ok("partial".to_string()));
        assert_eq!(items[1], Err(GenerationError::Stream("cut".into())));
        assert_eq!(backend.events().last(), Some(&CallEvent::Failed(1)));
    }

    #[tokio::test]
    async fn test_mock_content_match_and_errors() {
        let backend = MockBackend::default()
            .add_response("hello", "world")
            .add_error("bad", GenerationError::Other("Mock error".into()));

        assert_eq!(backend.generate(request("say hello")).await.unwrap(), "world");
        assert_eq!(backend.generate(request("unknown")).await.unwrap(), "Default mock response");
        assert!(matches!(
            backend.generate(request("bad prompt")).await,
            Err(GenerationError::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_records_requests_and_resets() {
        let backend = MockBackend::new("x");
        backend
            .generate(GenerationRequest::new("sys", "msg", ReasoningLevel::Low))
            .await
            .unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].reasoning, ReasoningLevel::Low);

        backend.reset();
        assert_eq!(backend.call_count(), 0);
        assert!(backend.events().is_empty());
    }

    #[tokio::test]
    async fn test_mock_clone_shares_log() {
        let backend1 = MockBackend::new("test");
        let backend2 = backend1.clone();

        backend1.generate(request("x")).await.unwrap();

        assert_eq!(backend1.call_count(), 1);
        assert_eq!(backend2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_empty_reply_finishes() {
        let backend = MockBackend::new("");
        assert_eq!(backend.generate(request("x")).await.unwrap(), "");
        assert_eq!(backend.events(), vec![CallEvent::Started(1), CallEvent::Finished(1)]);
    }
}
