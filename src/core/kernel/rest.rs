use crate::core::errors::LastFmError;
use crate::core::kernel::request::HttpVerb;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{instrument, trace};

/// A fully finalized request ready for dispatch: verb, the complete parameter
/// set (fixed parameters, session token and signature already merged) and an
/// optional per-call timeout override.
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub verb: HttpVerb,
    pub params: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl WireRequest {
    pub fn new(verb: HttpVerb, params: BTreeMap<String, String>) -> Self {
        Self {
            verb,
            params,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Transport seam between the client and the network.
///
/// Implementations execute one request and resolve exactly once with the raw
/// response body or a transport-level error. The body is returned even for
/// non-2xx statuses whenever one was received, because the service embeds its
/// error envelope in those bodies and the decoder must see it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &WireRequest) -> Result<String, LastFmError>;
}

/// Configuration for the HTTP transport
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Root endpoint URL; all methods are routed through it
    pub base_url: String,
    /// Default request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl HttpTransportConfig {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            timeout_seconds: 30,
            user_agent: "lastkit/0.1".to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// `Transport` implementation over reqwest.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: HttpTransportConfig,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, LastFmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                LastFmError::Config(crate::core::config::ConfigError::InvalidConfiguration(
                    format!("Failed to build HTTP client: {}", e),
                ))
            })?;

        Ok(Self { client, config })
    }

    fn classify(e: &reqwest::Error) -> LastFmError {
        if e.is_timeout() {
            LastFmError::Network(format!("request timed out: {}", e))
        } else {
            LastFmError::Network(format!("request failed: {}", e))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(verb = ?request.verb, param_count = request.params.len()))]
    async fn execute(&self, request: &WireRequest) -> Result<String, LastFmError> {
        let query: Vec<(&str, &str)> = request
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let mut builder = match request.verb {
            HttpVerb::Get => self.client.get(&self.config.base_url).query(&query),
            // Write methods carry their parameters form-encoded in the body,
            // per the service's requirement for mutating calls.
            HttpVerb::Post => self.client.post(&self.config.base_url).form(&query),
        };

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| Self::classify(&e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LastFmError::Network(format!("Failed to read response body: {}", e)))?;

        trace!(status = %status, "response body: {}", body);

        // Non-2xx statuses still flow to the decoder: the error envelope in
        // the body is authoritative. Only an empty failure body becomes a
        // network error here.
        if !status.is_success() && body.trim().is_empty() {
            return Err(LastFmError::Network(format!(
                "HTTP {} with empty body",
                status
            )));
        }

        Ok(body)
    }
}

/// Handle to one in-flight operation.
///
/// The operation runs on the tokio runtime as soon as the handle is created.
/// Awaiting the handle yields the operation's single resolution. `cancel`
/// consumes the handle and aborts the task, so a cancelled operation can never
/// deliver a late completion; cancelling an already-finished task is a no-op.
/// Dropping the handle detaches the operation without cancelling it.
#[derive(Debug)]
pub struct RequestHandle<T> {
    handle: JoinHandle<Result<T, LastFmError>>,
}

impl<T: Send + 'static> RequestHandle<T> {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, LastFmError>> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Abort the in-flight operation. Consumes the handle: once cancelled,
    /// the outcome can no longer be observed.
    pub fn cancel(self) {
        self.handle.abort();
    }

    /// Whether the operation has already resolved.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T> Future for RequestHandle<T> {
    type Output = Result<T, LastFmError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join_err)) => Poll::Ready(Err(LastFmError::Network(format!(
                "request task failed: {}",
                join_err
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn handle_resolves_once_with_the_operation_result() {
        let handle = RequestHandle::spawn(async { Ok::<_, LastFmError>(42) });
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn cancelled_handle_never_completes_the_operation() {
        let completed = Arc::new(AtomicBool::new(false));
        let flag = completed.clone();

        let handle = RequestHandle::spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, LastFmError>(())
        });

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancel_after_completion_is_a_no_op() {
        let handle = RequestHandle::spawn(async { Ok::<_, LastFmError>(()) });
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        handle.cancel();
    }
}
