//! Rate-limited request queue
//!
//! Requests are admitted in epochs. An epoch opens every `window`, the first
//! one immediately, and admits at most `max_requests` requests in arrival
//! order. Admitted requests run concurrently on their own tasks; the drainer
//! never waits for a reply. Whatever is left when the epoch closes waits for
//! the next one, still in order.

use crate::transport::ScanTransport;
use serde_json::Value;
use smrv_errors::{Error, ScanError};
use smrv_events::{AppEvent, EventEmitter, EventSender, FailureContext, QueueEvent};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout_at, MissedTickBehavior};

/// Admission budget of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimit {
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        // Public scanner API quota
        Self::new(240, Duration::from_secs(3600))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    /// A single file sent as multipart field `file`
    Multipart { file_name: String, bytes: Vec<u8> },
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Multipart { file_name, bytes } => f
                .debug_struct("Multipart")
                .field("file_name", file_name)
                .field("size", &bytes.len())
                .finish(),
        }
    }
}

/// One call to the scanner API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Path relative to the scanner API root, or an absolute URL
    pub endpoint: String,
    pub method: Method,
    pub body: RequestBody,
}

impl ScanRequest {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: Method::Get,
            body: RequestBody::Empty,
        }
    }

    pub fn upload(endpoint: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: Method::Post,
            body: RequestBody::Multipart {
                file_name: file_name.into(),
                bytes,
            },
        }
    }
}

type Reply = Result<Value, Error>;

struct PendingRequest {
    request: ScanRequest,
    reply: oneshot::Sender<Reply>,
}

/// Resolves to the reply of one submitted request
///
/// Resolves to `ScanError::QueueClosed` if the drainer went away before the
/// request was executed.
#[must_use = "the request still runs, but its reply is lost"]
pub struct ReplyFuture {
    rx: oneshot::Receiver<Reply>,
}

impl Future for ReplyFuture {
    type Output = Reply;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|reply| reply.unwrap_or_else(|_| Err(ScanError::QueueClosed.into())))
    }
}

/// Handle to the rate-limited queue
///
/// Cheap to clone. The drainer stops once every handle is dropped and the
/// remaining requests have been admitted.
#[derive(Clone)]
pub struct RequestQueue {
    sender: mpsc::UnboundedSender<PendingRequest>,
    tx: EventSender,
}

impl RequestQueue {
    /// Start the drainer task and return a handle to it
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        transport: Arc<dyn ScanTransport>,
        limit: RateLimit,
        tx: EventSender,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drain(receiver, transport, limit, tx.clone()));
        (Self { sender, tx }, handle)
    }

    /// Append a request to the queue without waiting for admission
    pub fn submit(&self, request: ScanRequest) -> ReplyFuture {
        let (reply, rx) = oneshot::channel();

        self.tx.emit(AppEvent::Queue(QueueEvent::Queued {
            endpoint: request.endpoint.clone(),
            method: request.method.to_string(),
        }));

        // A dead drainer drops the pending request, which closes `rx`.
        let _ = self.sender.send(PendingRequest { request, reply });

        ReplyFuture { rx }
    }
}

async fn drain(
    mut receiver: mpsc::UnboundedReceiver<PendingRequest>,
    transport: Arc<dyn ScanTransport>,
    limit: RateLimit,
    tx: EventSender,
) {
    let mut ticker = interval(limit.window);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut epoch = 0u64;
    let mut open = true;

    while open {
        let started = ticker.tick().await;
        let deadline = started + limit.window;
        epoch += 1;

        tx.emit(AppEvent::Queue(QueueEvent::EpochStarted {
            epoch,
            quota: limit.max_requests,
        }));

        let mut admitted = 0u32;
        while admitted < limit.max_requests {
            match timeout_at(deadline, receiver.recv()).await {
                Ok(Some(pending)) => {
                    admitted += 1;
                    tx.emit(AppEvent::Queue(QueueEvent::Admitted {
                        epoch,
                        endpoint: pending.request.endpoint.clone(),
                        admitted,
                    }));
                    tokio::spawn(execute(pending, Arc::clone(&transport), tx.clone()));
                }
                Ok(None) => {
                    open = false;
                    break;
                }
                Err(_) => break,
            }
        }

        if admitted == limit.max_requests {
            tx.emit(AppEvent::Queue(QueueEvent::QuotaExhausted { epoch, admitted }));
        } else if open {
            tx.emit(AppEvent::Queue(QueueEvent::EpochElapsed { epoch, admitted }));
        }
    }

    tx.emit(AppEvent::Queue(QueueEvent::Closed { epochs: epoch }));
}

async fn execute(pending: PendingRequest, transport: Arc<dyn ScanTransport>, tx: EventSender) {
    let PendingRequest { request, reply } = pending;
    let endpoint = request.endpoint.clone();

    let result = transport.execute(request).await;
    if let Err(e) = &result {
        tx.emit(AppEvent::Queue(QueueEvent::RequestFailed {
            endpoint,
            failure: FailureContext::from_error(e),
        }));
    }

    // The caller may have stopped waiting
    let _ = reply.send(result);
}
