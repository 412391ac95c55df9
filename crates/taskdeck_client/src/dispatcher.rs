//! Batching transport seam.
//!
//! # Responsibility
//! - Define the client-side transport contract for one batched round trip.
//! - Coalesce calls enqueued between pumps into a single exchange.
//!
//! # Invariants
//! - All calls queued since the previous flush travel in one
//!   `BatchRequest`.
//! - Outcomes are matched to calls positionally; a count mismatch is a
//!   transport failure, not a partial result.

use log::debug;
use rusqlite::Connection;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use taskdeck_core::{serve_batch, BatchRequest, BatchResponse, CallOutcome, ProcedureCall, RequestContext, Router};

/// Transport-level failure: the whole exchange, not one call, failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The exchange could not complete.
    Exchange(String),
    /// The response shape did not match the request.
    ResponseMismatch { sent: usize, received: usize },
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exchange(message) => write!(f, "transport exchange failed: {message}"),
            Self::ResponseMismatch { sent, received } => write!(
                f,
                "transport returned {received} outcomes for {sent} calls"
            ),
        }
    }
}

impl Error for TransportError {}

/// One batched request/response exchange.
pub trait Transport {
    fn round_trip(
        &self,
        ctx: &RequestContext,
        request: BatchRequest,
    ) -> Result<BatchResponse, TransportError>;
}

/// Transport binding directly to a core router in the same process.
pub struct InProcessTransport<'conn> {
    router: Router<'conn>,
}

impl<'conn> InProcessTransport<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            router: Router::new(conn),
        }
    }
}

impl Transport for InProcessTransport<'_> {
    fn round_trip(
        &self,
        ctx: &RequestContext,
        request: BatchRequest,
    ) -> Result<BatchResponse, TransportError> {
        Ok(serve_batch(&self.router, ctx, &request))
    }
}

/// Call queue coalescing a scheduling tick into one round trip.
#[derive(Debug, Default)]
pub struct BatchDispatcher {
    queue: Vec<ProcedureCall>,
}

impl BatchDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one call for the next flush; returns its position.
    pub fn enqueue(&mut self, path: &str, input: Value) -> usize {
        self.queue.push(ProcedureCall::new(path, input));
        self.queue.len() - 1
    }

    /// Number of queued calls.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Sends every queued call as one batch and pairs outcomes positionally.
    pub fn flush(
        &mut self,
        transport: &dyn Transport,
        ctx: &RequestContext,
    ) -> Result<Vec<CallOutcome>, TransportError> {
        if self.queue.is_empty() {
            return Ok(Vec::new());
        }

        let calls = std::mem::take(&mut self.queue);
        let sent = calls.len();
        debug!("event=batch_flush module=dispatcher calls={sent}");

        let response = transport.round_trip(ctx, BatchRequest { calls })?;
        if response.results.len() != sent {
            return Err(TransportError::ResponseMismatch {
                sent,
                received: response.results.len(),
            });
        }

        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchDispatcher, Transport, TransportError};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use taskdeck_core::{BatchRequest, BatchResponse, CallOutcome, RequestContext};

    struct RecordingTransport {
        batches: RefCell<Vec<usize>>,
    }

    impl Transport for RecordingTransport {
        fn round_trip(
            &self,
            _ctx: &RequestContext,
            request: BatchRequest,
        ) -> Result<BatchResponse, TransportError> {
            self.batches.borrow_mut().push(request.calls.len());
            Ok(BatchResponse {
                results: request
                    .calls
                    .iter()
                    .map(|call| CallOutcome::Ok {
                        data: json!({ "echo": call.path }),
                    })
                    .collect(),
            })
        }
    }

    #[test]
    fn calls_in_one_tick_share_one_round_trip() {
        let transport = RecordingTransport {
            batches: RefCell::new(Vec::new()),
        };
        let ctx = RequestContext::anonymous();
        let mut dispatcher = BatchDispatcher::new();

        dispatcher.enqueue("project.getAllProjects", Value::Null);
        dispatcher.enqueue("project.getAllUsersProjectReport", Value::Null);
        let outcomes = dispatcher.flush(&transport, &ctx).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(*transport.batches.borrow(), vec![2]);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[test]
    fn empty_queue_skips_the_transport() {
        let transport = RecordingTransport {
            batches: RefCell::new(Vec::new()),
        };
        let ctx = RequestContext::anonymous();
        let mut dispatcher = BatchDispatcher::new();

        let outcomes = dispatcher.flush(&transport, &ctx).unwrap();
        assert!(outcomes.is_empty());
        assert!(transport.batches.borrow().is_empty());
    }

    struct TruncatingTransport;

    impl Transport for TruncatingTransport {
        fn round_trip(
            &self,
            _ctx: &RequestContext,
            _request: BatchRequest,
        ) -> Result<BatchResponse, TransportError> {
            Ok(BatchResponse { results: Vec::new() })
        }
    }

    #[test]
    fn outcome_count_mismatch_is_a_transport_error() {
        let ctx = RequestContext::anonymous();
        let mut dispatcher = BatchDispatcher::new();
        dispatcher.enqueue("project.getAllProjects", Value::Null);

        let err = dispatcher.flush(&TruncatingTransport, &ctx).unwrap_err();
        assert_eq!(
            err,
            TransportError::ResponseMismatch {
                sent: 1,
                received: 0
            }
        );
    }
}
