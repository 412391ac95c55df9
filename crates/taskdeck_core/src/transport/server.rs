//! Server-side batch execution.
//!
//! # Invariants
//! - Each call in a batch is dispatched independently; one failure never
//!   poisons sibling calls.

use crate::rpc::context::RequestContext;
use crate::rpc::registry::Router;
use crate::transport::wire::{BatchRequest, BatchResponse, CallOutcome};
use log::{info, warn};

/// Executes a whole batch against the router, preserving call order.
pub fn serve_batch(
    router: &Router<'_>,
    ctx: &RequestContext,
    request: &BatchRequest,
) -> BatchResponse {
    info!(
        "event=batch_serve module=transport status=start calls={}",
        request.calls.len()
    );

    let results = request
        .calls
        .iter()
        .map(|call| match router.dispatch(ctx, &call.path, &call.input) {
            Ok(data) => CallOutcome::Ok { data },
            Err(err) => {
                warn!(
                    "event=procedure_failed module=transport path={} code={:?} error={}",
                    call.path,
                    err.code(),
                    err
                );
                CallOutcome::Err {
                    code: err.code(),
                    message: err.to_string(),
                }
            }
        })
        .collect();

    BatchResponse { results }
}
