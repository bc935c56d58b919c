//! Per-call context handed to RPC functions by the host.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation flag shared between the host and an in-flight call.
///
/// Cloning shares the flag. RPC functions in this crate are short and
/// synchronous, so none of them poll it; it is carried for hosts that do.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Ambient context for a single RPC invocation.
#[derive(Debug, Clone)]
pub struct RpcContext {
    /// Name the call was dispatched under.
    pub rpc_id: String,
    pub cancel: CancellationToken,
}

impl RpcContext {
    pub fn new(rpc_id: impl Into<String>) -> Self {
        Self {
            rpc_id: rpc_id.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Context sharing an existing cancellation token.
    pub fn with_token(rpc_id: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            rpc_id: rpc_id.into(),
            cancel,
        }
    }
}
