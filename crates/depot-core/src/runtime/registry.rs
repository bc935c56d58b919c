//! RPC registration and dispatch.

use super::{ArtifactSource, RpcContext, RpcLogger};
use crate::error::{DepotError, Result};
use crate::stats::StatsStore;
use std::collections::HashMap;
use std::sync::Arc;

/// A remote procedure callable by the host.
///
/// Takes the request payload and returns the response payload. On error the
/// host answers with [`RpcReply::EMPTY_PAYLOAD`] and the error.
pub trait RpcFunction: Send + Sync {
    fn call(
        &self,
        ctx: &RpcContext,
        logger: &dyn RpcLogger,
        db: &dyn StatsStore,
        nk: &dyn ArtifactSource,
        payload: &str,
    ) -> Result<String>;
}

/// Registration hook handed to module initialisation.
pub trait Initializer {
    fn register_rpc(&mut self, id: &str, function: Arc<dyn RpcFunction>) -> Result<()>;
}

/// Outcome of a dispatched call as the host sends it back.
#[derive(Debug)]
pub struct RpcReply {
    pub payload: String,
    pub error: Option<DepotError>,
}

impl RpcReply {
    /// Payload paired with every error.
    pub const EMPTY_PAYLOAD: &'static str = "{}";

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<String>> for RpcReply {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(payload) => Self {
                payload,
                error: None,
            },
            Err(err) => Self {
                payload: Self::EMPTY_PAYLOAD.to_string(),
                error: Some(err),
            },
        }
    }
}

/// Name-keyed table of registered RPC functions.
#[derive(Default)]
pub struct RpcRegistry {
    functions: HashMap<String, Arc<dyn RpcFunction>>,
}

impl RpcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn RpcFunction>> {
        self.functions.get(id).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatch a call to the function registered under `ctx.rpc_id`.
    pub fn invoke(
        &self,
        ctx: &RpcContext,
        logger: &dyn RpcLogger,
        db: &dyn StatsStore,
        nk: &dyn ArtifactSource,
        payload: &str,
    ) -> RpcReply {
        let result = match self.get(&ctx.rpc_id) {
            Some(function) => function.call(ctx, logger, db, nk, payload),
            None => Err(DepotError::MethodNotFound(ctx.rpc_id.clone())),
        };
        RpcReply::from(result)
    }
}

impl Initializer for RpcRegistry {
    fn register_rpc(&mut self, id: &str, function: Arc<dyn RpcFunction>) -> Result<()> {
        if self.functions.contains_key(id) {
            return Err(DepotError::misconfigured(format!(
                "RPC already registered: {}",
                id
            )));
        }
        self.functions.insert(id.to_string(), function);
        Ok(())
    }
}

impl std::fmt::Debug for RpcRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
