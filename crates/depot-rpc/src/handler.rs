//! JSON-RPC request handlers.

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use depot_core::{RpcContext, RpcReply};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Error carrying the empty payload, for failures raised by the host itself.
    pub fn failure(id: Option<Value>, code: i32, message: String) -> Self {
        Self::error_with_data(
            id,
            code,
            message,
            Some(json!({ "payload": RpcReply::EMPTY_PAYLOAD })),
        )
    }

    pub fn error_with_data(
        id: Option<Value>,
        code: i32,
        message: String,
        data: Option<Value>,
    ) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
            id,
        }
    }
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Main JSON-RPC handler.
///
/// `method` names a registered RPC. The payload handed to it is taken from
/// `params`: absent or null is a blank payload, a string is used verbatim and
/// an object is re-serialized.
pub async fn handle_rpc(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let method = request.method;
    let id = request.id;

    debug!("RPC call: {}({:?})", method, request.params);

    if method == "health_check" {
        return (
            StatusCode::OK,
            Json(JsonRpcResponse::success(id, json!({"status": "ok"}))),
        );
    }

    let payload = match payload_from_params(request.params) {
        Some(payload) => payload,
        None => {
            return (
                StatusCode::OK,
                Json(JsonRpcResponse::failure(
                    id,
                    -32602,
                    "params must be a string, an object or null".to_string(),
                )),
            );
        }
    };

    // RPC functions do blocking file and database I/O
    let ctx = RpcContext::new(method.clone());
    let reply = tokio::task::spawn_blocking(move || {
        state
            .registry
            .invoke(&ctx, &state.logger, &state.store, &state.source, &payload)
    })
    .await;

    match reply {
        Ok(RpcReply {
            payload,
            error: None,
        }) => (
            StatusCode::OK,
            Json(JsonRpcResponse::success(id, Value::String(payload))),
        ),
        Ok(RpcReply {
            payload,
            error: Some(e),
        }) => {
            if e.is_client_error() {
                info!("RPC {} rejected: {}", method, e);
            } else {
                error!("RPC error for {}: {}", method, e);
            }
            (
                StatusCode::OK,
                Json(JsonRpcResponse::error_with_data(
                    id,
                    e.to_rpc_error_code(),
                    e.to_string(),
                    Some(json!({ "payload": payload })),
                )),
            )
        }
        Err(e) => {
            error!("RPC task for {} failed: {}", method, e);
            (
                StatusCode::OK,
                Json(JsonRpcResponse::failure(
                    id,
                    -32603,
                    format!("Internal error: {}", e),
                )),
            )
        }
    }
}

/// Turn JSON-RPC params into a raw payload string.
fn payload_from_params(params: Option<Value>) -> Option<String> {
    match params {
        None | Some(Value::Null) => Some(String::new()),
        Some(Value::String(payload)) => Some(payload),
        Some(object @ Value::Object(_)) => Some(object.to_string()),
        Some(_) => None,
    }
}
