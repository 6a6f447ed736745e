// src/handlers/pools.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, warn};

use crate::pools::PoolCache;

#[derive(Clone)]
pub struct PoolsState {
    pub pools: Arc<PoolCache>,
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Unable to find pool.").into_response()
}

// GET /api/pool/:class -> whole pool as JSON
pub async fn get_pool(State(st): State<PoolsState>, Path(class): Path<String>) -> Response {
    match st.pools.get(&class).await {
        Ok(pool) => Json(pool.as_ref()).into_response(),
        Err(e) => {
            warn!("unable to serve pool {class:?}: {e}");
            not_found()
        }
    }
}

// POST /api/admin/pools/:class/reload -> { ok, class, questions, cached }
pub async fn reload_pool(State(st): State<PoolsState>, Path(class): Path<String>) -> Response {
    match st.pools.reload(&class).await {
        Ok(pool) => {
            info!(class = %class, questions = pool.questions.len(), "pool reloaded");
            let cached = st.pools.cached_classes().await;
            Json(json!({
                "ok": true,
                "class": class,
                "questions": pool.questions.len(),
                "cached": cached,
            }))
            .into_response()
        }
        Err(e) => {
            warn!("unable to reload pool {class:?}: {e}");
            not_found()
        }
    }
}
