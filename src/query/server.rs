use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::dart::space::DartSpace;
use crate::query::dispatch::{DispatchRequest, DispatchResponse, IndexServer};
use crate::storage::snapshot::SnapshotStore;

#[derive(Serialize)]
pub struct DumpResponse {
    pub success: bool,
    pub files_written: usize,
}

struct AppState {
    server: Arc<IndexServer>,
    space: Arc<DartSpace>,
    store: SnapshotStore,
}

/// dispatch HTTP 面：POST /dispatch 走索引操作，GET /server_info 供
/// 插入路径 two-choice 取负载，GET /status 看计数，POST /dump 落快照。
pub struct QueryServer {
    server: Arc<IndexServer>,
    space: Arc<DartSpace>,
    store: SnapshotStore,
}

impl QueryServer {
    pub fn new(server: Arc<IndexServer>, space: Arc<DartSpace>, store: SnapshotStore) -> Self {
        Self {
            server,
            space,
            store,
        }
    }

    pub async fn run(self, port: u16) -> anyhow::Result<()> {
        let state = Arc::new(AppState {
            server: self.server,
            space: self.space,
            store: self.store,
        });
        let app = Router::new()
            .route("/dispatch", post(dispatch_handler))
            .route("/server_info", get(server_info_handler))
            .route("/status", get(status_handler))
            .route("/dump", post(dump_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        tracing::info!("Index dispatch server listening on port {}", port);
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn dispatch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DispatchRequest>,
) -> Json<DispatchResponse> {
    Json(state.server.perform(&req))
}

async fn server_info_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let load = state.server.server_load();
    Json(serde_json::json!({
        "id": load.id,
        "indexed_word_count": load.indexed_word_count,
        "request_count": load.request_count,
    }))
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let stats = state.server.stats();
    Json(serde_json::to_value(&stats).unwrap_or_else(|_| serde_json::json!({})))
}

async fn dump_handler(State(state): State<Arc<AppState>>) -> Json<DumpResponse> {
    let result = state
        .server
        .with_engine(|engine| state.store.dump(engine, &state.space));
    match result {
        Ok(files_written) => Json(DumpResponse {
            success: true,
            files_written,
        }),
        Err(e) => {
            tracing::error!("Index dump failed: {}", e);
            Json(DumpResponse {
                success: false,
                files_written: 0,
            })
        }
    }
}
