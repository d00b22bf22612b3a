//! Frame Solver HTTP Server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use frame_solver::prelude::*;

const DEFAULT_ADDR: &str = "0.0.0.0:8086";

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct SolveRequest {
    model: ModelDescription,
    #[serde(default)]
    options: Option<SolveOptions>,
}

#[derive(Debug, Serialize)]
struct SolveResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<ResultsData>,
}

#[derive(Debug, Serialize)]
struct ResultsData {
    node_displacements: Vec<NodeDisplacementResult>,
    summary: SolveSummary,
}

#[derive(Debug, Serialize)]
struct NodeDisplacementResult {
    /// Ordinal of the node in the request
    node: usize,
    #[serde(flatten)]
    displacement: NodeDisplacement,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn solve(Json(request): Json<SolveRequest>) -> impl IntoResponse {
    match run_solve(request) {
        Ok(results) => (
            StatusCode::OK,
            Json(SolveResponse {
                success: true,
                error: None,
                results: Some(results),
            }),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(SolveResponse {
                success: false,
                error: Some(e.to_string()),
                results: None,
            }),
        ),
    }
}

fn run_solve(request: SolveRequest) -> FrameResult<ResultsData> {
    // A fresh model hands out slots in order, so slot == request ordinal
    let mut model = Model::from_description(&request.model)?;
    let summary = model.solve_with(request.options.unwrap_or_default())?;

    let node_displacements = model
        .nodes()
        .map(|node| NodeDisplacementResult {
            node: node.slot(),
            displacement: model.node_displacement(node.slot()),
        })
        .collect();

    Ok(ResultsData {
        node_displacements,
        summary,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/solve", post(solve))
        .layer(cors);

    let addr: SocketAddr = std::env::var("FRAME_SOLVER_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;
    info!("Frame Solver Server listening on http://{addr}");
    println!("  Health check: GET  /health");
    println!("  Solve:        POST /api/v1/solve");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
