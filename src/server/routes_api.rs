use crate::pipeline::{DownloadReport, DownloadRequest};
use crate::server::AppContext;
use crate::tools;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/downloads", post(submit_download))
        .route("/libraries", get(list_libraries))
        .route("/tools", get(list_tools))
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

fn error_body(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
        }),
    )
}

/// Submit a download. The response is not sent until the whole pipeline has
/// finished, which may take minutes.
async fn submit_download(
    State(ctx): State<AppContext>,
    Json(request): Json<DownloadRequest>,
) -> Result<Json<DownloadReport>, (StatusCode, Json<ErrorBody>)> {
    if request.content_id.trim().is_empty() {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "Content id cannot be empty",
        ));
    }
    if request.library.trim().is_empty() {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "Target library cannot be empty",
        ));
    }

    match ctx.runner.run(&request).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => Err(error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

#[derive(Serialize)]
struct LibraryEntry {
    name: String,
    path: String,
}

/// The configured library roots, verbatim.
async fn list_libraries(State(ctx): State<AppContext>) -> impl IntoResponse {
    let libraries: Vec<LibraryEntry> = ctx
        .config
        .libraries
        .iter()
        .map(|library| LibraryEntry {
            name: library.name.clone(),
            path: library.path.display().to_string(),
        })
        .collect();
    Json(libraries)
}

async fn list_tools(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(tools::check_tools(&ctx.config.tools))
}
