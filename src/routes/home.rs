//! Human-readable status page.

use axum::{extract::State, response::Html, Extension};
use tracing::instrument;

use crate::error::{AppError, AppErrorResponse, ResultExt};
use crate::middleware::RequestId;
use crate::state::AppState;
use crate::system::{self, MemorySnapshot};
use crate::templates::STATUS_TEMPLATE;

/// Status page handler showing health, instance details and the endpoint list.
#[instrument(name = "home::index", skip(state, request_id))]
pub async fn index(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> Result<Html<String>, AppErrorResponse> {
    let memory = tokio::task::spawn_blocking(MemorySnapshot::read)
        .await
        .with_request_id(&request_id)?;

    let mut context = tera::Context::new();
    context.insert("healthy", &state.health.is_healthy());
    context.insert("hostname", &system::hostname());
    context.insert("platform", system::platform());
    context.insert("arch", system::arch());
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context.insert("uptime", &state.uptime().as_secs());
    context.insert("checks", &state.health.check_count());
    context.insert("memory", &memory);

    let html = state
        .tera
        .render(STATUS_TEMPLATE, &context)
        .map_err(AppError::from)
        .with_request_id(&request_id)?;
    Ok(Html(html))
}
