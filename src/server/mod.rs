//! HTTP surface

mod api;
mod conditional;
mod error;

pub use conditional::{cache_max_age, client_validator, image_response};
pub use error::ApiError;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use axum::routing::{get, post};
use axum::Router;
use log::info;

use crate::core::AppContext;

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/displays", get(api::list_displays))
        .route("/displays/:id", get(api::get_display))
        .route("/displays/:id/image", get(api::get_image))
        .route("/displays/:id/refresh", post(api::refresh_display))
        .with_state(ctx)
}

/// Serve until the process is stopped
pub async fn serve(ctx: Arc<AppContext>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!("Listening on {}", bind);
    axum::serve(listener, router(ctx)).await?;
    Ok(())
}
