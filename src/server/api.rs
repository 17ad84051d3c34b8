//! Request handlers for the `/displays` resources

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use epaper_types::Color;
use log::{debug, error, info};
use serde::Serialize;

use super::conditional::{cache_max_age, client_validator, image_response};
use super::error::ApiError;
use crate::core::{AppContext, Display};

#[derive(Debug, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_link: String,
    pub image: String,
}

impl Links {
    fn for_id(id: &str) -> Self {
        Self {
            self_link: format!("/displays/{}", id),
            image: format!("/displays/{}/image", id),
        }
    }
}

/// One entry of `GET /displays`
#[derive(Debug, Serialize)]
pub struct DisplayEntry {
    pub id: String,
    pub display_id: String,
    pub is_alias: bool,
    pub links: Links,
}

/// Body of `GET /displays/{id}`
#[derive(Debug, Serialize)]
pub struct DisplaySummary {
    pub id: String,
    pub requested_id: String,
    pub size: (u32, u32),
    pub bits_per_pixel: u8,
    pub colors: Vec<Color>,
    pub rotation: f64,
    pub update_interval_s: i64,
    pub client_update_delay_s: i64,
    pub aliases: Vec<String>,
    pub widgets: usize,
    pub version: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
    pub next_client_update: Option<DateTime<Utc>>,
    pub links: Links,
}

impl DisplaySummary {
    async fn of(display: &Display, requested_id: &str) -> Result<Self, ApiError> {
        let config = display.config();
        Ok(Self {
            id: display.id().to_string(),
            requested_id: requested_id.to_string(),
            size: config.size,
            bits_per_pixel: config.bits_per_pixel,
            colors: config.colors.clone(),
            rotation: config.rotation,
            update_interval_s: config.update_interval_s,
            client_update_delay_s: config.client_update_delay_s,
            aliases: config.aliases.clone(),
            widgets: display.widgets().len(),
            version: display.version().await?,
            last_update: display.last_update().await?,
            next_client_update: display.next_client_update().await?,
            links: Links::for_id(requested_id),
        })
    }
}

fn resolve(ctx: &AppContext, id: &str) -> Result<Arc<Display>, ApiError> {
    ctx.lookup(id)
        .map(|(display, _)| display)
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

pub async fn list_displays(State(ctx): State<Arc<AppContext>>) -> Json<Vec<DisplayEntry>> {
    let mut entries: Vec<DisplayEntry> = ctx
        .displays()
        .map(|d| DisplayEntry {
            id: d.id().to_string(),
            display_id: d.id().to_string(),
            is_alias: false,
            links: Links::for_id(d.id()),
        })
        .collect();
    entries.extend(ctx.aliases().map(|(alias, target)| DisplayEntry {
        id: alias.clone(),
        display_id: target.clone(),
        is_alias: true,
        links: Links::for_id(alias),
    }));
    Json(entries)
}

pub async fn get_display(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<DisplaySummary>, ApiError> {
    let display = resolve(&ctx, &id)?;
    Ok(Json(DisplaySummary::of(&display, &id).await?))
}

pub async fn get_image(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let display = resolve(&ctx, &id)?;
    let validator = client_validator(&headers);
    debug!("GET image of {} with validator {:?}", id, validator);

    // Displays without a positive interval, and displays the scheduler has not
    // reached yet, render on request
    if display.always_stale() || display.version().await?.is_none() {
        if let Err(e) = display.update().await {
            error!("Error rendering display {} on request: {:#}", display.id(), e);
        }
    }

    let (Some(version), Some(image)) = (display.version().await?, display.image_bytes().await?)
    else {
        return Err(ApiError::NotReady(display.id().to_string()));
    };
    let max_age = cache_max_age(
        display.next_client_update().await?,
        ctx.clock().now(),
        ctx.minimum_waiting_time(),
    );
    Ok(image_response(&version, image, max_age, validator))
}

pub async fn refresh_display(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<DisplaySummary>, ApiError> {
    let display = resolve(&ctx, &id)?;
    let outcome = display.update().await?;
    info!(
        "Refreshed display {} on request (changed: {})",
        display.id(),
        outcome.changed
    );
    Ok(Json(DisplaySummary::of(&display, &id).await?))
}
