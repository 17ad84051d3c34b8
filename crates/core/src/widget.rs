//! Widget trait and the state every widget shares

use std::sync::Arc;

use anyhow::Result;
use cairo::Context;
use chrono::{DateTime, Utc};
use epaper_render::RenderResources;
use epaper_types::{Color, FontSpec, GlobalSettings};
use serde_json::Value;

use crate::data_source::DataSource;

/// Placement, styling and data binding of one widget within its display
#[derive(Clone)]
pub struct WidgetBase {
    /// Ordinal within the owning display
    pub id: usize,
    pub class_name: String,
    pub position: (i32, i32),
    pub size: (u32, u32),
    /// Widget colors; index 0 fills the widget background
    pub colors: Vec<Color>,
    pub font: FontSpec,
    pub datasource: Option<Arc<DataSource>>,
}

impl WidgetBase {
    pub fn width(&self) -> f64 {
        self.size.0 as f64
    }

    pub fn height(&self) -> f64 {
        self.size.1 as f64
    }

    pub fn background(&self) -> Color {
        self.colors.first().copied().unwrap_or(Color::WHITE)
    }

    /// Text and line color
    pub fn foreground(&self) -> Color {
        self.colors
            .get(1)
            .or_else(|| self.colors.first())
            .copied()
            .unwrap_or(Color::BLACK)
    }

    /// Highlight color, falling back to the foreground
    pub fn accent(&self) -> Color {
        self.colors.get(2).copied().unwrap_or_else(|| self.foreground())
    }

    /// Identifies the widget in log messages
    pub fn label(&self) -> String {
        format!("{}#{}", self.class_name, self.id)
    }
}

/// Everything a widget may use while drawing.
///
/// The cairo context is translated to the widget's top-left corner and
/// clipped to its size.
pub struct DrawContext<'a> {
    pub cr: &'a Context,
    pub resources: &'a RenderResources,
    pub settings: &'a GlobalSettings,
    pub now: DateTime<Utc>,
}

/// A drawable region of a display.
///
/// Drawing is synchronous; the payload of the bound data source is fetched
/// by the caller beforehand and passed in.
pub trait Widget: Send + Sync {
    fn base(&self) -> &WidgetBase;

    /// Draw onto the widget's region; the background is already filled
    fn draw(&self, ctx: &DrawContext<'_>, data: Option<&Value>) -> Result<()>;
}

/// Type-erased widget for dynamic dispatch
pub type BoxedWidget = Box<dyn Widget>;
