//! Render pipeline: widgets → canvas → palette indices → rotation
//!
//! Data for every widget is fetched first, then all widgets are drawn in one
//! synchronous pass so no cairo object lives across an await point.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use epaper_core::{BoxedWidget, DrawContext};
use epaper_render::{fill_rect, set_source_color, Canvas, RasterImage, RenderResources};
use epaper_types::{Color, DisplayConfig, GlobalSettings};
use log::{debug, error};
use serde_json::Value;

/// Data handed to one widget, or why it could not be obtained
pub type WidgetInput = Option<Result<Value, String>>;

/// Pull the payload of each widget's data source.
///
/// A source shared by several widgets is read once per frame. Failures are
/// kept per widget so the other widgets still draw.
pub async fn fetch_inputs(display_id: &str, widgets: &[BoxedWidget]) -> Vec<WidgetInput> {
    let mut frame_cache: HashMap<String, Result<Value, String>> = HashMap::new();
    let mut inputs = Vec::with_capacity(widgets.len());
    for widget in widgets {
        let base = widget.base();
        let Some(source) = &base.datasource else {
            inputs.push(None);
            continue;
        };
        if let Some(cached) = frame_cache.get(source.id()) {
            inputs.push(Some(cached.clone()));
            continue;
        }
        let result = source.get_data().await.map_err(|e| {
            error!(
                "Error fetching data source {} ({}) for widget {} of display {}: {:#}",
                source.id(),
                source.class_name(),
                base.label(),
                display_id,
                e
            );
            format!("{:#}", e)
        });
        frame_cache.insert(source.id().to_string(), result.clone());
        inputs.push(Some(result));
    }
    inputs
}

/// Draw all widgets onto a fresh canvas and quantise it.
///
/// A widget whose data or drawing fails is logged and left with whatever it
/// drew so far; the rest of the frame is unaffected.
pub fn draw_frame(
    display_id: &str,
    config: &DisplayConfig,
    widgets: &[BoxedWidget],
    inputs: &[WidgetInput],
    resources: &RenderResources,
    settings: &GlobalSettings,
    now: DateTime<Utc>,
) -> Result<RasterImage> {
    let (width, height) = config.size;
    let background = config.colors.first().copied().unwrap_or(Color::WHITE);
    let canvas = Canvas::new(width, height, background)?;

    for (widget, input) in widgets.iter().zip(inputs) {
        let base = widget.base();
        debug!(
            "Drawing widget {} of display {} at {:?} size {:?}",
            base.label(),
            display_id,
            base.position,
            base.size
        );
        let cr = canvas.context()?;
        cr.translate(base.position.0 as f64, base.position.1 as f64);
        cr.rectangle(0.0, 0.0, base.width(), base.height());
        cr.clip();
        fill_rect(&cr, 0.0, 0.0, base.width(), base.height(), base.background())?;

        let data = match input {
            None => Some(None),
            Some(Ok(value)) => Some(Some(value)),
            // Already logged when fetching; keep the background only
            Some(Err(_)) => None,
        };
        if let Some(data) = data {
            let ctx = DrawContext {
                cr: &cr,
                resources,
                settings,
                now,
            };
            if let Err(e) = widget.draw(&ctx, data) {
                error!(
                    "Error drawing widget {} of display {}: {:#}",
                    base.label(),
                    display_id,
                    e
                );
            }
        }

        if config.debug {
            cr.reset_clip();
            set_source_color(&cr, base.foreground());
            cr.set_line_width(1.0);
            cr.rectangle(0.5, 0.5, base.width() - 1.0, base.height() - 1.0);
            cr.stroke()?;
        }
    }

    let raster = canvas.quantize(&config.colors)?;
    Ok(raster.rotated(config.rotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{display_config, failing_source, static_source, widget_config};
    use epaper_core::{Registry, WidgetBase, WidgetInit};
    use epaper_types::FontSpec;
    use serde_json::json;
    use std::sync::Arc;

    fn text_widget(id: usize, x: i32, format: &str, source: Option<Arc<epaper_core::DataSource>>) -> BoxedWidget {
        let mut registry = Registry::new();
        epaper_widgets::register_all(&mut registry);
        let config = widget_config("TextWidget", json!({ "format": format }));
        let settings = GlobalSettings::default();
        registry
            .create_widget(WidgetInit {
                base: WidgetBase {
                    id,
                    class_name: "TextWidget".into(),
                    position: (x, 0),
                    size: (40, 20),
                    colors: vec![Color::BLACK, Color::WHITE],
                    font: FontSpec::new("Sans", 12.0),
                    datasource: source,
                },
                config: &config,
                settings: &settings,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn test_failing_widget_keeps_its_background() {
        let widgets = vec![
            text_widget(0, 0, "{n}", Some(failing_source("ds_broken"))),
            text_widget(1, 40, "{n}", Some(static_source("ds_ok", json!({ "n": 7 })))),
        ];
        let inputs = fetch_inputs("ep_test", &widgets).await;
        assert!(matches!(inputs[0], Some(Err(_))));
        assert!(matches!(inputs[1], Some(Ok(_))));

        let config = display_config((80, 20), 0.0);
        let resources = RenderResources::new("/nonexistent");
        let raster = draw_frame(
            "ep_test",
            &config,
            &widgets,
            &inputs,
            &resources,
            &GlobalSettings::default(),
            Utc::now(),
        )
        .unwrap();

        // Widget backgrounds are black (index 1); only the working widget has white text
        let left_white = (0..20).flat_map(|y| (0..40).map(move |x| (x, y)))
            .any(|(x, y)| raster.get(x, y) == Some(0));
        let right_white = (0..20).flat_map(|y| (40..80).map(move |x| (x, y)))
            .any(|(x, y)| raster.get(x, y) == Some(0));
        assert!(!left_white);
        assert!(right_white);
    }

    #[tokio::test]
    async fn test_debug_outline_drawn_around_failed_widget() {
        let widgets = vec![text_widget(0, 0, "{n}", Some(failing_source("ds_broken")))];
        let inputs = fetch_inputs("ep_test", &widgets).await;
        assert!(matches!(inputs[0], Some(Err(_))));

        let mut config = display_config((40, 20), 0.0);
        config.debug = true;
        let resources = RenderResources::new("/nonexistent");
        let raster = draw_frame(
            "ep_test",
            &config,
            &widgets,
            &inputs,
            &resources,
            &GlobalSettings::default(),
            Utc::now(),
        )
        .unwrap();

        // White outline on the black widget background
        assert_eq!(raster.get(0, 0), Some(0));
        assert_eq!(raster.get(39, 19), Some(0));
        assert_eq!(raster.get(20, 10), Some(1));
    }

    #[tokio::test]
    async fn test_rotation_swaps_dimensions() {
        let config = display_config((80, 20), 90.0);
        let resources = RenderResources::new("/nonexistent");
        let raster = draw_frame(
            "ep_test",
            &config,
            &[],
            &[],
            &resources,
            &GlobalSettings::default(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!((raster.width(), raster.height()), (20, 80));
    }
}
