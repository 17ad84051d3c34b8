//! epaper-widgets: Built-in widgets for epaper-server displays.
//!
//! Each widget draws into its own region of the display canvas. Widgets that
//! show external data receive the payload of their bound data source.

pub mod calendar;
pub mod date;
pub mod text;
pub mod weather;

pub use calendar::CalendarWidget;
pub use date::DateWidget;
pub use text::TextWidget;
pub use weather::{
    WeatherForecastWidget, WeatherNowWidget, WeatherPrecipitationWidget, WeatherTemperatureWidget,
};

use chrono_tz::Tz;
use epaper_core::Registry;
use epaper_types::{FontSpec, GlobalSettings};
use log::warn;

/// Register all built-in widgets with the registry
pub fn register_all(registry: &mut Registry) {
    registry.register_widget(text::CLASS_NAME, text::create);
    registry.register_widget(date::CLASS_NAME, date::create);
    registry.register_widget(calendar::CLASS_NAME, calendar::create);
    registry.register_widget(weather::now::CLASS_NAME, weather::now::create);
    registry.register_widget(weather::forecast::CLASS_NAME, weather::forecast::create);
    registry.register_widget(
        weather::charts::PRECIPITATION_CLASS_NAME,
        weather::charts::create_precipitation,
    );
    registry.register_widget(
        weather::charts::TEMPERATURE_CLASS_NAME,
        weather::charts::create_temperature,
    );
}

/// Time zone from the global settings, UTC when the name is unknown
pub(crate) fn timezone(settings: &GlobalSettings) -> Tz {
    settings.timezone.parse().unwrap_or_else(|_| {
        warn!("Unknown timezone '{}', using UTC", settings.timezone);
        Tz::UTC
    })
}

/// Bold variant of a font at another size
pub(crate) fn bold_font(font: &FontSpec, size: f64) -> FontSpec {
    let (family, _) = font.resolved_family();
    FontSpec::new(format!("{}-Bold", family), size)
}

/// Regular variant of a font at another size
pub(crate) fn regular_font(font: &FontSpec, size: f64) -> FontSpec {
    let (family, _) = font.resolved_family();
    FontSpec::new(family, size)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{DateTime, TimeZone, Utc};
    use epaper_core::{DataSource, DrawContext, MemoryStore, SystemClock, Widget, WidgetBase};
    use epaper_render::{Canvas, RasterImage, RenderResources};
    use epaper_sources::StaticDatasource;
    use epaper_types::{Color, FontSpec, GlobalSettings};
    use serde_json::Value;

    pub fn palette() -> Vec<Color> {
        vec![Color::WHITE, Color::BLACK, Color::new(255, 0, 0)]
    }

    pub fn base(class: &str, size: (u32, u32), with_source: bool) -> WidgetBase {
        WidgetBase {
            id: 0,
            class_name: class.to_string(),
            position: (0, 0),
            size,
            colors: palette(),
            font: FontSpec::new("Sans", 14.0),
            datasource: with_source.then(|| {
                Arc::new(DataSource::new(
                    "ds_test",
                    None,
                    Box::new(StaticDatasource::new(Value::Null)),
                    Arc::new(MemoryStore::new()),
                    Arc::new(SystemClock),
                ))
            }),
        }
    }

    pub fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, 11, 0, 0).unwrap()
    }

    /// Draw one widget on a fresh canvas and quantise the result
    pub fn render(
        widget: &dyn Widget,
        resources: &RenderResources,
        data: Option<&Value>,
    ) -> anyhow::Result<RasterImage> {
        let (w, h) = widget.base().size;
        let canvas = Canvas::new(w, h, Color::WHITE)?;
        let settings = GlobalSettings::default();
        let result = {
            let cr = canvas.context()?;
            let ctx = DrawContext {
                cr: &cr,
                resources,
                settings: &settings,
                now: noon(),
            };
            widget.draw(&ctx, data)
        };
        result?;
        canvas.quantize(&palette())
    }

    pub fn inked(raster: &RasterImage) -> bool {
        raster.pixels().iter().any(|&p| p != 0)
    }
}
