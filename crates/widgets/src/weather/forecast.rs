//! Forecast strip: icon, temperature and time for upcoming hours

use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use epaper_core::{BoxedWidget, DrawContext, Widget, WidgetBase, WidgetInit};
use epaper_render::{set_source_color, show_text_centered};
use epaper_types::widget_configs::WeatherForecastWidgetConfig;
use log::debug;
use serde_json::Value;

use super::{field, format_temperature, icon_path, number, require_data, timestamp};

pub const CLASS_NAME: &str = "WeatherForecastWidget";

/// Edge length of the small weather icons
const SMALL_IMAGE_HEIGHT: f64 = 47.0;

pub struct WeatherForecastWidget {
    base: WidgetBase,
    timezone: Tz,
    config: WeatherForecastWidgetConfig,
}

impl WeatherForecastWidget {
    pub fn new(base: WidgetBase, timezone: Tz, config: WeatherForecastWidgetConfig) -> Self {
        Self {
            base,
            timezone,
            config,
        }
    }

    /// Number of forecast columns that fit the widget width
    pub fn columns(&self) -> usize {
        (self.base.size.0 / self.config.column_width.max(1)) as usize
    }
}

impl Widget for WeatherForecastWidget {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn draw(&self, ctx: &DrawContext<'_>, data: Option<&Value>) -> Result<()> {
        let hourly = field(require_data(data, CLASS_NAME)?, "hourly")?
            .as_array()
            .ok_or_else(|| anyhow!("'hourly' is not a list"))?;
        let count = self.columns();
        if count == 0 {
            return Ok(());
        }
        let w = self.base.width() / count as f64;
        let bold = crate::bold_font(&self.base.font, 18.0);
        let regular = crate::regular_font(&self.base.font, 18.0);
        let cr = ctx.cr;
        let fonts = ctx.resources.fonts();

        for i in 0..count {
            let index = self.config.hour_step * (i + 1);
            let weather = hourly
                .get(index)
                .ok_or_else(|| anyhow!("no hourly forecast at index {}", index))?;
            debug!("hourly weather[{}]: {}", i, weather);
            let cx = i as f64 * w + w / 2.0;

            ctx.resources.draw_icon_centered(
                cr,
                &icon_path(weather, "weather_small")?,
                cx,
                SMALL_IMAGE_HEIGHT / 2.0,
            )?;

            set_source_color(cr, self.base.foreground());
            let temperature = format_temperature(number(weather, "temp")?, ctx.settings.units);
            show_text_centered(cr, fonts, &temperature, &bold, cx, SMALL_IMAGE_HEIGHT + 5.0);

            let time = timestamp(weather)?.with_timezone(&self.timezone).format("%H:%M");
            let time = time.to_string();
            show_text_centered(cr, fonts, &time, &regular, cx, SMALL_IMAGE_HEIGHT + 25.0);
        }
        Ok(())
    }
}

pub fn create(init: WidgetInit<'_>) -> Result<BoxedWidget> {
    init.require_datasource()?;
    let config: WeatherForecastWidgetConfig = init.options()?;
    Ok(Box::new(WeatherForecastWidget::new(
        init.base,
        crate::timezone(init.settings),
        config,
    )))
}
