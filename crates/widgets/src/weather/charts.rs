//! Precipitation and temperature charts

use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use epaper_core::{BoxedWidget, DrawContext, Widget, WidgetBase, WidgetInit};
use epaper_render::{render_line_chart, LineChart};
use epaper_types::widget_configs::ChartWidgetConfig;
use serde_json::Value;

use super::{field, number, require_data, timestamp};

pub const PRECIPITATION_CLASS_NAME: &str = "WeatherPrecipitationWidget";
pub const TEMPERATURE_CLASS_NAME: &str = "WeatherTemperatureWidget";

/// Number of labelled points on the time axis
const X_LABELS: usize = 4;

/// Build a chart from `series[].{dt, key}` with local time labels
pub fn series_chart(
    data: &Value,
    series: &str,
    key: &str,
    (min_value, max_value): (f64, f64),
    timezone: Tz,
) -> Result<LineChart> {
    let entries = field(data, series)?
        .as_array()
        .ok_or_else(|| anyhow!("'{}' is not a list", series))?;
    let mut points = Vec::with_capacity(entries.len());
    for entry in entries {
        points.push((timestamp(entry)?.timestamp() as f64, number(entry, key)?));
    }

    let step = (points.len() / X_LABELS).max(1);
    let x_labels = entries
        .iter()
        .zip(&points)
        .step_by(step)
        .map(|(entry, (x, _))| {
            let label = timestamp(entry)?.with_timezone(&timezone).format("%H:%M").to_string();
            Ok((*x, label))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LineChart {
        points,
        min_value,
        max_value,
        x_labels,
        y_divisions: 5,
    })
}

/// A line chart over one field of a one-call list
pub struct WeatherChartWidget {
    base: WidgetBase,
    class_name: &'static str,
    series: &'static str,
    key: &'static str,
    range: (f64, f64),
    timezone: Tz,
}

impl WeatherChartWidget {
    fn draw_chart(&self, ctx: &DrawContext<'_>, data: Option<&Value>) -> Result<()> {
        let data = require_data(data, self.class_name)?;
        let chart = series_chart(data, self.series, self.key, self.range, self.timezone)?;
        let font = crate::regular_font(&self.base.font, 12.0);
        render_line_chart(
            ctx.cr,
            ctx.resources.fonts(),
            &chart,
            self.base.width(),
            self.base.height(),
            self.base.foreground(),
            &font,
        )
    }
}

/// Precipitation of the next hour, 0 to 10 mm/h
pub struct WeatherPrecipitationWidget(WeatherChartWidget);

/// Hourly temperature, -10 to 40 degrees
pub struct WeatherTemperatureWidget(WeatherChartWidget);

impl WeatherPrecipitationWidget {
    pub fn new(base: WidgetBase, timezone: Tz, config: &ChartWidgetConfig) -> Self {
        Self(WeatherChartWidget {
            base,
            class_name: PRECIPITATION_CLASS_NAME,
            series: "minutely",
            key: "precipitation",
            range: (config.min_value.unwrap_or(0.0), config.max_value.unwrap_or(10.0)),
            timezone,
        })
    }
}

impl WeatherTemperatureWidget {
    pub fn new(base: WidgetBase, timezone: Tz, config: &ChartWidgetConfig) -> Self {
        Self(WeatherChartWidget {
            base,
            class_name: TEMPERATURE_CLASS_NAME,
            series: "hourly",
            key: "temp",
            range: (config.min_value.unwrap_or(-10.0), config.max_value.unwrap_or(40.0)),
            timezone,
        })
    }
}

impl Widget for WeatherPrecipitationWidget {
    fn base(&self) -> &WidgetBase {
        &self.0.base
    }

    fn draw(&self, ctx: &DrawContext<'_>, data: Option<&Value>) -> Result<()> {
        self.0.draw_chart(ctx, data)
    }
}

impl Widget for WeatherTemperatureWidget {
    fn base(&self) -> &WidgetBase {
        &self.0.base
    }

    fn draw(&self, ctx: &DrawContext<'_>, data: Option<&Value>) -> Result<()> {
        self.0.draw_chart(ctx, data)
    }
}

pub fn create_precipitation(init: WidgetInit<'_>) -> Result<BoxedWidget> {
    init.require_datasource()?;
    let config: ChartWidgetConfig = init.options()?;
    Ok(Box::new(WeatherPrecipitationWidget::new(
        init.base,
        crate::timezone(init.settings),
        &config,
    )))
}

pub fn create_temperature(init: WidgetInit<'_>) -> Result<BoxedWidget> {
    init.require_datasource()?;
    let config: ChartWidgetConfig = init.options()?;
    Ok(Box::new(WeatherTemperatureWidget::new(
        init.base,
        crate::timezone(init.settings),
        &config,
    )))
}
