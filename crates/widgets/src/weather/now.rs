//! Current conditions: icon, temperature, wind and description

use anyhow::Result;
use epaper_core::{BoxedWidget, DrawContext, Widget, WidgetBase, WidgetInit};
use epaper_render::{set_source_color, show_text_at};
use epaper_types::Units;
use log::debug;
use serde_json::Value;

use super::{field, format_temperature, icon_path, number, require_data};

pub const CLASS_NAME: &str = "WeatherNowWidget";

/// Edge length of the large weather icons
const IMAGE_HEIGHT: f64 = 94.0;

/// Wind text such as `240° 10G17 kn`; gusts show only when notably stronger
pub fn wind_text(direction: f64, speed: f64, gust: f64, units: Units) -> String {
    let speed = speed * units.wind_to_knots();
    let gust = gust * units.wind_to_knots();
    let gust = if gust != 0.0 && gust > 1.1 * speed {
        format!("G{:.0}", gust)
    } else {
        String::new()
    };
    format!("{:.0}° {:.0}{} kn", direction, speed, gust)
}

pub struct WeatherNowWidget {
    base: WidgetBase,
}

impl WeatherNowWidget {
    pub fn new(base: WidgetBase) -> Self {
        Self { base }
    }
}

impl Widget for WeatherNowWidget {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn draw(&self, ctx: &DrawContext<'_>, data: Option<&Value>) -> Result<()> {
        let weather = field(require_data(data, CLASS_NAME)?, "current")?;
        debug!("current weather: {}", weather);
        let units = ctx.settings.units;
        let cr = ctx.cr;
        let fonts = ctx.resources.fonts();

        ctx.resources.draw_icon_centered(
            cr,
            &icon_path(weather, "weather")?,
            IMAGE_HEIGHT / 2.0,
            IMAGE_HEIGHT / 2.0,
        )?;

        set_source_color(cr, self.base.foreground());
        let temperature = format_temperature(number(weather, "temp")?, units);
        let main_font = crate::bold_font(&self.base.font, 36.0);
        let width =
            show_text_at(cr, fonts, &temperature, &main_font, IMAGE_HEIGHT, 6.0).width + 8.0;

        let details_font = crate::regular_font(&self.base.font, 22.0);
        let wind = wind_text(
            number(weather, "wind_deg")?,
            number(weather, "wind_speed")?,
            weather.get("wind_gust").and_then(Value::as_f64).unwrap_or(0.0),
            units,
        );
        show_text_at(cr, fonts, &wind, &details_font, IMAGE_HEIGHT + width + 15.0, 20.0);

        let description = weather
            .pointer("/weather/0/description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        show_text_at(cr, fonts, description, &details_font, IMAGE_HEIGHT, 44.0);
        Ok(())
    }
}

pub fn create(init: WidgetInit<'_>) -> Result<BoxedWidget> {
    init.require_datasource()?;
    Ok(Box::new(WeatherNowWidget::new(init.base)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{base, inked, render};
    use crate::weather::fixtures::onecall;
    use epaper_render::RenderResources;

    #[test]
    fn test_wind_text() {
        assert_eq!(wind_text(240.0, 5.0, 9.0, Units::Metric), "240° 10G17 kn");
        // Gust within 10% of the mean wind is omitted
        assert_eq!(wind_text(90.0, 5.0, 5.2, Units::Metric), "90° 10 kn");
        assert_eq!(wind_text(0.0, 10.0, 0.0, Units::Imperial), "0° 9 kn");
    }

    #[test]
    fn test_missing_icon_fails_draw() {
        let widget = WeatherNowWidget::new(base(CLASS_NAME, (400, 94), true));
        let dir = tempfile::tempdir().unwrap();
        let resources = RenderResources::new(dir.path());
        assert!(render(&widget, &resources, Some(&onecall())).is_err());
        assert!(render(&widget, &resources, None).is_err());
    }

    #[test]
    fn test_draws_with_icon() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("weather")).unwrap();
        let icon = cairo::ImageSurface::create(cairo::Format::ARgb32, 94, 94).unwrap();
        let mut file = std::fs::File::create(dir.path().join("weather/wi-day-rain.png")).unwrap();
        icon.write_to_png(&mut file).unwrap();

        let widget = WeatherNowWidget::new(base(CLASS_NAME, (400, 94), true));
        let resources = RenderResources::new(dir.path());
        assert!(inked(&render(&widget, &resources, Some(&onecall())).unwrap()));
    }
}
