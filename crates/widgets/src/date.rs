//! Date widget: today's date in the configured time zone

use anyhow::Result;
use chrono_tz::Tz;
use epaper_core::{BoxedWidget, DrawContext, Widget, WidgetBase, WidgetInit};
use epaper_render::{set_source_color, show_text_centered};
use epaper_types::widget_configs::DateWidgetConfig;
use serde_json::Value;
use std::fmt::Write as _;

pub const CLASS_NAME: &str = "DateWidget";

pub struct DateWidget {
    base: WidgetBase,
    timezone: Tz,
    date_format: String,
}

impl DateWidget {
    pub fn new(base: WidgetBase, timezone: Tz, date_format: String) -> Self {
        Self {
            base,
            timezone,
            date_format,
        }
    }
}

impl Widget for DateWidget {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn draw(&self, ctx: &DrawContext<'_>, _data: Option<&Value>) -> Result<()> {
        let local = ctx.now.with_timezone(&self.timezone);
        let mut text = String::new();
        // An invalid format specifier surfaces as a fmt error instead of a panic
        write!(text, "{}", local.format(&self.date_format))
            .map_err(|_| anyhow::anyhow!("invalid date format '{}'", self.date_format))?;

        set_source_color(ctx.cr, self.base.foreground());
        show_text_centered(
            ctx.cr,
            ctx.resources.fonts(),
            &text,
            &self.base.font,
            self.base.width() / 2.0,
            self.base.height() / 2.0,
        );
        Ok(())
    }
}

pub fn create(init: WidgetInit<'_>) -> Result<BoxedWidget> {
    let config: DateWidgetConfig = init.options()?;
    let date_format = config
        .date_format
        .unwrap_or_else(|| init.settings.date_format.clone());
    Ok(Box::new(DateWidget::new(
        init.base,
        crate::timezone(init.settings),
        date_format,
    )))
}
