//! Month calendar widget

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use epaper_core::{BoxedWidget, DrawContext, Widget, WidgetBase, WidgetInit};
use epaper_render::{fill_rect, set_source_color, show_text_centered};
use epaper_types::widget_configs::CalendarWidgetConfig;
use serde_json::Value;

pub const CLASS_NAME: &str = "CalendarWidget";

const WEEKDAYS: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

/// Week rows of a month, Monday first; `None` pads days of other months
pub fn month_grid(year: i32, month: u32) -> Option<Vec<[Option<u32>; 7]>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let days = (next - first).num_days() as u32;
    let offset = first.weekday().num_days_from_monday();

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    for day in 1..=days {
        let column = ((offset + day - 1) % 7) as usize;
        week[column] = Some(day);
        if column == 6 {
            weeks.push(week);
            week = [None; 7];
        }
    }
    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }
    Some(weeks)
}

pub struct CalendarWidget {
    base: WidgetBase,
    timezone: Tz,
    config: CalendarWidgetConfig,
}

impl CalendarWidget {
    pub fn new(base: WidgetBase, timezone: Tz, config: CalendarWidgetConfig) -> Self {
        Self {
            base,
            timezone,
            config,
        }
    }
}

impl Widget for CalendarWidget {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn draw(&self, ctx: &DrawContext<'_>, _data: Option<&Value>) -> Result<()> {
        let today = ctx.now.with_timezone(&self.timezone).date_naive();
        let weeks = month_grid(today.year(), today.month())
            .ok_or_else(|| anyhow!("no calendar for {}", today))?;

        let header_rows = if self.config.show_header { 2 } else { 1 };
        let rows = (weeks.len() + header_rows) as f64;
        let cell_w = self.base.width() / 7.0;
        let cell_h = self.base.height() / rows;
        let font = self.base.font.with_size(self.base.font.size.min(cell_h * 0.7));
        let cr = ctx.cr;
        let fonts = ctx.resources.fonts();

        set_source_color(cr, self.base.foreground());
        let mut y = 0.0;
        if self.config.show_header {
            let title = today.format("%B %Y").to_string();
            let title_font = crate::bold_font(&font, font.size);
            let cx = self.base.width() / 2.0;
            show_text_centered(cr, fonts, &title, &title_font, cx, cell_h / 2.0);
            y += cell_h;
        }
        for (i, name) in WEEKDAYS.iter().enumerate() {
            let cx = cell_w * (i as f64 + 0.5);
            show_text_centered(cr, fonts, name, &font, cx, y + cell_h / 2.0);
        }
        cr.set_line_width(1.0);
        cr.move_to(0.0, (y + cell_h).floor() - 0.5);
        cr.line_to(self.base.width(), (y + cell_h).floor() - 0.5);
        cr.stroke()?;
        y += cell_h;

        for week in &weeks {
            for (column, day) in week.iter().enumerate() {
                let Some(day) = day else { continue };
                let cx = cell_w * (column as f64 + 0.5);
                let is_today = *day == today.day();
                if is_today && self.config.highlight_today {
                    fill_rect(
                        cr,
                        (cell_w * column as f64).floor(),
                        y.floor(),
                        cell_w.floor(),
                        cell_h.floor(),
                        self.base.accent(),
                    )?;
                    set_source_color(cr, self.base.background());
                } else {
                    set_source_color(cr, self.base.foreground());
                }
                show_text_centered(cr, fonts, &day.to_string(), &font, cx, y + cell_h / 2.0);
            }
            y += cell_h;
        }
        Ok(())
    }
}

pub fn create(init: WidgetInit<'_>) -> Result<BoxedWidget> {
    let config: CalendarWidgetConfig = init.options()?;
    Ok(Box::new(CalendarWidget::new(
        init.base,
        crate::timezone(init.settings),
        config,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{base, render};
    use epaper_render::RenderResources;

    #[test]
    fn test_month_grid_starts_on_monday() {
        // March 2024 starts on a Friday and has 31 days
        let weeks = month_grid(2024, 3).unwrap();
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0], [None, None, None, None, Some(1), Some(2), Some(3)]);
        assert_eq!(weeks[4][6], Some(31));

        // February 2021 fits exactly four weeks
        let weeks = month_grid(2021, 2).unwrap();
        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[3][6], Some(28));

        assert!(month_grid(2024, 13).is_none());
    }

    #[test]
    fn test_today_is_highlighted_with_accent() {
        let widget = CalendarWidget::new(
            base(CLASS_NAME, (280, 210), false),
            chrono_tz::UTC,
            CalendarWidgetConfig::default(),
        );
        let resources = RenderResources::new("/nonexistent");
        let raster = render(&widget, &resources, None).unwrap();
        // Palette index 2 is the accent color
        assert!(raster.pixels().iter().any(|&p| p == 2));
    }
}
