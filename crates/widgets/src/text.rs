//! Text widget: a format string filled from the data source payload

use anyhow::Result;
use epaper_core::{BoxedWidget, DrawContext, Widget, WidgetBase, WidgetInit};
use epaper_render::{set_source_color, show_text_centered};
use epaper_types::widget_configs::TextWidgetConfig;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

pub const CLASS_NAME: &str = "TextWidget";

/// `{{`, `}}`, or `{path}` / `{path:.Nf}` where path is dotted keys or indices
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*)(?::\.(\d+)f)?\}")
        .expect("Invalid placeholder regex")
});

/// Look up a dotted path; numeric segments index arrays
pub fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn format_value(value: &Value, precision: Option<usize>) -> String {
    match (value, precision) {
        (Value::String(s), _) => s.clone(),
        (Value::Number(n), Some(p)) => match n.as_f64() {
            Some(f) => format!("{:.*}", p, f),
            None => n.to_string(),
        },
        (other, _) => other.to_string(),
    }
}

/// Fill placeholders from `data`; unresolved ones become `?` and are returned
pub fn substitute(format: &str, data: &Value) -> (String, Vec<String>) {
    let mut missing = Vec::new();
    let text = PLACEHOLDER
        .replace_all(format, |caps: &Captures| {
            match &caps[0] {
                "{{" => return "{".to_string(),
                "}}" => return "}".to_string(),
                _ => {}
            }
            let path = &caps[1];
            let precision = caps.get(2).and_then(|m| m.as_str().parse().ok());
            match lookup(data, path) {
                Some(value) => format_value(value, precision),
                None => {
                    missing.push(path.to_string());
                    "?".to_string()
                }
            }
        })
        .into_owned();
    (text, missing)
}

pub struct TextWidget {
    base: WidgetBase,
    format: String,
}

impl TextWidget {
    pub fn new(base: WidgetBase, config: TextWidgetConfig) -> Self {
        Self {
            base,
            format: config.format,
        }
    }

    fn text(&self, data: Option<&Value>) -> String {
        let Some(data) = data else {
            return self.format.clone();
        };
        debug!("{} data: {}", self.base.label(), data);
        let (text, missing) = substitute(&self.format, data);
        if !missing.is_empty() {
            let source = self
                .base
                .datasource
                .as_ref()
                .map(|ds| ds.id())
                .unwrap_or("-");
            error!(
                "Key not found drawing widget {}, datasource {}: {}",
                self.base.label(),
                source,
                missing.join(", ")
            );
        }
        text
    }
}

impl Widget for TextWidget {
    fn base(&self) -> &WidgetBase {
        &self.base
    }

    fn draw(&self, ctx: &DrawContext<'_>, data: Option<&Value>) -> Result<()> {
        let text = self.text(data);
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
    let config: TextWidgetConfig = init.options()?;
    Ok(Box::new(TextWidget::new(init.base, config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{base, inked, render};
    use epaper_render::RenderResources;
    use serde_json::json;

    #[test]
    fn test_substitute_fills_paths() {
        let data = json!({
            "level": "123.4",
            "current": { "temp": 21.456, "weather": [{ "main": "Rain" }] },
        });
        let (text, missing) = substitute(
            "{level} cm, {current.temp:.1f}°, {current.weather.0.main}",
            &data,
        );
        assert_eq!(text, "123.4 cm, 21.5°, Rain");
        assert!(missing.is_empty());
    }

    #[test]
    fn test_substitute_marks_missing_keys() {
        let (text, missing) = substitute("{{{a}}} and {b.c}", &json!({ "a": 1 }));
        assert_eq!(text, "{1} and ?");
        assert_eq!(missing, vec!["b.c".to_string()]);
    }

    #[test]
    fn test_without_source_draws_literal_format() {
        let widget = TextWidget::new(
            base(CLASS_NAME, (120, 40), false),
            TextWidgetConfig {
                format: "{literal}".into(),
            },
        );
        assert_eq!(widget.text(None), "{literal}");

        let resources = RenderResources::new("/nonexistent");
        assert!(inked(&render(&widget, &resources, None).unwrap()));
    }

    #[test]
    fn test_fonts_resolve_through_injected_resources() {
        let widget = TextWidget::new(
            base(CLASS_NAME, (120, 40), false),
            TextWidgetConfig {
                format: "cached".into(),
            },
        );
        let resources = RenderResources::new("/nonexistent");
        assert!(resources.fonts().is_empty());
        render(&widget, &resources, None).unwrap();
        render(&widget, &resources, None).unwrap();
        assert_eq!(resources.fonts().len(), 1);
    }
}
