//! Pango-based text rendering
//!
//! Cairo's toy font API cannot resolve fonts through fontconfig and keeps
//! growing internal caches, so all widget text goes through Pango. Font
//! resolutions are cached in a [`FontCache`]; sizes are absolute pixels
//! because e-paper layouts are specified in device pixels.

use cairo::Context;
use epaper_types::FontSpec;
use pango::{FontDescription, Weight as PangoWeight};
use pangocairo::functions::{create_layout, show_layout};
use std::collections::HashMap;
use std::sync::Mutex;

/// Logical size of a laid out string
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtents {
    pub width: f64,
    pub height: f64,
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
struct FontKey {
    family: String,
    bold: bool,
    size_pango: i32, // Absolute size in Pango units (pixels * PANGO_SCALE)
}

impl FontKey {
    fn resolve(font: &FontSpec) -> Self {
        let (family, bold) = font.resolved_family();
        Self {
            family,
            bold,
            size_pango: (font.size * pango::SCALE as f64) as i32,
        }
    }

    fn description(&self) -> FontDescription {
        let mut desc = FontDescription::new();
        desc.set_family(&self.family);
        desc.set_weight(if self.bold {
            PangoWeight::Bold
        } else {
            PangoWeight::Normal
        });
        desc.set_absolute_size(self.size_pango as f64);
        desc
    }
}

/// Process-scoped cache of resolved fonts, keyed by the configured font.
///
/// Owned by [`RenderResources`](crate::RenderResources) and shared by every
/// display, whichever thread renders it.
pub struct FontCache {
    entries: Mutex<HashMap<(String, u64), FontKey>>,
    max_entries: usize,
}

impl FontCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: 64,
        }
    }

    /// Pango description for `font`
    pub fn description(&self, font: &FontSpec) -> FontDescription {
        let lookup = (font.family.clone(), font.size.to_bits());
        let Ok(mut entries) = self.entries.lock() else {
            return FontKey::resolve(font).description();
        };
        if let Some(key) = entries.get(&lookup) {
            return key.description();
        }

        // Evict if full (simple eviction - just clear half)
        if entries.len() >= self.max_entries {
            let keys_to_remove: Vec<_> = entries
                .keys()
                .take(self.max_entries / 2)
                .cloned()
                .collect();
            for k in keys_to_remove {
                entries.remove(&k);
            }
        }

        let key = FontKey::resolve(font);
        let desc = key.description();
        entries.insert(lookup, key);
        desc
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

fn layout_for(cr: &Context, fonts: &FontCache, text: &str, font: &FontSpec) -> pango::Layout {
    let desc = fonts.description(font);
    let layout = create_layout(cr);
    layout.set_font_description(Some(&desc));
    layout.set_text(text);
    layout
}

/// Measure `text` without drawing it
pub fn text_extents(cr: &Context, fonts: &FontCache, text: &str, font: &FontSpec) -> TextExtents {
    let (width, height) = layout_for(cr, fonts, text, font).pixel_size();
    TextExtents {
        width: width as f64,
        height: height as f64,
    }
}

/// Draw `text` with the top-left corner of its logical box at (x, y)
pub fn show_text_at(
    cr: &Context,
    fonts: &FontCache,
    text: &str,
    font: &FontSpec,
    x: f64,
    y: f64,
) -> TextExtents {
    let layout = layout_for(cr, fonts, text, font);
    let (width, height) = layout.pixel_size();
    cr.move_to(x.floor(), y.floor());
    show_layout(cr, &layout);
    TextExtents {
        width: width as f64,
        height: height as f64,
    }
}

/// Draw `text` centered on (cx, cy)
pub fn show_text_centered(
    cr: &Context,
    fonts: &FontCache,
    text: &str,
    font: &FontSpec,
    cx: f64,
    cy: f64,
) -> TextExtents {
    let layout = layout_for(cr, fonts, text, font);
    let (width, height) = layout.pixel_size();
    cr.move_to((cx - width as f64 / 2.0).floor(), (cy - height as f64 / 2.0).floor());
    show_layout(cr, &layout);
    TextExtents {
        width: width as f64,
        height: height as f64,
    }
}
