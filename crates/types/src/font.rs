//! Font references as written in display and widget configuration.

use serde::{Deserialize, Serialize};

/// A font family plus pixel size, written as `[family, size]` in configuration.
///
/// Older configurations name font *files* (`"Roboto-Bold.ttf"`); those are
/// mapped onto a family and weight so they resolve through fontconfig.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "(String, f64)", into = "(String, f64)")]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// Same family at a different size
    pub fn with_size(&self, size: f64) -> Self {
        Self::new(self.family.clone(), size)
    }

    /// Family name and bold flag with any file extension and style suffix removed
    pub fn resolved_family(&self) -> (String, bool) {
        let mut name = self.family.as_str();
        for ext in [".ttf", ".otf", ".woff2", ".woff"] {
            if let Some(stripped) = name.strip_suffix(ext) {
                name = stripped;
                break;
            }
        }
        // "OpenSans-Bold-webfont" style file names
        let name = name.strip_suffix("-webfont").unwrap_or(name);

        let mut bold = false;
        let mut family = name;
        if let Some((base, style)) = name.rsplit_once('-') {
            match style {
                "Bold" | "Black" | "Heavy" | "SemiBold" => {
                    bold = true;
                    family = base;
                }
                "Regular" | "Medium" | "Light" | "Book" => family = base,
                _ => {}
            }
        }
        (family.to_string(), bold)
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("Sans", 16.0)
    }
}

impl From<(String, f64)> for FontSpec {
    fn from((family, size): (String, f64)) -> Self {
        Self { family, size }
    }
}

impl From<FontSpec> for (String, f64) {
    fn from(f: FontSpec) -> Self {
        (f.family, f.size)
    }
}
