//! Process-scoped rendering resources.
//!
//! Created once at startup and shared by reference with every display.
//! Icon files are read from disk on first use and kept as encoded bytes;
//! cairo surfaces are not thread-safe, so a surface is decoded per draw.
//! Resolved fonts are kept in the same object.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context as _, Result};
use cairo::{Context, ImageSurface};

use crate::pango_text::FontCache;

pub struct RenderResources {
    icon_dir: PathBuf,
    icons: Mutex<HashMap<String, Arc<Vec<u8>>>>,
    fonts: FontCache,
}

impl RenderResources {
    pub fn new(icon_dir: impl Into<PathBuf>) -> Self {
        Self {
            icon_dir: icon_dir.into(),
            icons: Mutex::new(HashMap::new()),
            fonts: FontCache::new(),
        }
    }

    pub fn fonts(&self) -> &FontCache {
        &self.fonts
    }

    pub fn icon_dir(&self) -> &Path {
        &self.icon_dir
    }

    fn icon_bytes(&self, name: &str) -> Result<Arc<Vec<u8>>> {
        let mut icons = self
            .icons
            .lock()
            .map_err(|_| anyhow!("icon cache lock poisoned"))?;
        if let Some(bytes) = icons.get(name) {
            return Ok(bytes.clone());
        }
        let path = self.icon_dir.join(name);
        let bytes = Arc::new(
            std::fs::read(&path).with_context(|| format!("reading icon {}", path.display()))?,
        );
        log::debug!("Loaded icon {} ({} bytes)", path.display(), bytes.len());
        icons.insert(name.to_string(), bytes.clone());
        Ok(bytes)
    }

    /// Decode the PNG icon at `name`, relative to the icon directory
    pub fn icon(&self, name: &str) -> Result<ImageSurface> {
        let bytes = self.icon_bytes(name)?;
        ImageSurface::create_from_png(&mut Cursor::new(bytes.as_slice()))
            .with_context(|| format!("decoding icon {}", name))
    }

    /// Paint icon `name` centered on (cx, cy); returns the icon size
    pub fn draw_icon_centered(&self, cr: &Context, name: &str, cx: f64, cy: f64) -> Result<(f64, f64)> {
        let icon = self.icon(name)?;
        let (w, h) = (icon.width() as f64, icon.height() as f64);
        cr.save()?;
        cr.set_source_surface(&icon, (cx - w / 2.0).floor(), (cy - h / 2.0).floor())?;
        cr.paint()?;
        cr.restore()?;
        Ok((w, h))
    }

    /// Number of icons currently cached
    pub fn cached_icons(&self) -> usize {
        self.icons.lock().map(|icons| icons.len()).unwrap_or(0)
    }
}
