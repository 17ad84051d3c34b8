//! Drawing surface for one frame.

use anyhow::{anyhow, Context as _, Result};
use cairo::{Antialias, Context, FontOptions, Format, ImageSurface};
use epaper_types::Color;

use crate::raster::RasterImage;

/// Set the cairo source to a palette color
pub fn set_source_color(cr: &Context, color: Color) {
    let (r, g, b) = color.to_unit_rgb();
    cr.set_source_rgb(r, g, b);
}

/// Fill an axis-aligned rectangle with a solid color
pub fn fill_rect(cr: &Context, x: f64, y: f64, width: f64, height: f64, color: Color) -> Result<()> {
    cr.save()?;
    set_source_color(cr, color);
    cr.rectangle(x, y, width, height);
    cr.fill()?;
    cr.restore()?;
    Ok(())
}

/// An RGB image surface the size of a display, before rotation.
///
/// Antialiasing is disabled for shapes and text: e-paper palettes have no
/// intermediate shades, and grey fringes would quantise unpredictably.
pub struct Canvas {
    surface: ImageSurface,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Allocate a canvas filled with `background`
    pub fn new(width: u32, height: u32, background: Color) -> Result<Self> {
        let surface = ImageSurface::create(Format::Rgb24, width as i32, height as i32)
            .with_context(|| format!("creating {}x{} canvas", width, height))?;
        let canvas = Self {
            surface,
            width,
            height,
        };
        {
            let cr = canvas.context()?;
            set_source_color(&cr, background);
            cr.paint()?;
        }
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// A fresh drawing context with antialiasing turned off.
    ///
    /// Every context must be dropped before [`Canvas::quantize`].
    pub fn context(&self) -> Result<Context> {
        let cr = Context::new(&self.surface).context("creating cairo context")?;
        cr.set_antialias(Antialias::None);
        let mut options = FontOptions::new().context("creating font options")?;
        options.set_antialias(Antialias::None);
        cr.set_font_options(&options);
        Ok(cr)
    }

    /// Map every pixel to the nearest palette entry
    pub fn quantize(mut self, palette: &[Color]) -> Result<RasterImage> {
        if palette.is_empty() {
            return Err(anyhow!("cannot quantise against an empty palette"));
        }
        self.surface.flush();
        let stride = self.surface.stride() as usize;
        let (width, height) = (self.width as usize, self.height as usize);
        let data = self
            .surface
            .data()
            .map_err(|e| anyhow!("canvas still borrowed while quantising: {}", e))?;

        // Memoise the nearest lookup; frames use very few distinct colors
        let mut last: Option<(u32, u8)> = None;
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            let row = &data[y * stride..y * stride + width * 4];
            for px in row.chunks_exact(4) {
                let value = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]) & 0x00ff_ffff;
                let index = match last {
                    Some((v, i)) if v == value => i,
                    _ => {
                        let color = Color::new(
                            (value >> 16) as u8,
                            (value >> 8) as u8,
                            value as u8,
                        );
                        let i = color.nearest_index(palette) as u8;
                        last = Some((value, i));
                        i
                    }
                };
                pixels.push(index);
            }
        }
        drop(data);
        RasterImage::from_indices(self.width, self.height, pixels)
    }
}
