//! Palette-indexed raster frames.
//!
//! A [`RasterImage`] stores one palette index per pixel, row-major. Frames are
//! rotated and compared in this form, so the diff never depends on how the
//! pixels were encoded on the wire.

use anyhow::{bail, Result};

/// Pixel region with exclusive `right`/`bottom` edges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// A frame filled with palette index 0
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn from_indices(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            bail!(
                "raster of {}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            );
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    pub fn set(&mut self, x: u32, y: u32, index: u8) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = index;
        }
    }

    /// Highest palette index in use
    pub fn max_index(&self) -> u8 {
        self.pixels.iter().copied().max().unwrap_or(0)
    }

    /// Rotate counter-clockwise by `degrees`, growing the frame so nothing is
    /// cut off. Uncovered corners are filled with index 0.
    pub fn rotated(&self, degrees: f64) -> RasterImage {
        let normalized = degrees.rem_euclid(360.0);
        let quarter = normalized / 90.0;
        if (quarter - quarter.round()).abs() < 1e-9 {
            return self.rotated_quarters(quarter.round() as u32 % 4);
        }
        self.rotated_nearest(normalized.to_radians())
    }

    fn rotated_quarters(&self, quarters: u32) -> RasterImage {
        let (w, h) = (self.width, self.height);
        if quarters == 0 {
            return self.clone();
        }
        let (nw, nh) = if quarters == 2 { (w, h) } else { (h, w) };
        let mut out = RasterImage::new(nw, nh);
        for y in 0..nh {
            for x in 0..nw {
                let (sx, sy) = match quarters {
                    1 => (w - 1 - y, x),
                    2 => (w - 1 - x, h - 1 - y),
                    _ => (y, h - 1 - x),
                };
                out.pixels[y as usize * nw as usize + x as usize] =
                    self.pixels[sy as usize * w as usize + sx as usize];
            }
        }
        out
    }

    fn rotated_nearest(&self, radians: f64) -> RasterImage {
        let (sin, cos) = radians.sin_cos();
        let w = self.width as f64;
        let h = self.height as f64;
        let nw = ((w * cos).abs() + (h * sin).abs() - 1e-6).ceil().max(1.0) as u32;
        let nh = ((w * sin).abs() + (h * cos).abs() - 1e-6).ceil().max(1.0) as u32;

        let (cx, cy) = (w / 2.0, h / 2.0);
        let (dcx, dcy) = (nw as f64 / 2.0, nh as f64 / 2.0);
        let mut out = RasterImage::new(nw, nh);
        for y in 0..nh {
            for x in 0..nw {
                let px = x as f64 + 0.5 - dcx;
                let py = y as f64 + 0.5 - dcy;
                let sx = (px * cos - py * sin + cx).floor();
                let sy = (px * sin + py * cos + cy).floor();
                if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                    out.pixels[y as usize * nw as usize + x as usize] =
                        self.pixels[sy as usize * self.width as usize + sx as usize];
                }
            }
        }
        out
    }

    /// Smallest region containing every differing pixel, `None` when identical.
    ///
    /// Frames of different dimensions differ everywhere.
    pub fn difference_bbox(&self, other: &RasterImage) -> Option<BoundingBox> {
        if self.width != other.width || self.height != other.height {
            return Some(BoundingBox {
                left: 0,
                top: 0,
                right: self.width.max(other.width),
                bottom: self.height.max(other.height),
            });
        }

        let mut bbox: Option<BoundingBox> = None;
        let row_len = self.width as usize;
        for y in 0..self.height {
            let start = y as usize * row_len;
            let a = &self.pixels[start..start + row_len];
            let b = &other.pixels[start..start + row_len];
            if a == b {
                continue;
            }
            let first = a.iter().zip(b).position(|(p, q)| p != q).unwrap_or(0) as u32;
            let last = a.iter().zip(b).rposition(|(p, q)| p != q).unwrap_or(0) as u32;
            bbox = Some(match bbox {
                None => BoundingBox {
                    left: first,
                    top: y,
                    right: last + 1,
                    bottom: y + 1,
                },
                Some(b) => BoundingBox {
                    left: b.left.min(first),
                    top: b.top,
                    right: b.right.max(last + 1),
                    bottom: y + 1,
                },
            });
        }
        bbox
    }
}
