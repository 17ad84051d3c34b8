//! Indexed PNG encoding, the wire format served to devices.
//!
//! Devices read the palette index straight out of the packed rows, so the
//! bit depth written here is the display's `bits_per_pixel`.

use std::io::Cursor;

use anyhow::{bail, Context as _, Result};
use epaper_types::Color;

use crate::raster::RasterImage;

fn bit_depth(bits_per_pixel: u8) -> Result<png::BitDepth> {
    Ok(match bits_per_pixel {
        1 => png::BitDepth::One,
        2 => png::BitDepth::Two,
        4 => png::BitDepth::Four,
        8 => png::BitDepth::Eight,
        other => bail!("unsupported bits per pixel: {}", other),
    })
}

/// Pack indices MSB-first, each row padded to a whole byte
fn pack_rows(image: &RasterImage, bits: u8) -> Vec<u8> {
    let width = image.width() as usize;
    let per_byte = 8 / bits as usize;
    let row_bytes = width.div_ceil(per_byte);
    let mask = ((1u16 << bits) - 1) as u8;

    let mut out = vec![0u8; row_bytes * image.height() as usize];
    for (y, row) in image.pixels().chunks(width.max(1)).enumerate() {
        let dst = &mut out[y * row_bytes..(y + 1) * row_bytes];
        for (x, &index) in row.iter().enumerate() {
            let shift = 8 - bits as usize * (x % per_byte + 1);
            dst[x / per_byte] |= (index & mask) << shift;
        }
    }
    out
}

fn unpack_rows(data: &[u8], width: u32, height: u32, line_size: usize, bits: u8) -> Vec<u8> {
    let per_byte = 8 / bits as usize;
    let mask = ((1u16 << bits) - 1) as u8;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height as usize {
        let row = &data[y * line_size..(y + 1) * line_size];
        for x in 0..width as usize {
            let shift = 8 - bits as usize * (x % per_byte + 1);
            pixels.push((row[x / per_byte] >> shift) & mask);
        }
    }
    pixels
}

/// Encode a palette-indexed frame as a PNG with a PLTE chunk
pub fn encode_indexed(image: &RasterImage, palette: &[Color], bits_per_pixel: u8) -> Result<Vec<u8>> {
    let depth = bit_depth(bits_per_pixel)?;
    if palette.is_empty() || palette.len() > 1usize << bits_per_pixel {
        bail!(
            "palette of {} colors does not fit {} bits per pixel",
            palette.len(),
            bits_per_pixel
        );
    }
    if image.max_index() as usize >= palette.len() {
        bail!("frame uses index {} outside the palette", image.max_index());
    }

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
    let packed = pack_rows(image, bits_per_pixel);

    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(depth);
        encoder.set_palette(plte);
        let mut writer = encoder.write_header().context("writing PNG header")?;
        writer
            .write_image_data(&packed)
            .context("writing PNG image data")?;
        writer.finish().context("finishing PNG stream")?;
    }
    Ok(buf)
}

/// Decode an indexed PNG back into its frame and palette
pub fn decode_indexed(bytes: &[u8]) -> Result<(RasterImage, Vec<Color>)> {
    let mut decoder = png::Decoder::new(Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info().context("reading PNG header")?;

    let (color_type, bits) = {
        let info = reader.info();
        (info.color_type, info.bit_depth as u8)
    };
    if color_type != png::ColorType::Indexed {
        bail!("expected an indexed PNG, got {:?}", color_type);
    }
    let palette: Vec<Color> = reader
        .info()
        .palette
        .as_ref()
        .map(|p| {
            p.chunks_exact(3)
                .map(|c| Color::new(c[0], c[1], c[2]))
                .collect()
        })
        .unwrap_or_default();

    let mut data = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut data).context("decoding PNG frame")?;
    let pixels = unpack_rows(&data, frame.width, frame.height, frame.line_size, bits);
    let image = RasterImage::from_indices(frame.width, frame.height, pixels)?;
    Ok((image, palette))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Vec<Color> {
        vec![Color::WHITE, Color::BLACK, Color::new(255, 0, 0)]
    }

    #[test]
    fn test_two_bit_frame_survives_encoding() {
        // Odd width exercises row padding
        let mut img = RasterImage::new(5, 3);
        img.set(0, 0, 1);
        img.set(4, 0, 2);
        img.set(2, 2, 1);

        let bytes = encode_indexed(&img, &palette(), 2).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let (decoded, decoded_palette) = decode_indexed(&bytes).unwrap();
        assert_eq!(decoded, img);
        assert_eq!(decoded_palette, palette());
    }

    #[test]
    fn test_encode_rejects_palette_overflow() {
        let img = RasterImage::new(2, 2);
        assert!(encode_indexed(&img, &palette(), 1).is_err());
        assert!(encode_indexed(&img, &palette(), 3).is_err());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_indexed(b"not a png").is_err());
    }
}
