/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Radiance HDR encoder

use envmap_core::bytestream::ByteWriter;
use envmap_core::format::TextureFormat;
use envmap_core::image::Image;
use log::warn;

use crate::errors::HdrEncodeErrors;

/// A Radiance HDR encoder
///
/// The image must already be in the `RGBE` texture format; the save
/// dispatcher enforces this through the file type's allowed format list.
///
/// The format stores a single flat image, so only face 0 / mip 0 is
/// written; anything beyond that is dropped with a warning. Scanlines
/// are written without run-length compression.
pub struct HdrEncoder<'a> {
    image: &'a Image
}

impl<'a> HdrEncoder<'a> {
    /// Create a new HDR encoder for `image`
    pub const fn new(image: &'a Image) -> HdrEncoder<'a> {
        HdrEncoder { image }
    }

    /// Encode the image, returning the file bytes
    pub fn encode(&self) -> Result<Vec<u8>, HdrEncodeErrors> {
        let image = self.image;

        if image.format() != TextureFormat::RGBE {
            return Err(HdrEncodeErrors::UnsupportedTextureFormat(image.format()));
        }

        let (width, height) = image.dimensions();
        if width > 0x7FFF_FFFF || height > 0x7FFF_FFFF {
            return Err(HdrEncodeErrors::TooLargeDimensions(width.max(height) as usize));
        }

        if image.num_faces() != 1 {
            warn!(
                "Image contains more than one face. Only the first one will \
                 be saved due to the limits of the HDR format."
            );
        }
        if image.num_mips() != 1 {
            warn!(
                "Image contains more than one mip level. Only the first one \
                 will be saved due to the limits of the HDR format."
            );
        }

        let pitch = width as usize * image.format().bytes_per_pixel();
        let face_size = pitch * height as usize;

        let mut writer = ByteWriter::with_capacity(face_size + 128);

        writer.write_all(b"#?RADIANCE\n");
        writer.write_all(b"SOFTWARE=envmap-hdr\n");
        writer.write_all(b"FORMAT=32-bit_rle_rgbe\n");
        writer.write_all(b"EXPOSURE=1\n");
        writer.write_all(b"\n");
        writer.write_all(format!("-Y {height} +X {width}\n").as_bytes());

        // face 0 / mip 0 sits at the start of the buffer
        writer.write_all(&image.data()[..face_size]);

        Ok(writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::HdrDecoder;

    #[test]
    fn encode_then_decode_reproduces_bytes() {
        let pixels: Vec<u8> = (0..4 * 3 * 2).map(|i| (i * 7) as u8).collect();
        let image =
            Image::from_parts(pixels.clone(), 3, 2, TextureFormat::RGBE, 1, 1).unwrap();

        let encoded = HdrEncoder::new(&image).encode().unwrap();
        let decoded = HdrDecoder::new(&encoded).decode().unwrap();

        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.format(), TextureFormat::RGBE);
        assert_eq!(decoded.data(), pixels.as_slice());
    }

    #[test]
    fn rejects_non_rgbe() {
        let image = Image::from_parts(vec![0; 4], 1, 1, TextureFormat::RGBA8, 1, 1).unwrap();
        assert!(matches!(
            HdrEncoder::new(&image).encode(),
            Err(HdrEncodeErrors::UnsupportedTextureFormat(_))
        ));
    }

    #[test]
    fn header_declares_rgbe_format() {
        let image = Image::from_parts(vec![0; 4], 1, 1, TextureFormat::RGBE, 1, 1).unwrap();
        let encoded = HdrEncoder::new(&image).encode().unwrap();
        let text = String::from_utf8_lossy(&encoded);

        assert!(text.starts_with("#?RADIANCE\n"));
        assert!(text.contains("FORMAT=32-bit_rle_rgbe\n"));
        assert!(text.contains("\n\n-Y 1 +X 1\n"));
    }
}
