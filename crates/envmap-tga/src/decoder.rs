/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use envmap_core::bytestream::ByteReader;
use envmap_core::format::TextureFormat;
use envmap_core::image::Image;
use envmap_core::options::DecoderOptions;
use envmap_core::transform::{transform, OP_FLIP_X, OP_FLIP_Y};
use log::{trace, warn};

use crate::common::{TgaHeader, TGA_DESC_HORIZONTAL, TGA_DESC_VERTICAL, TGA_IT_RGB, TGA_IT_RLE};
use crate::errors::TgaDecodeErrors;

/// A TGA decoder for true-color files
///
/// Decodes into `BGR8` (24 bpp) or `BGRA8` (32 bpp), applying the
/// image-descriptor orientation so rows are returned top to bottom.
pub struct TgaDecoder<'a> {
    stream:          ByteReader<'a>,
    options:         DecoderOptions,
    header:          TgaHeader,
    format:          TextureFormat,
    decoded_headers: bool
}

impl<'a> TgaDecoder<'a> {
    /// Create a new TGA decoder reading from `data`
    pub fn new(data: &'a [u8]) -> TgaDecoder<'a> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new TGA decoder with custom options
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> TgaDecoder<'a> {
        TgaDecoder {
            stream: ByteReader::new(data),
            options,
            header: TgaHeader::default(),
            format: TextureFormat::Unknown,
            decoded_headers: false
        }
    }

    /// Image dimensions as `(width, height)`, present once the headers
    /// have been decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            Some((self.header.width as usize, self.header.height as usize))
        } else {
            None
        }
    }

    /// The texture format pixels will decode into, present once the
    /// headers have been decoded
    pub const fn texture_format(&self) -> Option<TextureFormat> {
        if self.decoded_headers {
            Some(self.format)
        } else {
            None
        }
    }

    /// Parse and validate the 18-byte header
    pub fn decode_headers(&mut self) -> Result<(), TgaDecodeErrors> {
        if self.decoded_headers {
            return Ok(());
        }

        let header = TgaHeader::read(&mut self.stream)?;

        // true-color only: raw (2) or RLE (10)
        if (header.image_type & !TGA_IT_RLE) != TGA_IT_RGB {
            return Err(TgaDecodeErrors::NotTrueColor(header.image_type));
        }

        self.format = match header.bits_per_pixel {
            24 => TextureFormat::BGR8,
            32 => TextureFormat::BGRA8,
            depth => return Err(TgaDecodeErrors::UnsupportedBitDepth(depth))
        };

        if header.width == 0 || header.height == 0 {
            return Err(TgaDecodeErrors::InvalidHeader("zero image dimension"));
        }
        if usize::from(header.width) > self.options.max_width() {
            return Err(TgaDecodeErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                usize::from(header.width)
            ));
        }
        if usize::from(header.height) > self.options.max_height() {
            return Err(TgaDecodeErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                usize::from(header.height)
            ));
        }

        trace!("Width: {}", header.width);
        trace!("Height: {}", header.height);
        trace!("Bits per pixel: {}", header.bits_per_pixel);

        self.header = header;
        self.decoded_headers = true;

        Ok(())
    }

    /// Decode the file into a single-face, single-mip image
    pub fn decode(&mut self) -> Result<Image, TgaDecodeErrors> {
        self.decode_headers()?;

        let header = self.header;
        let bytes_per_pixel = usize::from(header.bits_per_pixel / 8);
        let num_pixels = usize::from(header.width) * usize::from(header.height);
        let mut data = vec![0_u8; num_pixels * bytes_per_pixel];

        // image id and color map sit between the header and the pixels
        let skip = usize::from(header.id_length)
            + usize::from(header.color_map_type & 0x1) * usize::from(header.color_map_length);
        self.stream.skip(skip);

        if header.image_type & TGA_IT_RLE != 0 {
            self.decode_rle(&mut data, bytes_per_pixel, num_pixels)?;
        } else {
            self.stream.read_exact(&mut data)?;
        }

        let mut image = Image::from_parts(
            data,
            u32::from(header.width),
            u32::from(header.height),
            self.format,
            1,
            1
        )
        .map_err(TgaDecodeErrors::Generic)?;

        // normalize orientation: files are bottom-up unless the vertical
        // bit says otherwise, and may be right-to-left
        let mut ops = 0_u32;
        if header.image_descriptor & TGA_DESC_HORIZONTAL != 0 {
            ops |= OP_FLIP_Y;
        }
        if header.image_descriptor & TGA_DESC_VERTICAL == 0 {
            ops |= OP_FLIP_X;
        }
        if ops != 0 {
            transform(&mut image, &[ops]);
        }

        Ok(image)
    }

    fn decode_rle(
        &mut self, data: &mut [u8], bytes_per_pixel: usize, num_pixels: usize
    ) -> Result<(), TgaDecodeErrors> {
        let mut texel = [0_u8; 4];
        let texel = &mut texel[..bytes_per_pixel];
        let mut filled = 0_usize;

        while filled < num_pixels {
            let packet = self.stream.read_u8_err()?;
            let count = usize::from(packet & 0x7F);

            // the packet header is always followed by one pixel
            self.stream.read_exact(texel)?;
            data[filled * bytes_per_pixel..(filled + 1) * bytes_per_pixel].copy_from_slice(texel);
            filled += 1;

            if packet & 0x80 != 0 {
                // RLE packet: repeat that pixel `count` more times
                if count > num_pixels - filled {
                    warn!("Tga RLE packet overflows the image, truncating.");
                }
                for _ in 0..count.min(num_pixels - filled) {
                    data[filled * bytes_per_pixel..(filled + 1) * bytes_per_pixel]
                        .copy_from_slice(texel);
                    filled += 1;
                }
            } else {
                // raw packet: `count` more literal pixels follow
                if count > num_pixels - filled {
                    warn!("Tga raw packet overflows the image, truncating.");
                }
                for _ in 0..count.min(num_pixels - filled) {
                    self.stream.read_exact(texel)?;
                    data[filled * bytes_per_pixel..(filled + 1) * bytes_per_pixel]
                        .copy_from_slice(texel);
                    filled += 1;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envmap_core::bytestream::ByteWriter;

    fn raw_tga(width: u16, height: u16, descriptor: u8, pixels: &[u8]) -> Vec<u8> {
        let header = TgaHeader {
            image_type: TGA_IT_RGB,
            width,
            height,
            bits_per_pixel: 24,
            image_descriptor: descriptor,
            ..TgaHeader::default()
        };
        let mut writer = ByteWriter::new();
        header.write(&mut writer);
        writer.write_all(pixels);
        writer.into_inner()
    }

    #[test]
    fn decodes_raw_top_down() {
        // vertical bit set: rows already top-to-bottom
        let file = raw_tga(2, 1, TGA_DESC_VERTICAL, &[1, 2, 3, 4, 5, 6]);
        let image = TgaDecoder::new(&file).decode().unwrap();

        assert_eq!(image.format(), TextureFormat::BGR8);
        assert_eq!(image.data(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn bottom_up_files_are_flipped() {
        let file = raw_tga(1, 2, 0, &[1, 2, 3, 4, 5, 6]);
        let image = TgaDecoder::new(&file).decode().unwrap();
        // file stored bottom row first
        assert_eq!(image.data(), &[4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn decodes_rle_packets() {
        // 4x1 BGR8: a run of three red pixels then one literal green
        let header = TgaHeader {
            image_type: TGA_IT_RGB | TGA_IT_RLE,
            width: 4,
            height: 1,
            bits_per_pixel: 24,
            image_descriptor: TGA_DESC_VERTICAL,
            ..TgaHeader::default()
        };
        let mut writer = ByteWriter::new();
        header.write(&mut writer);
        writer.write_all(&[0x82, 0, 0, 255]);
        writer.write_all(&[0x00, 0, 255, 0]);
        let file = writer.into_inner();

        let image = TgaDecoder::new(&file).decode().unwrap();
        assert_eq!(
            image.data(),
            &[0, 0, 255, 0, 0, 255, 0, 0, 255, 0, 255, 0]
        );
    }

    #[test]
    fn rejects_color_mapped_files() {
        let header = TgaHeader {
            image_type: 0x1,
            color_map_type: 1,
            width: 1,
            height: 1,
            bits_per_pixel: 8,
            ..TgaHeader::default()
        };
        let mut writer = ByteWriter::new();
        header.write(&mut writer);

        let file = writer.into_inner();
        assert!(matches!(
            TgaDecoder::new(&file).decode(),
            Err(TgaDecodeErrors::NotTrueColor(1))
        ));
    }

    #[test]
    fn rejects_unsupported_depth() {
        let header = TgaHeader {
            image_type: TGA_IT_RGB,
            width: 1,
            height: 1,
            bits_per_pixel: 16,
            ..TgaHeader::default()
        };
        let mut writer = ByteWriter::new();
        header.write(&mut writer);

        let file = writer.into_inner();
        assert!(matches!(
            TgaDecoder::new(&file).decode(),
            Err(TgaDecodeErrors::UnsupportedBitDepth(16))
        ));
    }
}
