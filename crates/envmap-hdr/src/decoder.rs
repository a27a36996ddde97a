/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::collections::BTreeMap;

use envmap_core::bytestream::ByteReader;
use envmap_core::format::TextureFormat;
use envmap_core::image::Image;
use envmap_core::options::DecoderOptions;
use log::{trace, warn};

use crate::errors::HdrDecodeErrors;

/// A Radiance HDR decoder
///
/// Decodes into an [`Image`] carrying the raw `RGBE` bytes; expansion to
/// float is a caller side conversion.
///
/// # Accessing metadata
///
/// Radiance files may carry metadata in their headers as key value pairs.
/// The decoder saves all of them in a map exposed through
/// [`metadata()`](Self::metadata); `GAMMA` and `EXPOSURE` are additionally
/// parsed into typed accessors.
pub struct HdrDecoder<'a> {
    stream:          ByteReader<'a>,
    options:         DecoderOptions,
    metadata:        BTreeMap<String, String>,
    gamma:           f32,
    exposure:        f32,
    width:           usize,
    height:          usize,
    decoded_headers: bool
}

impl<'a> HdrDecoder<'a> {
    /// Create a new HDR decoder reading from `data`
    pub fn new(data: &'a [u8]) -> HdrDecoder<'a> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new HDR decoder with custom options
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> HdrDecoder<'a> {
        HdrDecoder {
            stream: ByteReader::new(data),
            options,
            metadata: BTreeMap::new(),
            gamma: 1.0,
            exposure: 1.0,
            width: 0,
            height: 0,
            decoded_headers: false
        }
    }

    /// Key value metadata found in the header
    pub const fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// The `GAMMA` header value, 1.0 when absent
    pub const fn gamma(&self) -> f32 {
        self.gamma
    }

    /// The `EXPOSURE` header value, 1.0 when absent
    pub const fn exposure(&self) -> f32 {
        self.exposure
    }

    /// Image dimensions as `(width, height)`, present once the headers
    /// have been decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            Some((self.width, self.height))
        } else {
            None
        }
    }

    /// Read bytes up to and including the next `\n` into `line`,
    /// returning the number of bytes read
    fn read_line(&mut self, line: &mut Vec<u8>) -> Result<usize, HdrDecodeErrors> {
        line.clear();
        while !self.stream.eof() {
            let byte = self.stream.read_u8_err()?;
            line.push(byte);
            if byte == b'\n' {
                break;
            }
        }
        Ok(line.len())
    }

    /// Decode the text header leaving the cursor at the first byte of the
    /// pixel stream
    pub fn decode_headers(&mut self) -> Result<(), HdrDecodeErrors> {
        if self.decoded_headers {
            return Ok(());
        }

        let mut line = Vec::with_capacity(128);

        self.read_line(&mut line)?;
        if !(line.starts_with(b"#?RADIANCE") || line.starts_with(b"#?RGBE")) {
            return Err(HdrDecodeErrors::InvalidMagicBytes);
        }

        let mut format_defined = false;
        loop {
            let size = self.read_line(&mut line)?;
            if size == 0 {
                return Err(HdrDecodeErrors::InvalidHeader("unterminated header"));
            }
            if line[0] == b'\n' {
                // blank line, end of header
                break;
            }
            if line[0] == b'#' {
                continue;
            }

            if line.contains(&b'=') {
                // keys or values that are not valid utf-8 still land in the
                // map, replacement characters and all
                let text = String::from_utf8_lossy(&line[..size]);
                let mut split = text.trim().splitn(2, '=');
                let key = split.next().unwrap_or("").trim().to_string();
                let value = split.next().unwrap_or("").trim().to_string();

                match key.as_str() {
                    "FORMAT" => format_defined = value == "32-bit_rle_rgbe",
                    "GAMMA" => {
                        if let Ok(gamma) = value.parse::<f32>() {
                            self.gamma = gamma;
                        }
                    }
                    "EXPOSURE" => {
                        if let Ok(exposure) = value.parse::<f32>() {
                            self.exposure = exposure;
                        }
                    }
                    _ => {}
                }
                self.metadata.insert(key, value);
            }
        }

        if !format_defined {
            if self.options.strict_mode() {
                return Err(HdrDecodeErrors::InvalidHeader("missing FORMAT=32-bit_rle_rgbe"));
            }
            warn!("HDR header does not declare FORMAT=32-bit_rle_rgbe.");
        }
        trace!("Metadata: {:?}", self.metadata);

        // dimension line, e.g. "-Y 512 +X 1024"
        self.read_line(&mut line)?;
        let text = String::from_utf8_lossy(&line);
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != 4 || tokens[0] != "-Y" || tokens[2] != "+X" {
            return Err(HdrDecodeErrors::UnsupportedOrientation(text.trim().to_string()));
        }
        self.height = tokens[1].parse::<usize>()?;
        self.width = tokens[3].parse::<usize>()?;

        if self.width > self.options.max_width() {
            return Err(HdrDecodeErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                self.width
            ));
        }
        if self.height > self.options.max_height() {
            return Err(HdrDecodeErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                self.height
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(HdrDecodeErrors::InvalidHeader("zero image dimension"));
        }

        trace!("Width: {}", self.width);
        trace!("Height: {}", self.height);

        self.decoded_headers = true;

        Ok(())
    }

    /// Decode the file, returning an `RGBE` image
    pub fn decode(&mut self) -> Result<Image, HdrDecodeErrors> {
        self.decode_headers()?;

        let width = self.width;
        let height = self.height;
        let mut data = vec![0_u8; width * height * 4];

        // the first four bytes decide between a flat RGBE stream and the
        // adaptive RLE layout
        let marker = self.stream.read_fixed_bytes_or_error::<4>()?;

        let is_rle = (8..=0x7FFF).contains(&width)
            && marker[0] == 2
            && marker[1] == 2
            && marker[2] & 0x80 == 0;

        if !is_rle {
            // the marker was the first pixel
            data[..4].copy_from_slice(&marker);
            self.stream.read_exact(&mut data[4..])?;
        } else {
            self.decode_rle(marker, &mut data)?;
        }

        Image::from_parts(data, width as u32, height as u32, TextureFormat::RGBE, 1, 1)
            .map_err(HdrDecodeErrors::Generic)
    }

    /// Decode the RLE pixel stream; `marker` is the already consumed
    /// header of the first scanline
    fn decode_rle(&mut self, mut marker: [u8; 4], data: &mut [u8]) -> Result<(), HdrDecodeErrors> {
        let width = self.width;
        let height = self.height;

        // one scanline, channel planar: all R bytes, then G, B, E
        let mut scanline = vec![0_u8; width * 4];

        for row in 0..height {
            let marker_width = (usize::from(marker[2]) << 8) | usize::from(marker[3]);
            if marker_width != width {
                return Err(HdrDecodeErrors::InvalidScanline(
                    "scanline width does not match the image width"
                ));
            }

            for channel in 0..4 {
                let plane = &mut scanline[channel * width..(channel + 1) * width];
                let mut filled = 0_usize;

                while filled < width {
                    let run = self.stream.read_fixed_bytes_or_error::<2>()?;

                    if run[0] > 128 {
                        // run of a single value
                        let count = usize::from(run[0]) - 128;
                        if count > width - filled {
                            return Err(HdrDecodeErrors::InvalidScanline("run overflows scanline"));
                        }
                        plane[filled..filled + count].fill(run[1]);
                        filled += count;
                    } else {
                        // literal bytes, the first came with the run header
                        let count = usize::from(run[0]);
                        if count == 0 || count > width - filled {
                            return Err(HdrDecodeErrors::InvalidScanline(
                                "literal run overflows scanline"
                            ));
                        }
                        plane[filled] = run[1];
                        if count > 1 {
                            self.stream.read_exact(&mut plane[filled + 1..filled + count])?;
                        }
                        filled += count;
                    }
                }
            }

            // re-interleave the channel planes into RGBE quadruples
            let out_row = &mut data[row * width * 4..(row + 1) * width * 4];
            for (column, texel) in out_row.chunks_exact_mut(4).enumerate() {
                texel[0] = scanline[column];
                texel[1] = scanline[column + width];
                texel[2] = scanline[column + 2 * width];
                texel[3] = scanline[column + 3 * width];
            }

            if row + 1 < height {
                marker = self.stream.read_fixed_bytes_or_error::<4>()?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel_rgba32f(image: &Image, x: u32, y: u32) -> [f32; 4] {
        let mut bytes = [0_u8; 16];
        image.get_pixel(&mut bytes, TextureFormat::RGBA32F, x, y, 0, 0);

        let mut rgba = [0.0_f32; 4];
        for (channel, chunk) in bytes.chunks_exact(4).enumerate() {
            rgba[channel] = f32::from_le_bytes(chunk.try_into().unwrap());
        }
        rgba
    }

    #[test]
    fn decodes_flat_rgbe() {
        let mut file = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 2 +X 2\n".to_vec();
        file.extend_from_slice(&[
            0x80, 0x80, 0x80, 0x80, 0, 0, 0, 0, //
            0x80, 0x80, 0x80, 0x80, 0, 0, 0, 0,
        ]);

        let mut decoder = HdrDecoder::new(&file);
        let image = decoder.decode().unwrap();

        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.format(), TextureFormat::RGBE);
        assert_eq!(image.num_faces(), 1);
        assert_eq!(image.num_mips(), 1);

        assert_eq!(pixel_rgba32f(&image, 0, 0), [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(pixel_rgba32f(&image, 1, 0), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn decodes_rle_scanlines() {
        let width = 8_usize;
        let mut file = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 8\n".to_vec();
        // scanline marker
        file.extend_from_slice(&[2, 2, 0, 8]);
        // R: run of 8 x 0x40
        file.extend_from_slice(&[136, 0x40]);
        // G: 4 literals then a run of 4
        file.extend_from_slice(&[4, 1, 2, 3, 4, 132, 9]);
        // B: run of 8 zeros
        file.extend_from_slice(&[136, 0]);
        // E: run of 8 x 0x80
        file.extend_from_slice(&[136, 0x80]);

        let mut decoder = HdrDecoder::new(&file);
        let image = decoder.decode().unwrap();

        let data = image.data();
        for x in 0..width {
            assert_eq!(data[x * 4], 0x40);
            assert_eq!(data[x * 4 + 2], 0);
            assert_eq!(data[x * 4 + 3], 0x80);
        }
        let greens: Vec<u8> = (0..width).map(|x| data[x * 4 + 1]).collect();
        assert_eq!(greens, [1, 2, 3, 4, 9, 9, 9, 9]);
    }

    #[test]
    fn header_metadata_is_kept() {
        let mut file =
            b"#?RADIANCE\n# a comment\nFORMAT=32-bit_rle_rgbe\nEXPOSURE=2.5\nGAMMA=2.2\nSOFTWARE=test\n\n-Y 1 +X 1\n"
                .to_vec();
        file.extend_from_slice(&[0, 0, 0, 0]);

        let mut decoder = HdrDecoder::new(&file);
        decoder.decode_headers().unwrap();

        assert_eq!(decoder.dimensions(), Some((1, 1)));
        assert_eq!(decoder.exposure(), 2.5);
        assert_eq!(decoder.gamma(), 2.2);
        assert_eq!(decoder.metadata().get("SOFTWARE").map(String::as_str), Some("test"));
    }

    #[test]
    fn rejects_bad_magic() {
        let file = b"#?NOPE\n\n-Y 1 +X 1\n\0\0\0\0";
        let mut decoder = HdrDecoder::new(file.as_slice());
        assert!(matches!(
            decoder.decode(),
            Err(HdrDecodeErrors::InvalidMagicBytes)
        ));
    }

    #[test]
    fn rejects_unsupported_orientation() {
        let file = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n+X 1 -Y 1\n";
        let mut decoder = HdrDecoder::new(file.as_slice());
        assert!(matches!(
            decoder.decode_headers(),
            Err(HdrDecodeErrors::UnsupportedOrientation(_))
        ));
    }
}
