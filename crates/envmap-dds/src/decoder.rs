/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use envmap_core::bytestream::ByteReader;
use envmap_core::format::{ImageFileType, TextureFormat};
use envmap_core::image::{self, Image, MAX_MIP_COUNT};
use envmap_core::options::DecoderOptions;
use log::{trace, warn};

use crate::common::*;
use crate::errors::DdsDecodeErrors;

/// A DDS decoder for uncompressed 2D textures and cubemaps
pub struct DdsDecoder<'a> {
    stream:          ByteReader<'a>,
    options:         DecoderOptions,
    format:          TextureFormat,
    width:           u32,
    height:          u32,
    num_mips:        u8,
    num_faces:       u8,
    has_dx10_header: bool,
    decoded_headers: bool
}

impl<'a> DdsDecoder<'a> {
    /// Create a new DDS decoder reading from `data`
    pub fn new(data: &'a [u8]) -> DdsDecoder<'a> {
        Self::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new DDS decoder with custom options
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> DdsDecoder<'a> {
        DdsDecoder {
            stream: ByteReader::new(data),
            options,
            format: TextureFormat::Unknown,
            width: 0,
            height: 0,
            num_mips: 0,
            num_faces: 0,
            has_dx10_header: false,
            decoded_headers: false
        }
    }

    /// Image dimensions as `(width, height)`, present once the headers
    /// have been decoded
    pub const fn dimensions(&self) -> Option<(usize, usize)> {
        if self.decoded_headers {
            Some((self.width as usize, self.height as usize))
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

    /// Parse and validate the magic, the 124-byte header and the DX10
    /// extension header when present, leaving the cursor at the pixel
    /// stream
    pub fn decode_headers(&mut self) -> Result<(), DdsDecodeErrors> {
        if self.decoded_headers {
            return Ok(());
        }

        let magic = self.stream.get_u32_le_err()?;
        if magic != DDS_MAGIC {
            return Err(DdsDecodeErrors::InvalidMagicBytes);
        }

        let mut header = DdsHeader::read(&mut self.stream)?;

        let has_dx10 = header.pixel_format.fourcc == DDS_DX10
            && header.pixel_format.flags & DDPF_FOURCC != 0;
        let dx10 = if has_dx10 {
            Some(DdsHeaderDx10::read(&mut self.stream)?)
        } else {
            None
        };

        if header.size != DDS_HEADER_SIZE as u32 {
            return Err(DdsDecodeErrors::InvalidHeader("wrong header size field"));
        }

        const REQUIRED: u32 = DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT;
        if header.flags & REQUIRED != REQUIRED {
            return Err(DdsDecodeErrors::InvalidHeader("mandatory flags missing"));
        }

        if header.caps & DDSCAPS_TEXTURE == 0 {
            return Err(DdsDecodeErrors::InvalidHeader("DDSCAPS_TEXTURE not set"));
        }

        if header.mip_map_count == 0 {
            if self.options.strict_mode() {
                return Err(DdsDecodeErrors::InvalidHeader("mip count is zero"));
            }
            warn!("Dds image mipmap count is 0. Setting to 1.");
            header.mip_map_count = 1;
        }
        if header.mip_map_count as usize > MAX_MIP_COUNT {
            return Err(DdsDecodeErrors::InvalidHeader("mip count out of range"));
        }

        let is_cubemap = header.caps2 & DDSCAPS2_CUBEMAP != 0;
        if is_cubemap && header.caps2 & DDS_CUBEMAP_ALLFACES != DDS_CUBEMAP_ALLFACES {
            return Err(DdsDecodeErrors::UnsupportedLayout("partial cubemap"));
        }

        if header.width == 0 || header.height == 0 {
            return Err(DdsDecodeErrors::InvalidHeader("zero image dimension"));
        }
        if header.width as usize > self.options.max_width() {
            return Err(DdsDecodeErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                header.width as usize
            ));
        }
        if header.height as usize > self.options.max_height() {
            return Err(DdsDecodeErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                header.height as usize
            ));
        }

        let mut format = TextureFormat::Unknown;
        if let Some(dx10) = dx10 {
            // An unmapped DXGI code falls through to the bytes-per-pixel
            // guess below; phantom DX10 headers carry pixel garbage here,
            // so the layout fields are only trusted once the code maps.
            if let Some((_, found)) = TRANSLATE_DXGI_FORMAT
                .iter()
                .find(|(code, _)| *code == dx10.dxgi_format)
            {
                if dx10.resource_dimension != DDS_DIMENSION_TEXTURE2D {
                    return Err(DdsDecodeErrors::UnsupportedLayout("not a 2D resource"));
                }
                if dx10.array_size > 1 {
                    return Err(DdsDecodeErrors::UnsupportedLayout("texture arrays"));
                }
                format = *found;
            }
        } else {
            // block-compressed data is recognized only to be rejected
            if header.pixel_format.flags & DDPF_FOURCC != 0 {
                let compressed = [DDS_DXT1, DDS_DXT2, DDS_DXT3, DDS_DXT4, DDS_DXT5];
                if compressed.contains(&header.pixel_format.fourcc) {
                    warn!("Dds file holds block-compressed data, which is not supported.");
                    return Err(DdsDecodeErrors::UnsupportedPixelFormat);
                }
            }

            // first fold the bit count into a flag, then match either the
            // fourcc or the flags|bit-count combination
            let bc_flag = TRANSLATE_BIT_COUNT
                .iter()
                .find(|(bits, _)| *bits == header.pixel_format.rgb_bit_count)
                .map_or(0, |(_, flag)| *flag);

            let dds_format = if header.pixel_format.flags & DDPF_FOURCC != 0 {
                header.pixel_format.fourcc
            } else {
                header.pixel_format.flags | bc_flag
            };

            if let Some((_, found)) = TRANSLATE_DDS_FORMAT
                .iter()
                .find(|(code, _)| *code == dds_format)
            {
                format = *found;
            }
        }

        if format == TextureFormat::Unknown {
            // last resort: pick the first allowed DDS format whose pixel
            // size matches the declared bit count
            let bytes_per_pixel = header.pixel_format.rgb_bit_count as usize / 8;
            for candidate in ImageFileType::DDS.allowed_formats() {
                if candidate.bytes_per_pixel() == bytes_per_pixel {
                    format = *candidate;
                    break;
                }
            }

            if format == TextureFormat::Unknown {
                return Err(DdsDecodeErrors::UnsupportedPixelFormat);
            }
            warn!(
                "Dds data format unknown, guessing {} from a pixel size of {} bytes.",
                format.name(),
                bytes_per_pixel
            );
        }

        trace!("Width: {}", header.width);
        trace!("Height: {}", header.height);
        trace!("Mips: {}", header.mip_map_count);
        trace!("Format: {}", format.name());

        self.format = format;
        self.width = header.width;
        self.height = header.height;
        self.num_mips = header.mip_map_count as u8;
        self.num_faces = if is_cubemap { 6 } else { 1 };
        self.has_dx10_header = has_dx10;
        self.decoded_headers = true;

        Ok(())
    }

    /// Decode the file into an image
    pub fn decode(&mut self) -> Result<Image, DdsDecodeErrors> {
        self.decode_headers()?;

        let data_size =
            image::byte_size(self.width, self.height, self.format, self.num_mips, self.num_faces);

        // Some encoders flag a DX10 header without writing one, leaving
        // the first 20 pixel bytes consumed as a bogus header. Sizing the
        // remaining data detects this, and the bytes are handed back.
        if self.has_dx10_header
            && self.stream.remaining() + DDS_DX10_HEADER_SIZE == data_size
        {
            warn!("Dds file flags a DX10 header it never wrote, rewinding.");
            self.stream.rewind(DDS_DX10_HEADER_SIZE)?;
        }

        let mut data = vec![0_u8; data_size];
        self.stream.read_exact(&mut data)?;

        Image::from_parts(data, self.width, self.height, self.format, self.num_mips, self.num_faces)
            .map_err(DdsDecodeErrors::Generic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envmap_core::bytestream::ByteWriter;

    fn write_file(header: &DdsHeader, dx10: Option<&DdsHeaderDx10>, data: &[u8]) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        writer.write_u32_le(DDS_MAGIC);
        header.write(&mut writer);
        if let Some(dx10) = dx10 {
            dx10.write(&mut writer);
        }
        writer.write_all(data);
        writer.into_inner()
    }

    fn bgra_header(width: u32, height: u32) -> DdsHeader {
        DdsHeader {
            size: DDS_HEADER_SIZE as u32,
            flags: DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_PITCH,
            width,
            height,
            pitch_or_linear_size: width * 4,
            mip_map_count: 1,
            pixel_format: dds_pixel_format(TextureFormat::BGRA8),
            caps: DDSCAPS_TEXTURE,
            ..DdsHeader::default()
        }
    }

    #[test]
    fn decodes_legacy_bgra() {
        let pixels: Vec<u8> = (0..2 * 2 * 4).map(|i| i as u8).collect();
        let file = write_file(&bgra_header(2, 2), None, &pixels);

        let image = DdsDecoder::new(&file).decode().unwrap();
        assert_eq!(image.format(), TextureFormat::BGRA8);
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.data(), pixels.as_slice());
    }

    #[test]
    fn zero_mip_count_is_coerced() {
        let mut header = bgra_header(1, 1);
        header.mip_map_count = 0;
        let file = write_file(&header, None, &[1, 2, 3, 4]);

        let image = DdsDecoder::new(&file).decode().unwrap();
        assert_eq!(image.num_mips(), 1);
    }

    #[test]
    fn partial_cubemap_is_rejected() {
        let mut header = bgra_header(1, 1);
        header.caps2 = DDSCAPS2_CUBEMAP | 0x400; // only +x present
        let file = write_file(&header, None, &[0; 4]);

        assert!(matches!(
            DdsDecoder::new(&file).decode(),
            Err(DdsDecodeErrors::UnsupportedLayout("partial cubemap"))
        ));
    }

    #[test]
    fn block_compressed_data_is_rejected() {
        let mut header = bgra_header(4, 4);
        header.pixel_format = DdsPixelFormat {
            size: DDS_PIXELFORMAT_SIZE,
            flags: DDPF_FOURCC,
            fourcc: DDS_DXT5,
            rgb_bit_count: 0,
            ..DdsPixelFormat::default()
        };
        let file = write_file(&header, None, &[0; 16]);

        assert!(matches!(
            DdsDecoder::new(&file).decode(),
            Err(DdsDecodeErrors::UnsupportedPixelFormat)
        ));
    }

    #[test]
    fn guesses_format_from_pixel_size() {
        let mut header = bgra_header(1, 1);
        // plausible masks but no known fourcc/flag combination
        header.pixel_format.flags = DDPF_RGB;
        header.pixel_format.rgb_bit_count = 32;
        let file = write_file(&header, None, &[9, 9, 9, 9]);

        let image = DdsDecoder::new(&file).decode().unwrap();
        // first 4-byte entry in the DDS allowed list
        assert_eq!(image.format(), TextureFormat::BGRA8);
    }

    #[test]
    fn dx10_arrays_are_rejected() {
        let header = DdsHeader {
            size: DDS_HEADER_SIZE as u32,
            flags: DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_PITCH,
            width: 1,
            height: 1,
            pitch_or_linear_size: 16,
            mip_map_count: 1,
            pixel_format: dds_pixel_format(TextureFormat::RGBA32F),
            caps: DDSCAPS_TEXTURE,
            ..DdsHeader::default()
        };
        let dx10 = DdsHeaderDx10 {
            dxgi_format: DXGI_FORMAT_R32G32B32A32_FLOAT,
            resource_dimension: DDS_DIMENSION_TEXTURE2D,
            array_size: 4,
            ..DdsHeaderDx10::default()
        };
        let file = write_file(&header, Some(&dx10), &[0; 16]);

        assert!(matches!(
            DdsDecoder::new(&file).decode(),
            Err(DdsDecodeErrors::UnsupportedLayout("texture arrays"))
        ));
    }

    #[test]
    fn phantom_dx10_header_is_rewound() {
        // 3x2 RGBA32F flat image: header claims DX10 but the pixel data
        // starts immediately after the legacy header
        let pixels: Vec<u8> = (0..3 * 2 * 16).map(|i| (i * 3) as u8).collect();

        let header = DdsHeader {
            size: DDS_HEADER_SIZE as u32,
            flags: DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_PITCH,
            width: 3,
            height: 2,
            pitch_or_linear_size: 3 * 16,
            mip_map_count: 1,
            pixel_format: dds_pixel_format(TextureFormat::RGBA32F),
            caps: DDSCAPS_TEXTURE,
            ..DdsHeader::default()
        };

        // the first 20 pixel bytes will be mistaken for the DX10 header;
        // craft them to carry a supported DXGI code and a 2D dimension so
        // header validation survives until the size check
        let mut bogus = pixels.clone();
        bogus[0..4].copy_from_slice(&DXGI_FORMAT_R32G32B32A32_FLOAT.to_le_bytes());
        bogus[4..8].copy_from_slice(&DDS_DIMENSION_TEXTURE2D.to_le_bytes());
        bogus[8..12].copy_from_slice(&0_u32.to_le_bytes());
        bogus[12..16].copy_from_slice(&1_u32.to_le_bytes());

        let file = write_file(&header, None, &bogus);
        let image = DdsDecoder::new(&file).decode().unwrap();

        assert_eq!(image.data(), bogus.as_slice());
    }
}
