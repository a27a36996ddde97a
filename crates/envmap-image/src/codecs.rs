/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The load/save dispatcher
//!
//! Loading reads the file into memory, sniffs the first four bytes and
//! routes to the matching codec; saving verifies the registry's allowed
//! format list, encodes in memory and writes the file with the file
//! type's extension appended.

use std::path::{Path, PathBuf};

use envmap_core::format::{ImageFileType, TextureFormat};
use envmap_core::image::Image;
use envmap_core::options::DecoderOptions;
use envmap_dds::{DdsDecoder, DdsEncoder};
use envmap_hdr::{HdrDecoder, HdrEncoder};
use envmap_ktx::{KtxDecoder, KtxEncoder};
use envmap_tga::{TgaDecoder, TgaEncoder};
use log::trace;

use crate::convert::{convert_in_place, ref_or_convert};
use crate::errors::ImageErrors;

const DDS_MAGIC: u32 = u32::from_le_bytes(*b"DDS ");
const KTX_MAGIC_SHORT: u32 = u32::from_le_bytes([0xAB, 0x4B, 0x54, 0x58]);
const HDR_MAGIC: u32 = u32::from_le_bytes(*b"#?RA");

/// TGA has no magic; probe the color-map-type and image-type bytes for a
/// consistent pair
const fn is_tga(magic: u32) -> bool {
    let color_map_type = ((magic >> 8) & 0xFF) as u8;
    let image_type = ((magic >> 16) & 0xFF) as u8;

    match image_type {
        1 | 9 => color_map_type == 1,
        2 | 3 | 10 | 11 => color_map_type == 0,
        _ => false
    }
}

/// Guess the container format from the first bytes of a file
pub fn guess_file_type(data: &[u8]) -> Option<ImageFileType> {
    if data.len() < 4 {
        return None;
    }
    let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);

    if magic == DDS_MAGIC {
        Some(ImageFileType::DDS)
    } else if magic == KTX_MAGIC_SHORT {
        Some(ImageFileType::KTX)
    } else if magic == HDR_MAGIC {
        Some(ImageFileType::HDR)
    } else if is_tga(magic) {
        Some(ImageFileType::TGA)
    } else {
        None
    }
}

/// Decode an in-memory file, sniffing its container format
pub fn decode_memory(data: &[u8], options: DecoderOptions) -> Result<Image, ImageErrors> {
    let file_type = guess_file_type(data).ok_or(ImageErrors::UnknownFileType)?;
    trace!("Detected file type: {}", file_type.name());

    let image = match file_type {
        ImageFileType::DDS => DdsDecoder::new_with_options(data, options).decode()?,
        ImageFileType::KTX => KtxDecoder::new_with_options(data, options).decode()?,
        ImageFileType::TGA => TgaDecoder::new_with_options(data, options).decode()?,
        ImageFileType::HDR => HdrDecoder::new_with_options(data, options).decode()?
    };

    Ok(image)
}

/// Load an image from a file, optionally converting the result
///
/// The container format is sniffed from the file's magic bytes, the
/// extension plays no part.
pub fn load<P: AsRef<Path>>(
    path: P, convert_to: Option<TextureFormat>
) -> Result<Image, ImageErrors> {
    load_with_options(path, convert_to, DecoderOptions::default())
}

/// Load an image from a file with custom decoder options
pub fn load_with_options<P: AsRef<Path>>(
    path: P, convert_to: Option<TextureFormat>, options: DecoderOptions
) -> Result<Image, ImageErrors> {
    let data = std::fs::read(path)?;
    let mut image = decode_memory(&data, options)?;

    if let Some(format) = convert_to {
        if format != TextureFormat::Unknown {
            convert_in_place(&mut image, format)?;
        }
    }

    Ok(image)
}

/// Save an image, appending the file type's extension to `path_stem`
///
/// The image is optionally converted first; if the resulting format is
/// not in the file type's allowed list the save fails and the error
/// names the permitted formats. Returns the path actually written.
pub fn save<P: AsRef<Path>>(
    image: &Image, path_stem: P, file_type: ImageFileType, convert_to: Option<TextureFormat>
) -> Result<PathBuf, ImageErrors> {
    let image = match convert_to {
        Some(format) if format != TextureFormat::Unknown => ref_or_convert(image, format)?,
        _ => std::borrow::Cow::Borrowed(image)
    };

    if !file_type.is_format_allowed(image.format()) {
        return Err(ImageErrors::FormatNotAllowed { file_type, format: image.format() });
    }

    let bytes = match file_type {
        ImageFileType::DDS => DdsEncoder::new(&image).encode()?,
        ImageFileType::KTX => KtxEncoder::new(&image).encode()?,
        ImageFileType::TGA => TgaEncoder::new(&image).encode()?,
        ImageFileType::HDR => HdrEncoder::new(&image).encode()?
    };

    let mut path = path_stem.as_ref().as_os_str().to_owned();
    path.push(file_type.extension());
    let path = PathBuf::from(path);

    std::fs::write(&path, bytes)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(guess_file_type(b"DDS \0\0\0\0"), Some(ImageFileType::DDS));
        assert_eq!(
            guess_file_type(&[0xAB, 0x4B, 0x54, 0x58, 0x20]),
            Some(ImageFileType::KTX)
        );
        assert_eq!(guess_file_type(b"#?RADIANCE\n"), Some(ImageFileType::HDR));
        assert_eq!(guess_file_type(b"PNG!"), None);
        assert_eq!(guess_file_type(b"DD"), None);
    }

    #[test]
    fn tga_heuristic() {
        // id length 0, no color map, true-color
        assert_eq!(guess_file_type(&[0, 0, 2, 0]), Some(ImageFileType::TGA));
        // RLE true-color
        assert_eq!(guess_file_type(&[0, 0, 10, 0]), Some(ImageFileType::TGA));
        // color-mapped types must carry a color map
        assert_eq!(guess_file_type(&[0, 1, 1, 0]), Some(ImageFileType::TGA));
        assert_eq!(guess_file_type(&[0, 0, 1, 0]), None);
        assert_eq!(guess_file_type(&[0, 1, 2, 0]), None);
    }

    #[test]
    fn save_rejects_disallowed_formats() {
        let image = Image::from_parts(vec![0; 4], 1, 1, TextureFormat::RGBA8, 1, 1).unwrap();
        let result = save(&image, "/nonexistent/stem", ImageFileType::DDS, None);

        match result {
            Err(ImageErrors::FormatNotAllowed { file_type, format }) => {
                assert_eq!(file_type, ImageFileType::DDS);
                assert_eq!(format, TextureFormat::RGBA8);
            }
            _ => panic!("expected FormatNotAllowed")
        }
    }
}
