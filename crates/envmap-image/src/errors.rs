/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The umbrella error type joining every codec's errors with the
//! transform and dispatch errors of this crate

use std::fmt::{Debug, Display, Formatter};

use envmap_core::format::{ImageFileType, TextureFormat};

/// All errors the image engine can produce
pub enum ImageErrors {
    /// An underlying file I/O error
    IoErrors(std::io::Error),
    /// The magic bytes match no supported container
    UnknownFileType,
    /// An operation met a texture format it cannot process
    UnknownFormat,
    /// The image shape does not fit the requested layout operation
    UnsupportedLayout(&'static str),
    /// The texture format may not be stored in the requested file type
    FormatNotAllowed {
        file_type: ImageFileType,
        format:    TextureFormat
    },
    /// Generic message
    Generic(&'static str),
    /// DDS decoding failed
    DdsDecodeErrors(envmap_dds::DdsDecodeErrors),
    /// DDS encoding failed
    DdsEncodeErrors(envmap_dds::DdsEncodeErrors),
    /// KTX decoding failed
    KtxDecodeErrors(envmap_ktx::KtxDecodeErrors),
    /// KTX encoding failed
    KtxEncodeErrors(envmap_ktx::KtxEncodeErrors),
    /// TGA decoding failed
    TgaDecodeErrors(envmap_tga::TgaDecodeErrors),
    /// TGA encoding failed
    TgaEncodeErrors(envmap_tga::TgaEncodeErrors),
    /// HDR decoding failed
    HdrDecodeErrors(envmap_hdr::HdrDecodeErrors),
    /// HDR encoding failed
    HdrEncodeErrors(envmap_hdr::HdrEncodeErrors)
}

impl Debug for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageErrors::IoErrors(err) => {
                writeln!(f, "I/O error: {err}")
            }
            ImageErrors::UnknownFileType => {
                writeln!(f, "Unknown file type, magic bytes match no supported container")
            }
            ImageErrors::UnknownFormat => {
                writeln!(f, "Cannot operate on an unknown texture format")
            }
            ImageErrors::UnsupportedLayout(err) => {
                writeln!(f, "Unsupported layout: {err}")
            }
            ImageErrors::FormatNotAllowed { file_type, format } => {
                write!(
                    f,
                    "Could not save {} as a *{} image. Valid internal formats are:",
                    format.name(),
                    file_type.extension()
                )?;
                for allowed in file_type.allowed_formats() {
                    write!(f, " {}", allowed.name())?;
                }
                writeln!(
                    f,
                    ". Choose one of the valid internal formats or a different file type."
                )
            }
            ImageErrors::Generic(err) => {
                writeln!(f, "{err}")
            }
            ImageErrors::DdsDecodeErrors(err) => {
                writeln!(f, "Dds decoding failed: {err:?}")
            }
            ImageErrors::DdsEncodeErrors(err) => {
                writeln!(f, "Dds encoding failed: {err:?}")
            }
            ImageErrors::KtxDecodeErrors(err) => {
                writeln!(f, "Ktx decoding failed: {err:?}")
            }
            ImageErrors::KtxEncodeErrors(err) => {
                writeln!(f, "Ktx encoding failed: {err:?}")
            }
            ImageErrors::TgaDecodeErrors(err) => {
                writeln!(f, "Tga decoding failed: {err:?}")
            }
            ImageErrors::TgaEncodeErrors(err) => {
                writeln!(f, "Tga encoding failed: {err:?}")
            }
            ImageErrors::HdrDecodeErrors(err) => {
                writeln!(f, "Hdr decoding failed: {err:?}")
            }
            ImageErrors::HdrEncodeErrors(err) => {
                writeln!(f, "Hdr encoding failed: {err:?}")
            }
        }
    }
}

impl Display for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for ImageErrors {}

impl From<std::io::Error> for ImageErrors {
    fn from(value: std::io::Error) -> Self {
        ImageErrors::IoErrors(value)
    }
}

impl From<&'static str> for ImageErrors {
    fn from(value: &'static str) -> Self {
        ImageErrors::Generic(value)
    }
}

impl From<envmap_dds::DdsDecodeErrors> for ImageErrors {
    fn from(value: envmap_dds::DdsDecodeErrors) -> Self {
        ImageErrors::DdsDecodeErrors(value)
    }
}

impl From<envmap_dds::DdsEncodeErrors> for ImageErrors {
    fn from(value: envmap_dds::DdsEncodeErrors) -> Self {
        ImageErrors::DdsEncodeErrors(value)
    }
}

impl From<envmap_ktx::KtxDecodeErrors> for ImageErrors {
    fn from(value: envmap_ktx::KtxDecodeErrors) -> Self {
        ImageErrors::KtxDecodeErrors(value)
    }
}

impl From<envmap_ktx::KtxEncodeErrors> for ImageErrors {
    fn from(value: envmap_ktx::KtxEncodeErrors) -> Self {
        ImageErrors::KtxEncodeErrors(value)
    }
}

impl From<envmap_tga::TgaDecodeErrors> for ImageErrors {
    fn from(value: envmap_tga::TgaDecodeErrors) -> Self {
        ImageErrors::TgaDecodeErrors(value)
    }
}

impl From<envmap_tga::TgaEncodeErrors> for ImageErrors {
    fn from(value: envmap_tga::TgaEncodeErrors) -> Self {
        ImageErrors::TgaEncodeErrors(value)
    }
}

impl From<envmap_hdr::HdrDecodeErrors> for ImageErrors {
    fn from(value: envmap_hdr::HdrDecodeErrors) -> Self {
        ImageErrors::HdrDecodeErrors(value)
    }
}

impl From<envmap_hdr::HdrEncodeErrors> for ImageErrors {
    fn from(value: envmap_hdr::HdrEncodeErrors) -> Self {
        ImageErrors::HdrEncodeErrors(value)
    }
}
