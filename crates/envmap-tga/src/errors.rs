/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Display, Formatter};

use envmap_core::bytestream::ByteIoError;
use envmap_core::format::TextureFormat;

/// TGA decoding errors
pub enum TgaDecodeErrors {
    /// The file is not a true-color image (types 2 and 10)
    NotTrueColor(u8),
    /// Only 24 and 32 bits per pixel are supported
    UnsupportedBitDepth(u8),
    /// Too large dimensions for a given dimension
    TooLargeDimensions(&'static str, usize, usize),
    /// A dimension field is zero
    InvalidHeader(&'static str),
    /// Generic message
    Generic(&'static str),
    /// An I/O error from the underlying bytestream
    IoErrors(ByteIoError)
}

impl Debug for TgaDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TgaDecodeErrors::NotTrueColor(image_type) => {
                writeln!(
                    f,
                    "Tga file is not a true-color image, found image type {image_type}"
                )
            }
            TgaDecodeErrors::UnsupportedBitDepth(depth) => {
                writeln!(f, "Non-supported Tga pixel depth {depth}, expected 24 or 32")
            }
            TgaDecodeErrors::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds {expected}"
                )
            }
            TgaDecodeErrors::InvalidHeader(err) => {
                writeln!(f, "Invalid Tga header: {err}")
            }
            TgaDecodeErrors::Generic(err) => {
                writeln!(f, "{err}")
            }
            TgaDecodeErrors::IoErrors(err) => {
                writeln!(f, "{err:?}")
            }
        }
    }
}

impl Display for TgaDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for TgaDecodeErrors {}

impl From<ByteIoError> for TgaDecodeErrors {
    fn from(value: ByteIoError) -> Self {
        TgaDecodeErrors::IoErrors(value)
    }
}

impl From<&'static str> for TgaDecodeErrors {
    fn from(value: &'static str) -> Self {
        TgaDecodeErrors::Generic(value)
    }
}

/// TGA encoding errors
pub enum TgaEncodeErrors {
    /// The image format cannot be stored in a TGA file
    UnsupportedTextureFormat(TextureFormat),
    /// A dimension does not fit the header's 16-bit fields
    TooLargeDimensions(usize)
}

impl Debug for TgaEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TgaEncodeErrors::UnsupportedTextureFormat(format) => {
                writeln!(
                    f,
                    "Unsupported texture format {} for Tga, valid formats are BGR8 and BGRA8",
                    format.name()
                )
            }
            TgaEncodeErrors::TooLargeDimensions(found) => {
                writeln!(
                    f,
                    "Dimension {found} does not fit the Tga header's 16-bit size fields"
                )
            }
        }
    }
}

impl Display for TgaEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for TgaEncodeErrors {}
