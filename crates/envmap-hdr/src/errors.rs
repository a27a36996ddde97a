/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fmt::{Debug, Display, Formatter};
use std::num::ParseIntError;

use envmap_core::bytestream::ByteIoError;
use envmap_core::format::TextureFormat;

/// HDR decoding errors
pub enum HdrDecodeErrors {
    /// Magic bytes do not start with `#?RADIANCE` or `#?RGBE`
    InvalidMagicBytes,
    /// The decoder could not convert a dimension string to an integer
    ParseError(ParseIntError),
    /// The dimension line uses an orientation other than `-Y <h> +X <w>`
    UnsupportedOrientation(String),
    /// A run-length encoded scanline is malformed
    InvalidScanline(&'static str),
    /// Too large dimensions for a given dimension
    TooLargeDimensions(&'static str, usize, usize),
    /// The header is missing a required field
    InvalidHeader(&'static str),
    /// Generic message
    Generic(&'static str),
    /// An I/O error from the underlying bytestream
    IoErrors(ByteIoError)
}

impl Debug for HdrDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HdrDecodeErrors::InvalidMagicBytes => {
                writeln!(
                    f,
                    "Invalid magic bytes, file does not start with #?RADIANCE or #?RGBE"
                )
            }
            HdrDecodeErrors::ParseError(err) => {
                writeln!(f, "Could not parse image dimensions: {err:?}")
            }
            HdrDecodeErrors::UnsupportedOrientation(line) => {
                writeln!(f, "Unsupported image orientation {line:?}, expected -Y <h> +X <w>")
            }
            HdrDecodeErrors::InvalidScanline(err) => {
                writeln!(f, "Invalid RLE scanline: {err}")
            }
            HdrDecodeErrors::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds {expected}"
                )
            }
            HdrDecodeErrors::InvalidHeader(err) => {
                writeln!(f, "Invalid HDR header: {err}")
            }
            HdrDecodeErrors::Generic(err) => {
                writeln!(f, "{err}")
            }
            HdrDecodeErrors::IoErrors(err) => {
                writeln!(f, "{err:?}")
            }
        }
    }
}

impl Display for HdrDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for HdrDecodeErrors {}

impl From<ParseIntError> for HdrDecodeErrors {
    fn from(value: ParseIntError) -> Self {
        HdrDecodeErrors::ParseError(value)
    }
}

impl From<ByteIoError> for HdrDecodeErrors {
    fn from(value: ByteIoError) -> Self {
        HdrDecodeErrors::IoErrors(value)
    }
}

impl From<&'static str> for HdrDecodeErrors {
    fn from(value: &'static str) -> Self {
        HdrDecodeErrors::Generic(value)
    }
}

/// HDR encoding errors
pub enum HdrEncodeErrors {
    /// The image is not in the RGBE texture format
    UnsupportedTextureFormat(TextureFormat),
    /// The image dimensions do not fit the format's dimension line
    TooLargeDimensions(usize)
}

impl Debug for HdrEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HdrEncodeErrors::UnsupportedTextureFormat(format) => {
                writeln!(
                    f,
                    "Unsupported texture format {} for Radiance, HDR files only store RGBE data",
                    format.name()
                )
            }
            HdrEncodeErrors::TooLargeDimensions(found) => {
                writeln!(f, "Dimension {found} does not fit a Radiance dimension line")
            }
        }
    }
}

impl Display for HdrEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for HdrEncodeErrors {}
