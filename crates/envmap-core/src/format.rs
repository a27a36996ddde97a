/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Texture format registry
//!
//! Describes every texture format the library understands (bytes per pixel,
//! channel count, alpha presence, underlying pixel data kind) and which
//! texture formats each container file type is allowed to carry.
//!
//! The registry is pure data, it holds no state.

/// The underlying data kind of a single pixel channel
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PixelKind {
    /// Channels are unsigned bytes
    Uint8,
    /// Channels are little endian unsigned 16 bit integers
    Uint16,
    /// Channels are IEEE 754 binary16 floats
    HalfFloat,
    /// Channels are IEEE 754 binary32 floats
    Float
}

/// All texture formats understood by the library
///
/// The declaration order is fixed and observable, e.g. the DDS reader's
/// bytes-per-pixel fallback walks the DDS allowed list in this order.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum TextureFormat {
    /// Blue, Green, Red, 8 bits each
    BGR8,
    /// Red, Green, Blue, 8 bits each
    RGB8,
    /// Red, Green, Blue, 16 bits each
    RGB16,
    /// Red, Green, Blue, half floats
    RGB16F,
    /// Red, Green, Blue, full floats
    RGB32F,
    /// Shared exponent HDR encoding, three 8-bit mantissas + biased exponent
    RGBE,
    /// Blue, Green, Red, Alpha, 8 bits each
    BGRA8,
    /// Red, Green, Blue, Alpha, 8 bits each
    RGBA8,
    /// Red, Green, Blue, Alpha, 16 bits each
    RGBA16,
    /// Red, Green, Blue, Alpha, half floats
    RGBA16F,
    /// Red, Green, Blue, Alpha, full floats
    RGBA32F,
    /// The texture format is unknown
    Unknown
}

/// Per-format pixel layout description
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FormatInfo {
    /// Size of one packed pixel in bytes
    pub bytes_per_pixel: u8,
    /// Number of channels stored per pixel
    pub num_channels:    u8,
    /// True if one of the channels is alpha
    pub has_alpha:       bool,
    /// The data kind of each channel
    pub kind:            PixelKind
}

impl TextureFormat {
    /// Return the pixel layout description for this format
    #[rustfmt::skip]
    pub const fn info(self) -> FormatInfo {
        match self {
            Self::BGR8    => FormatInfo { bytes_per_pixel:  3, num_channels: 3, has_alpha: false, kind: PixelKind::Uint8     },
            Self::RGB8    => FormatInfo { bytes_per_pixel:  3, num_channels: 3, has_alpha: false, kind: PixelKind::Uint8     },
            Self::RGB16   => FormatInfo { bytes_per_pixel:  6, num_channels: 3, has_alpha: false, kind: PixelKind::Uint16    },
            Self::RGB16F  => FormatInfo { bytes_per_pixel:  6, num_channels: 3, has_alpha: false, kind: PixelKind::HalfFloat },
            Self::RGB32F  => FormatInfo { bytes_per_pixel: 12, num_channels: 3, has_alpha: false, kind: PixelKind::Float     },
            Self::RGBE    => FormatInfo { bytes_per_pixel:  4, num_channels: 4, has_alpha: false, kind: PixelKind::Uint8     },
            Self::BGRA8   => FormatInfo { bytes_per_pixel:  4, num_channels: 4, has_alpha: true,  kind: PixelKind::Uint8     },
            Self::RGBA8   => FormatInfo { bytes_per_pixel:  4, num_channels: 4, has_alpha: true,  kind: PixelKind::Uint8     },
            Self::RGBA16  => FormatInfo { bytes_per_pixel:  8, num_channels: 4, has_alpha: true,  kind: PixelKind::Uint16    },
            Self::RGBA16F => FormatInfo { bytes_per_pixel:  8, num_channels: 4, has_alpha: true,  kind: PixelKind::HalfFloat },
            Self::RGBA32F => FormatInfo { bytes_per_pixel: 16, num_channels: 4, has_alpha: true,  kind: PixelKind::Float     },
            Self::Unknown => FormatInfo { bytes_per_pixel:  0, num_channels: 0, has_alpha: false, kind: PixelKind::Uint8     }
        }
    }

    /// Size of one packed pixel in bytes
    pub const fn bytes_per_pixel(self) -> usize {
        self.info().bytes_per_pixel as usize
    }

    /// Number of channels stored per pixel
    pub const fn num_channels(self) -> usize {
        self.info().num_channels as usize
    }

    /// True if one of the channels is alpha
    pub const fn has_alpha(self) -> bool {
        self.info().has_alpha
    }

    /// The data kind of each channel
    pub const fn kind(self) -> PixelKind {
        self.info().kind
    }

    /// Human readable format name, used in messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::BGR8 => "BGR8",
            Self::RGB8 => "RGB8",
            Self::RGB16 => "RGB16",
            Self::RGB16F => "RGB16F",
            Self::RGB32F => "RGB32F",
            Self::RGBE => "RGBE",
            Self::BGRA8 => "BGRA8",
            Self::RGBA8 => "RGBA8",
            Self::RGBA16 => "RGBA16",
            Self::RGBA16F => "RGBA16F",
            Self::RGBA32F => "RGBA32F",
            Self::Unknown => "<unknown>"
        }
    }
}

static DDS_VALID_FORMATS: [TextureFormat; 5] = [
    TextureFormat::BGR8,
    TextureFormat::BGRA8,
    TextureFormat::RGBA16,
    TextureFormat::RGBA16F,
    TextureFormat::RGBA32F
];

static KTX_VALID_FORMATS: [TextureFormat; 8] = [
    TextureFormat::RGB8,
    TextureFormat::RGB16,
    TextureFormat::RGB16F,
    TextureFormat::RGB32F,
    TextureFormat::RGBA8,
    TextureFormat::RGBA16,
    TextureFormat::RGBA16F,
    TextureFormat::RGBA32F
];

static TGA_VALID_FORMATS: [TextureFormat; 2] = [TextureFormat::BGR8, TextureFormat::BGRA8];

static HDR_VALID_FORMATS: [TextureFormat; 1] = [TextureFormat::RGBE];

/// All container file types the library can read and write
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ImageFileType {
    /// DirectDraw Surface
    DDS,
    /// Khronos texture container
    KTX,
    /// Truevision Targa
    TGA,
    /// Radiance RGBE
    HDR
}

impl ImageFileType {
    /// The filename extension appended when saving, dot included
    pub const fn extension(self) -> &'static str {
        match self {
            Self::DDS => ".dds",
            Self::KTX => ".ktx",
            Self::TGA => ".tga",
            Self::HDR => ".hdr"
        }
    }

    /// Human readable file type name, used in messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::DDS => "DDS",
            Self::KTX => "KTX",
            Self::TGA => "TGA",
            Self::HDR => "HDR"
        }
    }

    /// Texture formats this file type is allowed to carry
    ///
    /// The order is fixed; fallback heuristics that walk this list
    /// take the first match.
    pub fn allowed_formats(self) -> &'static [TextureFormat] {
        match self {
            Self::DDS => &DDS_VALID_FORMATS,
            Self::KTX => &KTX_VALID_FORMATS,
            Self::TGA => &TGA_VALID_FORMATS,
            Self::HDR => &HDR_VALID_FORMATS
        }
    }

    /// Return true if `format` may be stored in this file type
    pub fn is_format_allowed(self, format: TextureFormat) -> bool {
        self.allowed_formats().contains(&format)
    }
}
