/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! An environment-map image engine
//!
//! This crate ties the envmap codecs and primitives into one surface for
//! tools that bake environment lighting: load a map from disk in any of
//! the supported containers, reshape it between cubemap layouts, build
//! mip chains, and save it back out.
//!
//! # What lives here
//! - whole-image format conversion through a canonical linear RGBA32F
//!   intermediate ([`convert`])
//! - resizing, mip-chain generation, gamma and clamp ([`resize`],
//!   [`mipmap`], [`gamma`])
//! - cubemap layout transforms: cross, latitude-longitude, horizontal
//!   strip and face lists ([`cubemap`])
//! - the load/save dispatcher that sniffs magic bytes and routes to the
//!   right codec ([`codecs`])
//!
//! # Example
//!
//! ```no_run
//! use envmap_image::codecs;
//! use envmap_image::cubemap;
//! use envmap_image::{ImageFileType, TextureFormat};
//!
//! # fn main() -> Result<(), envmap_image::errors::ImageErrors> {
//! // load an equirectangular .hdr and reshape it into a cubemap
//! let latlong = codecs::load("probe.hdr", Some(TextureFormat::RGBA32F))?;
//! let cube = cubemap::cubemap_from_latlong(&latlong, true)?;
//! codecs::save(&cube, "probe", ImageFileType::KTX, Some(TextureFormat::RGBA16F))?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub extern crate envmap_core;

pub mod codecs;
pub mod convert;
pub mod cubemap;
pub mod cubemap_utils;
pub mod errors;
pub mod gamma;
pub mod mipmap;
pub mod resize;

pub use envmap_core::format::{ImageFileType, TextureFormat};
pub use envmap_core::image::Image;
pub use envmap_core::options::DecoderOptions;
pub use envmap_core::transform;
