/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A Radiance HDR decoder and encoder
//!
//! Reads `.hdr` files into an [`Image`](envmap_core::image::Image) in the
//! `RGBE` texture format, preserving the shared-exponent bytes exactly as
//! stored; nothing is expanded to float during decoding.
//!
//! # Supported
//! - Adaptive run-length encoded scanlines and flat RGBE streams
//! - Header metadata (`KEY=VALUE` lines), kept in a map and queryable
//!   after `decode_headers`, with `GAMMA` and `EXPOSURE` parsed
//!
//! # Not supported
//! - The legacy per-component RLE of very old Radiance writers
//! - Orientations other than `-Y <height> +X <width>`
//! - RLE on the write path; the encoder always emits flat scanlines

#![forbid(unsafe_code)]

pub use decoder::HdrDecoder;
pub use encoder::HdrEncoder;
pub use errors::{HdrDecodeErrors, HdrEncodeErrors};

mod decoder;
mod encoder;
mod errors;
