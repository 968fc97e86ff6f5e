/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global decoder options shared by every format decoder in the workspace.

/// Tunables honoured by all decoders.
///
/// Use the `set_` builders to change a field, e.g.
/// ```
/// use pixl_core::DecoderOptions;
///
/// let options = DecoderOptions::default().set_confirm_checksums(false);
/// assert!(!options.get_confirm_checksums());
/// ```
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Maximum width a decoder accepts before bailing out.
    max_width:         usize,
    /// Maximum height a decoder accepts before bailing out.
    max_height:        usize,
    /// Whether to verify Adler-32 and CRC-32 checksums where present.
    confirm_checksums: bool,
    /// Treat recoverable oddities, e.g. trailing garbage, as hard errors.
    strict_mode:       bool
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_width:         1 << 17,
            max_height:        1 << 17,
            confirm_checksums: true,
            strict_mode:       false
        }
    }
}

impl DecoderOptions {
    pub const fn get_max_width(&self) -> usize {
        self.max_width
    }

    pub const fn get_max_height(&self) -> usize {
        self.max_height
    }

    pub const fn get_confirm_checksums(&self) -> bool {
        self.confirm_checksums
    }

    pub const fn get_strict_mode(&self) -> bool {
        self.strict_mode
    }

    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    pub fn set_confirm_checksums(mut self, yes: bool) -> Self {
        self.confirm_checksums = yes;
        self
    }

    pub fn set_strict_mode(mut self, yes: bool) -> Self {
        self.strict_mode = yes;
        self
    }
}
