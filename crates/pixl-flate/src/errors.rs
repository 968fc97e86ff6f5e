/*
 * Copyright (c) 2026.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Display, Formatter};

/// Errors that may arise when decompressing a DEFLATE or zlib stream.
pub enum InflateDecodeErrors {
    /// The stream violates the format, with a short reason.
    CorruptData(&'static str),
    /// The zlib header is malformed or advertises an unsupported mode.
    BadZlibHeader(&'static str),
    /// Stored Adler-32 checksum does not match the decoded output.
    /// Contains expected and found values.
    MismatchedAdler(u32, u32),
    /// Output would exceed the configured limit.
    /// Contains the limit and the size that was reached.
    OutputLimitExceeded(usize, usize),
    /// The input ended before the stream was complete.
    InsufficientData
}

impl Debug for InflateDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CorruptData(reason) => writeln!(f, "corrupt deflate stream: {reason}"),
            Self::BadZlibHeader(reason) => writeln!(f, "bad zlib header: {reason}"),
            Self::MismatchedAdler(expected, found) => {
                writeln!(
                    f,
                    "mismatched adler checksum, expected {expected:08X} found {found:08X}"
                )
            }
            Self::OutputLimitExceeded(limit, reached) => {
                writeln!(
                    f,
                    "output limit exceeded, limit is {limit} but reached {reached}"
                )
            }
            Self::InsufficientData => writeln!(f, "insufficient data to complete the stream")
        }
    }
}

impl Display for InflateDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for InflateDecodeErrors {}

impl From<&'static str> for InflateDecodeErrors {
    fn from(reason: &'static str) -> Self {
        InflateDecodeErrors::CorruptData(reason)
    }
}
