// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Error handling. */

use thiserror::Error;

/// Reasons a line in a packages index is rejected.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum EntryLineError {
    #[error("invalid line: missing space separator")]
    MissingSeparator,

    #[error("invalid line: no package")]
    NoPackage,

    #[error("invalid line: no dist")]
    NoDist,

    #[error("invalid line: invalid UTF-8")]
    InvalidUtf8,
}

/// Primary crate error type.
#[derive(Debug, Error)]
pub enum CpanIndexError {
    #[error("no data")]
    NoData,

    #[error("format error: {0}")]
    Format(String),

    #[error("unknown signer: no trusted key with id 0x{0}")]
    UnknownSigner(String),

    #[error("signature mismatch for key 0x{key_id}: {source:?}")]
    SignatureMismatch {
        key_id: String,
        source: pgp::errors::Error,
    },

    #[error("syntax error at byte {offset}: {reason}")]
    Syntax { offset: usize, reason: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {source}")]
    Stream { line: usize, source: EntryLineError },

    #[error("header declares {expected} lines; got {actual} entries")]
    LineCountMismatch { expected: usize, actual: usize },

    #[error("packages index stream ended without reporting completion")]
    StreamAbandoned,

    #[error("size mismatch: expected {expected}; got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("{algorithm} digest mismatch: expected {expected}; got {actual}")]
    DigestMismatch {
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    #[error("hex parsing error: {0:?}")]
    Hex(#[from] hex::FromHexError),

    #[error("PGP error: {0:?}")]
    Pgp(#[from] pgp::errors::Error),

    #[error("date parsing error: {0:?}")]
    DateParse(#[from] mailparse::MailParseError),

    #[error("integer parsing error: {0:?}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),
}

/// Result wrapper for this crate.
pub type Result<T> = std::result::Result<T, CpanIndexError>;
