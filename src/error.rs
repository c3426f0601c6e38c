use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for litsprite operations
#[derive(Error, Diagnostic, Debug)]
pub enum LitError {
    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(litsprite::io))]
    Io { path: PathBuf, message: String },

    #[error("Cannot decode {path}: {message}")]
    #[diagnostic(
        code(litsprite::decode),
        help("Unsupported or incorrect format. Supported formats: png, jpg, bmp, tga")
    )]
    Decode { path: PathBuf, message: String },

    #[error("{path} is {found_width}x{found_height}, expected {expected_width}x{expected_height}")]
    #[diagnostic(
        code(litsprite::dimensions),
        help("All frames and override maps of a sprite must share the same size")
    )]
    DimensionMismatch {
        path: PathBuf,
        expected_width: u32,
        expected_height: u32,
        found_width: u32,
        found_height: u32,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(litsprite::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(litsprite::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Watch error: {message}")]
    #[diagnostic(code(litsprite::watch))]
    Watch { message: String },

    #[error("Invalid argument: {message}")]
    #[diagnostic(code(litsprite::argument))]
    InvalidArgument {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl LitError {
    /// Build a dimension-mismatch error for `path`.
    pub fn dimension_mismatch(path: impl Into<PathBuf>, expected: (u32, u32), found: (u32, u32)) -> Self {
        LitError::DimensionMismatch {
            path: path.into(),
            expected_width: expected.0,
            expected_height: expected.1,
            found_width: found.0,
            found_height: found.1,
        }
    }
}

pub type Result<T> = std::result::Result<T, LitError>;
