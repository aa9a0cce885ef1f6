//! Error types for gandalf
//!
//! This module defines all error types used throughout the crate.

use std::net::Ipv4Addr;
use thiserror::Error;

/// Result type alias for gandalf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gandalf
#[derive(Error, Debug)]
pub enum Error {
    /// A field of an inventory row failed validation
    #[error("invalid value {value:?} in column '{column}' at row {row}")]
    Integrity {
        /// Row number in the inventory (the header is row 1)
        row: usize,
        /// Normalized column name
        column: String,
        /// Offending value, trimmed
        value: String,
    },

    /// The inventory has no column the records cannot do without
    #[error("inventory is missing required column '{0}'")]
    MissingColumn(String),

    /// Structural CSV errors (quoting, unequal row lengths, encoding)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization errors (variables file, artifact specs)
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A caller passed an argument outside the accepted set
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Several hosts share an address where uniqueness is required
    #[error("address {ip} is shared by hosts: {}", hostnames.join(", "))]
    Conflict {
        /// The duplicated address
        ip: Ipv4Addr,
        /// Every hostname carrying that address, in input order
        hostnames: Vec<String>,
    },

    /// A record lacks a field the renderer needs
    #[error("host '{hostname}' has no {field}")]
    MissingField {
        /// Hostname of the incomplete record
        hostname: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// Artifact spec errors
    #[error("Artifact error: {0}")]
    Artifact(String),
}

impl Error {
    /// Create an integrity error
    pub fn integrity(row: usize, column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Integrity {
            row,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a missing field error
    pub fn missing_field(hostname: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            hostname: hostname.into(),
            field,
        }
    }

    /// Create an artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Whether the error is an inventory integrity violation
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }
}
