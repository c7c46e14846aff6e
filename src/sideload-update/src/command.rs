//! Administrative command surface.
//!
//! One authenticated action: "update this extension now". The payload is
//! a discriminated request validated at the boundary; the outcome is a
//! success/failure envelope the operator UI renders. Authenticating the
//! caller is the host's responsibility.

use serde::{Deserialize, Serialize};

use sideload_extensions::ExtensionKind;

use crate::error::UpdateError;

/// Discriminated update request.
///
/// Wire form: `{"plugin": "<plugins-relative metadata path>"}` or
/// `{"theme": "<theme slug>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateRequest {
    /// Update a plugin, addressed by its plugins-relative metadata path
    Plugin(String),
    /// Update a theme, addressed by its directory slug
    Theme(String),
}

impl UpdateRequest {
    /// Kind of extension the request addresses.
    pub fn kind(&self) -> ExtensionKind {
        match self {
            Self::Plugin(_) => ExtensionKind::Plugin,
            Self::Theme(_) => ExtensionKind::Theme,
        }
    }
}

/// One rendered failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Success/failure envelope returned to the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Whether the update was applied
    pub success: bool,

    /// Failures, most specific first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorEntry>,
}

impl CommandEnvelope {
    /// A success envelope.
    pub fn ok() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
        }
    }

    /// A failure envelope carrying the error's code and message.
    pub fn failure(error: &UpdateError) -> Self {
        Self {
            success: false,
            errors: vec![ErrorEntry {
                code: error.code().to_string(),
                message: error.to_string(),
            }],
        }
    }
}
