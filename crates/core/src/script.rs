//! # Generated Scripts
//!
//! A k6 script is only accepted if it imports the k6 HTTP module. The check
//! runs after generation and again before execution, since a caller may
//! submit an edited or hand-written script to the run step.

use serde::{Deserialize, Serialize};

/// Substring every runnable script must contain
pub const REQUIRED_IMPORT: &str = "k6/http";

/// Canonical form of the import, as requested from the model
pub const CANONICAL_IMPORT: &str = "import http from 'k6/http';";

/// A script that passed the import check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedScript(String);

impl GeneratedScript {
    /// Accept `text` if it contains [`REQUIRED_IMPORT`]; hand it back otherwise.
    pub fn parse(text: impl Into<String>) -> Result<Self, String> {
        let text = text.into();
        if has_required_import(&text) {
            Ok(Self(text))
        } else {
            Err(text)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for GeneratedScript {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn has_required_import(text: &str) -> bool {
    !text.trim().is_empty() && text.contains(REQUIRED_IMPORT)
}
