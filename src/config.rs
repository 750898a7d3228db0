use crate::eml_writer::DEFAULT_MAX_HEADER_LEN;
use crate::error::{GenError, Result};
use crate::faker::Locale;
use crate::received::{DEFAULT_HELO, DEFAULT_HOPS};
use serde::Deserialize;
use std::path::Path;

/// Settings shared by every message a generator produces.
///
/// Loaded from an optional JSON file, then overridden by command line flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub locale: Locale,
    pub helo: String,
    /// Signed so that negative values reach validation instead of the parser.
    pub hops: i64,
    pub max_header_len: usize,
    pub x_mailer: Option<String>,
    pub reply_to: bool,
    pub return_path: bool,
    /// Seed for names and bodies; header randomness is never seeded.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            helo: DEFAULT_HELO.to_string(),
            hops: DEFAULT_HOPS as i64,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
            x_mailer: None,
            reply_to: false,
            return_path: true,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let invalid = |reason: String| {
            GenError::InvalidArgument(format!("config {}: {reason}", path.display()))
        };
        let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_header_len < 20 {
            return Err(GenError::InvalidArgument(format!(
                "max header length {} is too small",
                self.max_header_len
            )));
        }
        if self.helo.trim().is_empty() {
            return Err(GenError::InvalidArgument("HELO name must not be empty".into()));
        }
        crate::received::validate_hops(self.hops).map(|_| ())
    }
}
