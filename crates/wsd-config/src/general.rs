//! `[general]` section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Rows shown by `wsd finding list` and `wsd audit` without `--limit`.
    pub default_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}
