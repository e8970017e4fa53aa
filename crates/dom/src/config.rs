//! Analyzer configuration.
//!
//! The JS original receives a plain options object and spreads it over a
//! defaults object (`{...DEFAULTS, ...overrides}`); every field is
//! independently optional at the call site. `merge_overrides` reproduces
//! that behavior for a caller handing us a partial JSON document (a CDP
//! bridge, a CLI flag set, a test fixture) instead of a fully-populated
//! `AnalyzerConfig`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnalyzerError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerConfig {
    pub do_highlight_elements: bool,
    pub focus_highlight_index: i64,
    pub viewport_expansion: i64,
    pub debug_mode: bool,
    pub max_iframe_depth: usize,
    pub max_iframes: usize,
    pub include_cross_origin_iframes: bool,
    pub compact_mode: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            do_highlight_elements: true,
            focus_highlight_index: -1,
            viewport_expansion: 0,
            debug_mode: false,
            max_iframe_depth: 5,
            max_iframes: 100,
            include_cross_origin_iframes: true,
            compact_mode: false,
        }
    }
}

impl AnalyzerConfig {
    /// Overlays `overrides` (a partial JSON object, unset keys omitted) on
    /// top of the defaults. Unknown keys are ignored; a present key with
    /// the wrong shape is a config error, not a silent fallback.
    pub fn merge_overrides(overrides: Value) -> Result<Self> {
        let mut base = serde_json::to_value(AnalyzerConfig::default())
            .expect("AnalyzerConfig always serializes");
        let Value::Object(overrides) = overrides else {
            return Ok(AnalyzerConfig::default());
        };
        if let Value::Object(base_map) = &mut base {
            for (key, value) in overrides {
                base_map.insert(key, value);
            }
        }
        serde_json::from_value(base).map_err(AnalyzerError::InvalidConfig)
    }
}
