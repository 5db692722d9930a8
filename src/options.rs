//! Session options as handed over by the configuration layer.
//!
//! Every field is a raw string (or list) exactly as a user typed it; the
//! expander is responsible for splitting and interpreting them. Options can be
//! read from a YAML or JSON file and then overridden field by field.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::diagnostics::MatrixError;
use crate::policy::CompositeMode;

/// Value of `isp_debug` that turns the debug flag on.
pub const DEBUG_ENABLED: &str = "debug";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionOptions {
    /// Simulator to run under (e.g. `renode`, `qemu`).
    pub sim: String,
    /// Runtime the tests are compiled for.
    pub runtime: String,
    /// Path to the SOC configuration file.
    pub soc: String,
    /// Tests or test groups, comma-separated.
    pub test: String,
    /// Global policies, comma-separated.
    pub gpolicies: String,
    /// Policies, comma-separated.
    pub policies: String,
    /// Rule-cache kinds (`ideal`, `finite`, `dmhc`), comma-separated. Empty for none.
    pub rule_cache: String,
    /// Rule-cache sizes, comma-separated. A bare number is accepted too.
    #[serde(deserialize_with = "string_or_number")]
    pub rule_cache_size: String,
    /// Optional policy module prefix. Composites are only built when set.
    pub module: String,
    /// Composite selector: `simple`, `full`, anything else for none.
    pub composite: String,
    /// `debug` to pass debug options to testing tasks.
    pub isp_debug: String,
    /// Processor architecture.
    pub arch: String,
    /// Extra arguments for the run step.
    pub extra: Vec<String>,
    /// Per-test timeout in seconds.
    pub timeout: Option<u64>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            sim: String::new(),
            runtime: String::new(),
            soc: String::new(),
            test: String::new(),
            gpolicies: String::new(),
            policies: String::new(),
            rule_cache: String::new(),
            rule_cache_size: "16".to_string(),
            module: String::new(),
            composite: "simple".to_string(),
            isp_debug: "no".to_string(),
            arch: "rv32".to_string(),
            extra: Vec::new(),
            timeout: None,
        }
    }
}

impl SessionOptions {
    pub fn composite_mode(&self) -> CompositeMode {
        CompositeMode::from_selector(&self.composite)
    }

    pub fn module_present(&self) -> bool {
        !self.module.is_empty()
    }

    pub fn debug(&self) -> bool {
        self.isp_debug == DEBUG_ENABLED
    }

    /// Parses options from YAML, or JSON when `name` ends in `.json`.
    pub fn from_source(name: &str, content: &str) -> Result<Self, MatrixError> {
        if name.ends_with(".json") {
            serde_json::from_str(content).map_err(|e| MatrixError::from_json(name, content, e))
        } else if content.trim().is_empty() {
            Ok(Self::default())
        } else {
            serde_yaml::from_str(content).map_err(|e| MatrixError::from_yaml(name, content, e))
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MatrixError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| MatrixError::io("read", path, e))?;
        let options = Self::from_source(&path.display().to_string(), &content)?;
        debug!(path = %path.display(), "loaded session options");
        Ok(options)
    }

    /// The settings that travel with every case unchanged.
    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            soc: self.soc.clone(),
            extra: self.extra.clone(),
            timeout: self.timeout,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(u64),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Text(text) => text,
        StringOrNumber::Number(number) => number.to_string(),
    })
}

/// Session-wide pass-through values that are never cross-multiplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSettings {
    pub soc: String,
    pub extra: Vec<String>,
    pub timeout: Option<u64>,
}
