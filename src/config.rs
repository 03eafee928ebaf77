//! Engine configuration. Every field has a default, so an empty file is a
//! valid configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::layout::LayoutParams;
use crate::rules::RuleSet;
use crate::translate::TranslatorConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub layout: LayoutParams,
    pub translator: TranslatorConfig,
    /// Directory of `<domain>.yaml` manifests merged over the built-in packs.
    pub rules_dir: Option<PathBuf>,
    /// Domain used when a seed names one without rules.
    pub fallback_domain: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            layout: LayoutParams::default(),
            translator: TranslatorConfig::default(),
            rules_dir: None,
            fallback_domain: "general".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> EngineResult<Self> {
        // serde_yaml rejects an empty document; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(EngineConfig::default());
        }
        let config: EngineConfig =
            serde_yaml::from_str(yaml).map_err(|e| EngineError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => EngineConfig::from_json_str(&contents)?,
            _ => EngineConfig::from_yaml_str(&contents)?,
        };
        info!(path = %path.display(), "engine configuration loaded");
        Ok(config)
    }

    pub fn check(&self) -> EngineResult<()> {
        self.layout.check()?;
        if self.fallback_domain.trim().is_empty() {
            return Err(EngineError::Config("fallbackDomain must not be empty".into()));
        }
        Ok(())
    }

    /// Built-in packs, overlaid with `rules_dir` when set.
    pub fn load_rules(&self) -> EngineResult<RuleSet> {
        let mut rules = RuleSet::builtin()?.with_fallback(&self.fallback_domain);
        if let Some(dir) = &self.rules_dir {
            rules.load_dir(dir)?;
        }
        Ok(rules)
    }
}
