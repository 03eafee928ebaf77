//! Load compliance manifests from YAML: the built-in packs and an optional
//! directory of per-domain overrides.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};

use super::types::{AnchorMode, DomainRules, RuleSet};

const BUILTIN_PACKS: &[(&str, &str)] = &[
    ("education", include_str!("packs/education.yaml")),
    ("enterprise", include_str!("packs/enterprise.yaml")),
    ("finance", include_str!("packs/finance.yaml")),
    ("general", include_str!("packs/general.yaml")),
    ("government", include_str!("packs/government.yaml")),
    ("healthcare", include_str!("packs/healthcare.yaml")),
    ("productivity", include_str!("packs/productivity.yaml")),
];

impl DomainRules {
    /// Parse one manifest. `default_domain` names the domain when the
    /// manifest leaves it blank (typically the file stem).
    pub fn from_yaml_str(yaml: &str, default_domain: &str) -> EngineResult<DomainRules> {
        let mut rules: DomainRules = serde_yaml::from_str(yaml)
            .map_err(|e| EngineError::Rules(format!("invalid manifest '{}': {}", default_domain, e)))?;
        if rules.domain.trim().is_empty() {
            rules.domain = default_domain.to_string();
        }
        rules.check()?;
        Ok(rules)
    }

    /// Reject manifests the enforcer could not apply.
    pub fn check(&self) -> EngineResult<()> {
        for (i, step) in self.required_steps.iter().enumerate() {
            let at = format!("{} step {} ('{}')", self.domain, i + 1, step.label);
            if step.label.trim().is_empty() {
                return Err(EngineError::Rules(format!("{}: label must not be empty", at)));
            }
            if step.compliance_type.trim().is_empty() {
                return Err(EngineError::Rules(format!(
                    "{}: complianceType must not be empty",
                    at
                )));
            }
            if step.reason.trim().is_empty() {
                return Err(EngineError::Rules(format!("{}: reason must not be empty", at)));
            }
            let needs_keyword = matches!(
                step.anchor.mode,
                AnchorMode::BeforeLabelMatch | AnchorMode::AfterLabelMatch
            );
            let has_keyword = step
                .anchor
                .match_keyword
                .as_deref()
                .is_some_and(|k| !k.trim().is_empty());
            if needs_keyword && !has_keyword {
                return Err(EngineError::Rules(format!(
                    "{}: label-match anchors need a matchKeyword",
                    at
                )));
            }
        }
        Ok(())
    }
}

impl RuleSet {
    /// The packs compiled into the crate.
    pub fn builtin() -> EngineResult<RuleSet> {
        let mut set = RuleSet::new("general");
        for (domain, yaml) in BUILTIN_PACKS {
            set.insert(DomainRules::from_yaml_str(yaml, domain)?);
        }
        debug!(domains = set.len(), "loaded built-in compliance packs");
        Ok(set)
    }

    /// Merge every `*.yaml`/`*.yml` manifest in `dir` over the current rules.
    /// Returns the number of manifests loaded.
    pub fn load_dir(&mut self, dir: &Path) -> EngineResult<usize> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            EngineError::Rules(format!("cannot read rules directory {}: {}", dir.display(), e))
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let yaml = std::fs::read_to_string(&path).map_err(|e| {
                EngineError::Rules(format!("cannot read {}: {}", path.display(), e))
            })?;
            match DomainRules::from_yaml_str(&yaml, &stem) {
                Ok(rules) => {
                    info!(
                        domain = %rules.domain,
                        steps = rules.required_steps.len(),
                        path = %path.display(),
                        "loaded compliance manifest"
                    );
                    self.insert(rules);
                    loaded += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "rejected compliance manifest");
                    return Err(e);
                }
            }
        }
        Ok(loaded)
    }
}
