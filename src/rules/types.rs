//! Declarative compliance policy: required steps and where they must sit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorMode {
    #[serde(alias = "before_label_match")]
    BeforeLabelMatch,
    #[serde(alias = "after_label_match")]
    AfterLabelMatch,
    #[serde(alias = "at_start")]
    AtStart,
    #[serde(alias = "at_end")]
    AtEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub mode: AnchorMode,
    #[serde(default, alias = "match_keyword", skip_serializing_if = "Option::is_none")]
    pub match_keyword: Option<String>,
}

impl Anchor {
    pub fn before(keyword: impl Into<String>) -> Self {
        Anchor {
            mode: AnchorMode::BeforeLabelMatch,
            match_keyword: Some(keyword.into()),
        }
    }

    pub fn after(keyword: impl Into<String>) -> Self {
        Anchor {
            mode: AnchorMode::AfterLabelMatch,
            match_keyword: Some(keyword.into()),
        }
    }

    pub fn at_start() -> Self {
        Anchor {
            mode: AnchorMode::AtStart,
            match_keyword: None,
        }
    }

    pub fn at_end() -> Self {
        Anchor {
            mode: AnchorMode::AtEnd,
            match_keyword: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredStep {
    pub label: String,
    #[serde(alias = "compliance_type")]
    pub compliance_type: String,
    pub anchor: Anchor,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Overrides the kind derived from `compliance_type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
}

impl RequiredStep {
    pub fn new(
        label: impl Into<String>,
        compliance_type: impl Into<String>,
        anchor: Anchor,
        reason: impl Into<String>,
    ) -> Self {
        RequiredStep {
            label: label.into(),
            compliance_type: compliance_type.into(),
            anchor,
            reason: reason.into(),
            description: None,
            kind: None,
        }
    }

    pub fn node_kind(&self) -> NodeKind {
        self.kind
            .unwrap_or_else(|| NodeKind::for_compliance_type(&self.compliance_type))
    }
}

/// Ordered required steps for one domain, plus the human-facing rationale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRules {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub restrictions: Vec<String>,
    #[serde(default, alias = "required_steps")]
    pub required_steps: Vec<RequiredStep>,
}

impl DomainRules {
    pub fn new(domain: impl Into<String>, required_steps: Vec<RequiredStep>) -> Self {
        DomainRules {
            domain: domain.into(),
            explanation: String::new(),
            restrictions: Vec::new(),
            required_steps,
        }
    }
}

/// `domainTag -> DomainRules`. Read-only once loaded; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    domains: BTreeMap<String, DomainRules>,
    fallback_domain: String,
    empty: DomainRules,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::new("general")
    }
}

impl RuleSet {
    pub fn new(fallback_domain: impl Into<String>) -> Self {
        RuleSet {
            domains: BTreeMap::new(),
            fallback_domain: fallback_domain.into().to_lowercase(),
            empty: DomainRules::default(),
        }
    }

    /// Add or replace the rules for `rules.domain`.
    pub fn insert(&mut self, rules: DomainRules) {
        self.domains.insert(rules.domain.to_lowercase(), rules);
    }

    pub fn with(mut self, rules: DomainRules) -> Self {
        self.insert(rules);
        self
    }

    pub fn with_fallback(mut self, fallback_domain: &str) -> Self {
        self.fallback_domain = fallback_domain.to_lowercase();
        self
    }

    pub fn get(&self, domain: &str) -> Option<&DomainRules> {
        self.domains.get(&domain.to_lowercase())
    }

    /// Rules for `domain`, else the fallback domain's, else an empty list.
    pub fn for_domain(&self, domain: &str) -> &DomainRules {
        self.get(domain)
            .or_else(|| self.domains.get(&self.fallback_domain))
            .unwrap_or(&self.empty)
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.domains.keys().map(String::as_str)
    }

    pub fn fallback_domain(&self) -> &str {
        &self.fallback_domain
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
