//! Compliance rule sets: per-domain required steps and their anchors.

pub mod loader;
pub mod types;

pub use types::{Anchor, AnchorMode, DomainRules, RequiredStep, RuleSet};
