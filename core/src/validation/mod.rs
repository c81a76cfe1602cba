//! Validation findings and the oracle contract.
//!
//! A [`ValidationOracle`] inspects a subject of the model and reports
//! [`Findings`]. Action managers never interpret rule content themselves:
//! they ask the oracle after an action ran and feed the result through a
//! [`VetoPolicy`] to decide whether the action is rolled back.
//!
//! [`BasicRules`] is the structural rule set used by default.

mod rules;

use std::collections::HashSet;
use std::fmt;

pub use rules::BasicRules;

use crate::model::{Model, NodeId};

/// Finding codes reported by [`BasicRules`].
pub mod codes {
    pub const NAME_REQUIRED: &str = "NAME_REQUIRED";
    pub const INVALID_NAME: &str = "INVALID_NAME";
    pub const DUPLICATE_NAME: &str = "DUPLICATE_NAME";
    pub const MISSING_TYPE: &str = "MISSING_TYPE";
    pub const ILLEGAL_TYPE_ASSIGNMENT: &str = "ILLEGAL_TYPE_ASSIGNMENT";
    pub const ABSTRACT_FIRST_CLASS: &str = "ABSTRACT_FIRST_CLASS";
    pub const MISSING_DESCRIPTION: &str = "MISSING_DESCRIPTION";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// A single rule violation reported for a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub subject: NodeId,
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn new(
        subject: NodeId,
        code: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            code: code.into(),
            severity,
            message: message.into(),
        }
    }

    pub fn error(subject: NodeId, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, code, Severity::Error, message)
    }

    pub fn warning(subject: NodeId, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(subject, code, Severity::Warning, message)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)
    }
}

/// Ordered collection of findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    items: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.items.iter()
    }

    pub fn push(&mut self, finding: Finding) {
        self.items.push(finding);
    }

    pub fn extend(&mut self, other: Findings) {
        self.items.extend(other.items);
    }

    /// Whether any finding carries `code`.
    pub fn has_code(&self, code: &str) -> bool {
        self.items.iter().any(|f| f.code == code)
    }

    /// Keeps only findings whose code is in `codes`.
    pub fn retain_codes(&mut self, codes: &[&str]) {
        self.items.retain(|f| codes.contains(&f.code.as_str()));
    }

    /// Returns a copy without findings whose code is in `codes`.
    pub fn without_codes(mut self, codes: &[&str]) -> Self {
        self.items.retain(|f| !codes.contains(&f.code.as_str()));
        self
    }

    /// All findings rendered one per line, for status messages.
    pub fn messages(&self) -> String {
        self.items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<Finding> for Findings {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Findings {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Findings {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Validation rules evaluated on demand.
///
/// Implementations must be pure with respect to the model: they only read.
pub trait ValidationOracle {
    /// Findings for `subject` and anything it owns.
    fn findings(&self, model: &Model, subject: NodeId) -> Findings;
}

/// Decides which findings roll an action back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VetoPolicy {
    codes: HashSet<String>,
}

impl VetoPolicy {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// A policy that never vetoes.
    pub fn none() -> Self {
        Self {
            codes: HashSet::new(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Only errors with a listed code are vetoes.
    pub fn is_veto(&self, finding: &Finding) -> bool {
        finding.severity == Severity::Error && self.codes.contains(&finding.code)
    }

    pub fn vetoes(&self, findings: &Findings) -> Findings {
        findings
            .iter()
            .filter(|f| self.is_veto(f))
            .cloned()
            .collect()
    }
}

impl Default for VetoPolicy {
    fn default() -> Self {
        Self::new([
            codes::NAME_REQUIRED,
            codes::INVALID_NAME,
            codes::DUPLICATE_NAME,
            codes::ILLEGAL_TYPE_ASSIGNMENT,
            codes::ABSTRACT_FIRST_CLASS,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> NodeId {
        NodeId::from_index(3)
    }

    fn sample() -> Findings {
        [
            Finding::error(subject(), codes::NAME_REQUIRED, "name is required"),
            Finding::error(subject(), codes::MISSING_TYPE, "no type assigned"),
            Finding::warning(subject(), codes::DUPLICATE_NAME, "looks duplicated"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn default_policy_filters_errors_only() {
        let vetoes = VetoPolicy::default().vetoes(&sample());
        assert_eq!(vetoes.len(), 1);
        assert!(vetoes.has_code(codes::NAME_REQUIRED));
    }

    #[test]
    fn empty_policy_never_vetoes() {
        assert!(VetoPolicy::none().vetoes(&sample()).is_empty());
    }

    #[test]
    fn without_codes_drops_listed() {
        let rest = sample().without_codes(&[codes::MISSING_TYPE]);
        assert_eq!(rest.len(), 2);
        assert!(!rest.has_code(codes::MISSING_TYPE));
    }

    #[test]
    fn retain_codes_keeps_listed() {
        let mut findings = sample();
        findings.retain_codes(&[codes::MISSING_TYPE]);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn messages_one_per_line() {
        let text = sample().messages();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("[error] NAME_REQUIRED: name is required"));
    }
}
