use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::EntityKind;
use crate::id::EntityId;

/// How bad a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A violated `must` rule
    Error,
    /// A violated `should` rule
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// One violated rule, tagged with the entity it was found on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: EntityId,
    pub kind: EntityKind,
    pub message: String,
    pub severity: Severity,
}

impl Finding {
    pub fn error(id: &EntityId, kind: EntityKind, message: impl Into<String>) -> Self {
        Self {
            id: id.clone(),
            kind,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(id: &EntityId, kind: EntityKind, message: impl Into<String>) -> Self {
        Self {
            id: id.clone(),
            kind,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}: {}", self.severity, self.kind, self.id, self.message)
    }
}

/// Ordered collection of findings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    findings: Vec<Finding>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Append the findings of `other` after our own
    pub fn concat(mut self, other: ValidationResult) -> Self {
        self.append(other);
        self
    }

    pub fn append(&mut self, other: ValidationResult) {
        self.findings.extend(other.findings);
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(Finding::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Warning)
    }

    pub fn errors(&self) -> Vec<&Finding> {
        self.with_severity(Severity::Error).collect()
    }

    pub fn warnings(&self) -> Vec<&Finding> {
        self.with_severity(Severity::Warning).collect()
    }

    pub fn error_count(&self) -> usize {
        self.with_severity(Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.with_severity(Severity::Warning).count()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings reported for one entity
    pub fn findings_for<'r>(&'r self, id: &'r str) -> impl Iterator<Item = &'r Finding> + 'r {
        self.findings.iter().filter(move |f| f.id.as_str() == id)
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// No errors; warnings are allowed
    pub fn is_ok(&self) -> bool {
        !self.has_errors()
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }
}

impl Extend<Finding> for ValidationResult {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        self.findings.extend(iter);
    }
}

impl FromIterator<ValidationResult> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = ValidationResult>>(iter: I) -> Self {
        iter.into_iter().fold(ValidationResult::new(), ValidationResult::concat)
    }
}

impl IntoIterator for ValidationResult {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(message: &str, severity: Severity) -> ValidationResult {
        let id = EntityId::from(message);
        let finding = match severity {
            Severity::Error => Finding::error(&id, EntityKind::Source, message),
            Severity::Warning => Finding::warning(&id, EntityKind::Source, message),
        };
        let mut result = ValidationResult::new();
        result.push(finding);
        result
    }

    #[test]
    fn test_empty_result_is_ok() {
        let result = ValidationResult::new();
        assert!(result.is_ok());
        assert!(result.is_empty());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_severity_split() {
        let result = single("a", Severity::Error).concat(single("b", Severity::Warning));
        assert!(result.has_errors());
        assert!(result.has_warnings());
        assert!(!result.is_ok());
        assert_eq!(result.errors()[0].message, "a");
        assert_eq!(result.warnings()[0].message, "b");
        assert_eq!((result.error_count(), result.warning_count()), (1, 1));
    }

    #[test]
    fn test_concat_is_associative() {
        let a = single("a", Severity::Error);
        let b = single("b", Severity::Warning);
        let c = single("c", Severity::Error);

        let left = a.clone().concat(b.clone()).concat(c.clone());
        let right = a.concat(b.concat(c));
        assert_eq!(left, right);
        let messages: Vec<&str> = left.findings().iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_collect_and_filter_by_entity() {
        let result: ValidationResult = ["x", "y", "x"]
            .into_iter()
            .map(|m| single(m, Severity::Warning))
            .collect();
        assert_eq!(result.len(), 3);
        assert_eq!(result.findings_for("x").count(), 2);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
