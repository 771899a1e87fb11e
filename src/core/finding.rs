use crate::config::MissingSeverity;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Compliant,
    NonCompliant,
    Observation,
    NotApplicable,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non-compliant",
            Self::Observation => "observation",
            Self::NotApplicable => "not-applicable",
        }
    }

    /// `not-applicable` findings take no part in any count or score.
    pub fn is_scoreable(self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    /// Share of a finding's weight that counts as earned.
    pub fn credit(self) -> f64 {
        match self {
            Self::Compliant => 1.0,
            Self::Observation => 0.5,
            Self::NonCompliant | Self::NotApplicable => 0.0,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub category: String,
    #[serde(default)]
    pub item: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl Finding {
    pub fn new(category: impl Into<String>, item: impl Into<String>, status: Status) -> Self {
        Self {
            category: category.into(),
            item: item.into(),
            status,
            severity: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn is_critical_non_compliance(&self) -> bool {
        self.status == Status::NonCompliant && self.severity == Some(Severity::Critical)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FindingError {
    #[error("finding #{position} ({item:?}) has a blank category")]
    BlankCategory { position: usize, item: String },
    #[error("finding #{position} in {category} ({item:?}) has no severity")]
    MissingSeverity {
        position: usize,
        category: String,
        item: String,
    },
}

/// Checks findings before scoring and resolves absent severities on
/// scoreable findings according to `policy`. Returns how many severities
/// were filled in.
pub fn validate(findings: &mut [Finding], policy: MissingSeverity) -> Result<usize, FindingError> {
    let mut defaulted = 0;

    for (idx, finding) in findings.iter_mut().enumerate() {
        let position = idx + 1;

        if finding.category.trim().is_empty() {
            return Err(FindingError::BlankCategory {
                position,
                item: finding.item.clone(),
            });
        }

        if !finding.status.is_scoreable() || finding.severity.is_some() {
            continue;
        }

        match policy {
            MissingSeverity::Medium => {
                warn!(
                    position,
                    category = %finding.category,
                    item = %finding.item,
                    "finding has no severity, defaulting to medium"
                );
                finding.severity = Some(Severity::Medium);
                defaulted += 1;
            }
            MissingSeverity::Reject => {
                return Err(FindingError::MissingSeverity {
                    position,
                    category: finding.category.clone(),
                    item: finding.item.clone(),
                });
            }
        }
    }

    Ok(defaulted)
}
