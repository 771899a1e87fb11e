use crate::core::color::ColorToken;
use crate::core::finding::{Finding, Severity, Status};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const NO_FINDINGS_RECOMMENDATION: &str = "No findings to evaluate";

/// Upper bound on a single severity weight; keeps weighted sums finite.
pub const MAX_WEIGHT: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn color(self) -> ColorToken {
        match self {
            Self::Low => ColorToken::Green,
            Self::Medium => ColorToken::Yellow,
            Self::High => ColorToken::Orange,
            Self::Critical => ColorToken::Red,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight for {severity} severity must be a positive number, found {value}")]
    NotPositive { severity: Severity, value: f64 },
    #[error("weight for {severity} severity must not exceed {max}, found {value}")]
    TooLarge {
        severity: Severity,
        value: f64,
        max: f64,
    },
    #[error("weight for {higher} ({higher_value}) must be greater than weight for {lower} ({lower_value})")]
    NotIncreasing {
        lower: Severity,
        lower_value: f64,
        higher: Severity,
        higher_value: f64,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeverityWeights {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            critical: 4.0,
            high: 3.0,
            medium: 2.0,
            low: 1.0,
        }
    }
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn validate(&self) -> Result<(), WeightsError> {
        let tiers = [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ];

        for severity in tiers {
            let value = self.weight(severity);
            if !value.is_finite() || value <= 0.0 {
                return Err(WeightsError::NotPositive { severity, value });
            }
            if value > MAX_WEIGHT {
                return Err(WeightsError::TooLarge {
                    severity,
                    value,
                    max: MAX_WEIGHT,
                });
            }
        }

        for pair in tiers.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            if self.weight(higher) <= self.weight(lower) {
                return Err(WeightsError::NotIncreasing {
                    lower,
                    lower_value: self.weight(lower),
                    higher,
                    higher_value: self.weight(higher),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreResult {
    pub overall_score: u8,
    pub total_items: usize,
    pub compliant_items: usize,
    pub non_compliant_items: usize,
    pub critical_findings: usize,
    pub risk_level: RiskLevel,
    pub category_scores: IndexMap<String, u8>,
    pub recommendations: Vec<String>,
}

impl ScoreResult {
    fn empty() -> Self {
        Self {
            overall_score: 100,
            total_items: 0,
            compliant_items: 0,
            non_compliant_items: 0,
            critical_findings: 0,
            risk_level: RiskLevel::Low,
            category_scores: IndexMap::new(),
            recommendations: vec![NO_FINDINGS_RECOMMENDATION.to_string()],
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    earned: f64,
    possible: f64,
    non_compliant: usize,
    critical: usize,
}

impl Tally {
    fn add(&mut self, weight: f64, credit: f64) {
        self.earned += weight * credit;
        self.possible += weight;
    }

    fn score(&self) -> u8 {
        ratio_score(self.earned, self.possible)
    }
}

/// Severity-weighted compliance scoring over a list of findings.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    weights: SeverityWeights,
}

impl ScoreEngine {
    pub fn new(weights: SeverityWeights) -> Result<Self, WeightsError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn calculate(&self, findings: &[Finding]) -> ScoreResult {
        if !findings.iter().any(|finding| finding.status.is_scoreable()) {
            return ScoreResult::empty();
        }

        let mut overall = Tally::default();
        // Keyed in first-appearance order, including categories that only
        // hold not-applicable findings; those are dropped from the output.
        let mut categories: IndexMap<&str, Tally> = IndexMap::new();
        let mut total_items = 0;
        let mut compliant_items = 0;

        for finding in findings {
            let tally = categories.entry(finding.category.as_str()).or_default();
            if !finding.status.is_scoreable() {
                continue;
            }

            // Absent severity is only possible when validation was skipped.
            let weight = self
                .weights
                .weight(finding.severity.unwrap_or(Severity::Medium));
            let credit = finding.status.credit();
            tally.add(weight, credit);
            overall.add(weight, credit);
            total_items += 1;

            match finding.status {
                Status::Compliant => compliant_items += 1,
                Status::NonCompliant => {
                    tally.non_compliant += 1;
                    overall.non_compliant += 1;
                    if finding.is_critical_non_compliance() {
                        tally.critical += 1;
                        overall.critical += 1;
                    }
                }
                Status::Observation | Status::NotApplicable => {}
            }
        }

        let overall_score = overall.score();
        let category_scores = categories
            .iter()
            .filter(|(_, tally)| tally.possible > 0.0)
            .map(|(category, tally)| (category.to_string(), tally.score()))
            .collect();
        let recommendations = categories
            .iter()
            .filter(|(_, tally)| tally.non_compliant > 0)
            .map(|(category, tally)| recommendation(category, tally))
            .collect();

        ScoreResult {
            overall_score,
            total_items,
            compliant_items,
            non_compliant_items: overall.non_compliant,
            critical_findings: overall.critical,
            risk_level: classify_risk(overall_score, overall.critical),
            category_scores,
            recommendations,
        }
    }
}

/// Scores with the default 4/3/2/1 severity weights.
pub fn calculate_score(findings: &[Finding]) -> ScoreResult {
    ScoreEngine::default().calculate(findings)
}

/// Any critical non-compliance forces `Critical` before score bands apply.
pub fn classify_risk(score: u8, critical_findings: usize) -> RiskLevel {
    if critical_findings > 0 {
        return RiskLevel::Critical;
    }

    match score {
        90.. => RiskLevel::Low,
        75..=89 => RiskLevel::Medium,
        60..=74 => RiskLevel::High,
        _ => RiskLevel::Critical,
    }
}

pub fn label_for_score(score: u8) -> &'static str {
    match score {
        90.. => "Excellent",
        75..=89 => "Good",
        60..=74 => "Fair",
        _ => "At Risk",
    }
}

fn ratio_score(earned: f64, possible: f64) -> u8 {
    if possible <= 0.0 {
        return 100;
    }
    (100.0 * earned / possible).round().clamp(0.0, 100.0) as u8
}

fn recommendation(category: &str, tally: &Tally) -> String {
    let noun = if tally.non_compliant == 1 {
        "item"
    } else {
        "items"
    };
    let mut line = format!(
        "Address {} non-compliant {} in {}",
        tally.non_compliant, noun, category
    );
    if tally.critical > 0 {
        line.push_str(&format!(" ({} critical)", tally.critical));
    }
    line
}
