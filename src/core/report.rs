use crate::config::{Config, FailOn, MissingSeverity};
use crate::core::color::classify_score_color;
use crate::core::score::{RiskLevel, ScoreResult};
use colored::Colorize;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ExitStatus {
    pub ok: bool,
    pub reasons: Vec<String>,
}

impl ExitStatus {
    pub fn reason_line(&self) -> String {
        self.reasons.join("; ")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub fail_on: FailOn,
    pub min_score: u8,
    pub missing_severity: MissingSeverity,
}

impl From<&Config> for ConfigSummary {
    fn from(cfg: &Config) -> Self {
        Self {
            fail_on: cfg.general.fail_on,
            min_score: cfg.general.min_score,
            missing_severity: cfg.scoring.missing_severity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FinalReport {
    pub vessel: Option<String>,
    pub files: Vec<String>,
    pub label: String,
    pub defaulted_severities: usize,
    pub result: ScoreResult,
    pub config: ConfigSummary,
    pub exit: ExitStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct Counts {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub critical: usize,
    pub defaulted_severities: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vessel: Option<String>,
    pub files: Vec<String>,
    pub score: u8,
    pub label: String,
    pub risk_level: RiskLevel,
    pub counts: Counts,
    pub category_scores: IndexMap<String, u8>,
    pub recommendations: Vec<String>,
    pub config: ConfigSummary,
    pub ok: bool,
}

impl From<&FinalReport> for JsonReport {
    fn from(report: &FinalReport) -> Self {
        Self {
            vessel: report.vessel.clone(),
            files: report.files.clone(),
            score: report.result.overall_score,
            label: report.label.clone(),
            risk_level: report.result.risk_level,
            counts: Counts {
                total: report.result.total_items,
                compliant: report.result.compliant_items,
                non_compliant: report.result.non_compliant_items,
                critical: report.result.critical_findings,
                defaulted_severities: report.defaulted_severities,
            },
            category_scores: report.result.category_scores.clone(),
            recommendations: report.result.recommendations.clone(),
            config: report.config.clone(),
            ok: report.exit.ok,
        }
    }
}

pub fn evaluate_exit(result: &ScoreResult, cfg: &Config) -> ExitStatus {
    let mut reasons = Vec::new();

    if result.overall_score < cfg.general.min_score {
        reasons.push(format!(
            "score {} is below min_score {}",
            result.overall_score, cfg.general.min_score
        ));
    }

    if let Some(threshold) = cfg.general.fail_on.threshold() {
        if result.risk_level >= threshold {
            reasons.push(format!(
                "risk level {} meets fail_on {}",
                result.risk_level, cfg.general.fail_on
            ));
        }
    }

    ExitStatus {
        ok: reasons.is_empty(),
        reasons,
    }
}

pub fn print_human(report: &FinalReport) {
    let result = &report.result;
    let score_color = classify_score_color(f64::from(result.overall_score));
    let risk_color = result.risk_level.color();

    if let Some(vessel) = &report.vessel {
        println!("Vessel: {}", vessel);
    }
    println!(
        "PSC Compliance Score: {}/100 ({})",
        score_color.paint(&result.overall_score.to_string()),
        report.label
    );
    println!(
        "Risk Level: {}",
        risk_color.paint(&result.risk_level.as_str().to_ascii_uppercase())
    );
    println!(
        "Findings: {} scored, {} compliant, {} non-compliant, {} critical ({} file(s))",
        result.total_items,
        result.compliant_items,
        result.non_compliant_items,
        result.critical_findings,
        report.files.len()
    );
    if report.defaulted_severities > 0 {
        println!(
            "{}",
            format!(
                "note: {} finding(s) had no severity and were scored as medium",
                report.defaulted_severities
            )
            .dimmed()
        );
    }

    if !result.category_scores.is_empty() {
        let width = result
            .category_scores
            .keys()
            .map(|category| category.chars().count())
            .max()
            .unwrap_or(0);

        println!();
        println!("{}", "Categories".bold());
        for (category, score) in &result.category_scores {
            let token = classify_score_color(f64::from(*score));
            println!(
                "  {:<width$}  {}",
                category,
                token.paint(&format!("{:>3}", score)),
                width = width
            );
        }
    }

    if !result.recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations".bold());
        for recommendation in &result.recommendations {
            println!("-> {}", recommendation);
        }
    }

    println!();
    if report.exit.ok {
        println!("exit: OK");
    } else {
        println!("exit: FAILED ({})", report.exit.reason_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::finding::{Finding, Severity, Status};
    use crate::core::score::{calculate_score, label_for_score};

    fn report_for(result: ScoreResult, cfg: &Config) -> FinalReport {
        FinalReport {
            vessel: Some("MV Northern Star".to_string()),
            files: vec!["inspection.json".to_string()],
            label: label_for_score(result.overall_score).to_string(),
            defaulted_severities: 0,
            exit: evaluate_exit(&result, cfg),
            config: ConfigSummary::from(cfg),
            result,
        }
    }

    fn mixed_result() -> ScoreResult {
        calculate_score(&[
            Finding::new("Fire Safety", "Detectors", Status::Compliant)
                .with_severity(Severity::High),
            Finding::new("Fire Safety", "Dampers", Status::Observation)
                .with_severity(Severity::Low),
            Finding::new("Life Safety", "Lifeboat", Status::NonCompliant)
                .with_severity(Severity::Medium),
        ])
    }

    #[test]
    fn passing_result_exits_ok() {
        let result = calculate_score(&[
            Finding::new("Fire Safety", "Detectors", Status::Compliant)
                .with_severity(Severity::High),
        ]);
        let exit = evaluate_exit(&result, &Config::default());
        assert!(exit.ok);
        assert!(exit.reasons.is_empty());
    }

    #[test]
    fn low_score_and_high_risk_both_fail() {
        let result = mixed_result();
        assert_eq!(result.overall_score, 58);
        assert_eq!(result.risk_level, RiskLevel::Critical);

        let exit = evaluate_exit(&result, &Config::default());
        assert!(!exit.ok);
        assert_eq!(exit.reasons.len(), 2);
        assert!(exit.reason_line().contains("below min_score 75"));
        assert!(exit.reason_line().contains("risk level critical"));
    }

    #[test]
    fn fail_on_none_only_checks_score() {
        let mut cfg = Config::default();
        cfg.general.fail_on = FailOn::None;
        cfg.general.min_score = 0;
        assert!(evaluate_exit(&mixed_result(), &cfg).ok);
    }

    #[test]
    fn json_report_exposes_scores() {
        let cfg = Config::default();
        let report = report_for(mixed_result(), &cfg);
        let json = serde_json::to_value(JsonReport::from(&report)).unwrap();

        assert_eq!(json["score"], 58);
        assert_eq!(json["label"], "At Risk");
        assert_eq!(json["risk_level"], "critical");
        assert_eq!(json["counts"]["non_compliant"], 1);
        assert_eq!(json["category_scores"]["Fire Safety"], 88);
        assert_eq!(json["category_scores"]["Life Safety"], 0);
        assert_eq!(json["config"]["fail_on"], "high");
        assert_eq!(json["ok"], false);
    }

    #[test]
    fn human_output_does_not_panic() {
        let cfg = Config::default();
        print_human(&report_for(mixed_result(), &cfg));
        print_human(&report_for(calculate_score(&[]), &cfg));
    }
}
