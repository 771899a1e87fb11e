pub mod color;
pub mod finding;
pub mod report;
pub mod score;

use crate::config::Config;
use crate::core::report::{ConfigSummary, FinalReport};
use crate::core::score::ScoreEngine;
use crate::utils::fs as fs_utils;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// Loads findings from `path`, scores them and evaluates the exit gate.
pub fn run_score(path: &Path, cfg: &Config) -> Result<FinalReport> {
    let engine = ScoreEngine::new(cfg.scoring.weights)
        .context("invalid [scoring.weights] configuration")?;

    let loaded = fs_utils::load_findings(path, &cfg.input)?;
    info!(
        files = loaded.files.len(),
        findings = loaded.findings.len(),
        "loaded inspection findings"
    );

    let mut findings = loaded.findings;
    let defaulted_severities = finding::validate(&mut findings, cfg.scoring.missing_severity)
        .with_context(|| format!("invalid findings in {}", path.display()))?;

    let result = engine.calculate(&findings);
    debug!(categories = ?result.category_scores, "category scores");
    info!(
        score = result.overall_score,
        risk = %result.risk_level,
        critical = result.critical_findings,
        "compliance score computed"
    );

    let label = score::label_for_score(result.overall_score).to_string();
    let exit = report::evaluate_exit(&result, cfg);

    Ok(FinalReport {
        vessel: loaded.vessel,
        files: loaded.files,
        label,
        defaulted_severities,
        result,
        config: ConfigSummary::from(cfg),
        exit,
    })
}
