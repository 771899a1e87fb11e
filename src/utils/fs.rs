use crate::config::{CONFIG_FILE_NAME, InputConfig};
use crate::core::finding::Finding;
use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

pub const DEFAULT_FILE_PATTERN: &str = r"(?i)\.(json|toml)$";

static DEFAULT_FINDINGS_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_FILE_PATTERN).expect("valid findings file regex"));

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectionDocument {
    #[serde(default)]
    pub vessel: Option<String>,
    #[serde(default)]
    pub inspection: Option<String>,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedFindings {
    pub files: Vec<String>,
    pub vessel: Option<String>,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

pub fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Loads findings from a single file, or from every matching file under a
/// directory in sorted path order.
pub fn load_findings(path: &Path, cfg: &InputConfig) -> Result<LoadedFindings> {
    if !path.exists() {
        bail!("path does not exist: {}", path.display());
    }

    if path.is_file() {
        let document = read_document(path)?;
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut loaded = LoadedFindings::default();
        merge_document(&mut loaded, label, document);
        return Ok(loaded);
    }

    let matcher = file_matcher(&cfg.file_pattern)?;
    let files = collect_findings_files(path, &cfg.exclude, &matcher)?;
    if files.is_empty() {
        warn!(path = %path.display(), pattern = %cfg.file_pattern, "no findings files found");
    }

    let mut loaded = LoadedFindings::default();
    for file in files {
        let document = read_document(&file)?;
        merge_document(&mut loaded, relative_path(path, &file), document);
    }

    Ok(loaded)
}

pub fn parse_document(content: &str, source: &Path) -> Result<InspectionDocument> {
    match DocumentFormat::from_path(source) {
        DocumentFormat::Toml => toml::from_str::<InspectionDocument>(content)
            .with_context(|| format!("failed parsing findings file {}", source.display())),
        DocumentFormat::Json if content.trim_start().starts_with('[') => {
            let findings = serde_json::from_str::<Vec<Finding>>(content)
                .with_context(|| format!("failed parsing findings file {}", source.display()))?;
            Ok(InspectionDocument {
                findings,
                ..InspectionDocument::default()
            })
        }
        DocumentFormat::Json => serde_json::from_str::<InspectionDocument>(content)
            .with_context(|| format!("failed parsing findings file {}", source.display())),
    }
}

fn read_document(path: &Path) -> Result<InspectionDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed reading findings file {}", path.display()))?;
    parse_document(&content, path)
}

fn merge_document(loaded: &mut LoadedFindings, label: String, document: InspectionDocument) {
    debug!(
        file = %label,
        findings = document.findings.len(),
        inspection = document.inspection.as_deref().unwrap_or("-"),
        "loaded findings file"
    );

    if let Some(vessel) = document.vessel {
        if let Some(existing) = loaded.vessel.as_deref() {
            if existing != vessel {
                warn!(
                    file = %label,
                    expected = %existing,
                    found = %vessel,
                    "findings files name different vessels"
                );
            }
        } else {
            loaded.vessel = Some(vessel);
        }
    }

    loaded.findings.extend(document.findings);
    loaded.files.push(label);
}

fn file_matcher(pattern: &str) -> Result<Regex> {
    if pattern == DEFAULT_FILE_PATTERN {
        return Ok(DEFAULT_FINDINGS_FILE_RE.clone());
    }
    Regex::new(pattern).with_context(|| format!("invalid [input].file_pattern regex: {pattern}"))
}

fn collect_findings_files(root: &Path, excludes: &[String], matcher: &Regex) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| should_visit(entry, excludes))
    {
        let entry = entry.with_context(|| format!("failed walking {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let wanted = {
            let file_name = entry.file_name().to_string_lossy();
            !file_name.eq_ignore_ascii_case(CONFIG_FILE_NAME) && matcher.is_match(&file_name)
        };
        if !wanted {
            continue;
        }

        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

fn should_visit(entry: &DirEntry, excludes: &[String]) -> bool {
    // The walk root is always entered, whatever it is named.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }

    let dir_name = entry.file_name().to_string_lossy();
    !excludes
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(&dir_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::finding::{Severity, Status};

    const JSON_REPORT: &str = r#"{
  "vessel": "MV Northern Star",
  "inspection": "PSC-2024-0117",
  "findings": [
    {"category": "Fire Safety", "item": "Fire dampers", "status": "non-compliant", "severity": "high"},
    {"category": "Life Safety", "item": "Lifebuoys", "status": "compliant", "severity": "low"}
  ]
}"#;

    const TOML_REPORT: &str = r#"
vessel = "MV Northern Star"

[[findings]]
category = "Navigation"
item = "Voyage data recorder"
status = "observation"
severity = "medium"

[[findings]]
category = "Pollution Prevention"
item = "Ballast water record"
status = "not-applicable"
"#;

    #[test]
    fn parses_json_object_and_array() {
        let document = parse_document(JSON_REPORT, Path::new("report.json")).unwrap();
        assert_eq!(document.vessel.as_deref(), Some("MV Northern Star"));
        assert_eq!(document.findings.len(), 2);
        assert_eq!(document.findings[0].severity, Some(Severity::High));

        let array = r#"[{"category": "Hull", "item": "Plating", "status": "compliant"}]"#;
        let document = parse_document(array, Path::new("hull.json")).unwrap();
        assert_eq!(document.vessel, None);
        assert_eq!(document.findings[0].severity, None);
    }

    #[test]
    fn parses_toml_findings() {
        let document = parse_document(TOML_REPORT, Path::new("report.TOML")).unwrap();
        assert_eq!(document.findings.len(), 2);
        assert_eq!(document.findings[1].status, Status::NotApplicable);
        assert_eq!(document.findings[1].severity, None);
    }

    #[test]
    fn unknown_severity_names_the_file() {
        let input = r#"[{"category": "Hull", "item": "Plating", "status": "compliant", "severity": "extreme"}]"#;
        let err = parse_document(input, Path::new("bad.json")).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn loads_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inspection.json");
        fs::write(&path, JSON_REPORT).unwrap();

        let loaded = load_findings(&path, &InputConfig::default()).unwrap();
        assert_eq!(loaded.files, vec!["inspection.json".to_string()]);
        assert_eq!(loaded.findings.len(), 2);
        assert_eq!(loaded.vessel.as_deref(), Some("MV Northern Star"));
    }

    #[test]
    fn walks_directory_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("deck")).unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("b.toml"), TOML_REPORT).unwrap();
        fs::write(dir.path().join("deck/a.json"), JSON_REPORT).unwrap();
        fs::write(dir.path().join("notes.txt"), "not findings").unwrap();
        fs::write(dir.path().join("target/skip.json"), "not even json").unwrap();

        let loaded = load_findings(dir.path(), &InputConfig::default()).unwrap();
        assert_eq!(
            loaded.files,
            vec!["b.toml".to_string(), "deck/a.json".to_string()]
        );
        assert_eq!(loaded.findings.len(), 4);
        assert_eq!(loaded.findings[0].category, "Navigation");
        assert_eq!(loaded.findings[2].category, "Fire Safety");
    }

    #[test]
    fn custom_pattern_limits_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), JSON_REPORT).unwrap();
        fs::write(dir.path().join("b.toml"), TOML_REPORT).unwrap();

        let cfg = InputConfig {
            file_pattern: r"\.toml$".to_string(),
            ..InputConfig::default()
        };
        let loaded = load_findings(dir.path(), &cfg).unwrap();
        assert_eq!(loaded.files, vec!["b.toml".to_string()]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = InputConfig {
            file_pattern: "(unclosed".to_string(),
            ..InputConfig::default()
        };
        assert!(load_findings(dir.path(), &cfg).is_err());
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nowhere");
        assert!(load_findings(&missing, &InputConfig::default()).is_err());
    }

    #[test]
    fn object_without_findings_key_is_rejected() {
        let input = r#"{"vessel": "MV Northern Star", "finding": [{"category": "Hull", "item": "Plating", "status": "non-compliant", "severity": "critical"}]}"#;
        let err = parse_document(input, Path::new("typo.json")).unwrap_err();
        assert!(format!("{err:#}").contains("typo.json"));

        let err = parse_document("vessel = \"MV Northern Star\"\n", Path::new("empty.toml"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("empty.toml"));
    }

    #[test]
    fn config_file_is_not_loaded_as_findings() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            crate::config::default_config_toml().unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("inspection.json"), JSON_REPORT).unwrap();

        let loaded = load_findings(dir.path(), &InputConfig::default()).unwrap();
        assert_eq!(loaded.files, vec!["inspection.json".to_string()]);
        assert_eq!(loaded.findings.len(), 2);
    }

    #[test]
    fn root_named_like_an_excluded_dir_is_walked() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("target");
        fs::create_dir_all(root.join("node_modules")).unwrap();
        fs::write(root.join("a.json"), JSON_REPORT).unwrap();
        fs::write(root.join("node_modules/b.json"), JSON_REPORT).unwrap();

        let loaded = load_findings(&root, &InputConfig::default()).unwrap();
        assert_eq!(loaded.files, vec!["a.json".to_string()]);
        assert_eq!(loaded.findings.len(), 2);
    }

    #[test]
    fn walk_errors_are_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = collect_findings_files(&missing, &[], &DEFAULT_FINDINGS_FILE_RE).unwrap_err();
        assert!(format!("{err:#}").contains("failed walking"));
    }
}
