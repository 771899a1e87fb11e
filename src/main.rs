use anyhow::Result;
use clap::Parser;
use pscguard::cli::{Cli, ColorsArgs, Commands, RunArgs};
use pscguard::core::color::{ColorToken, classify_risk_color, classify_score_color};
use pscguard::core::report::{JsonReport, print_human};
use pscguard::{config, telemetry};
use std::path::{Path, PathBuf};
use tracing::debug;

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    match cli.command {
        Commands::Score(args) => run_score(args),
        Commands::Init => {
            let path = std::env::current_dir()?.join(config::CONFIG_FILE_NAME);
            config::write_default_config(&path)?;
            println!("created {}", path.display());
            Ok(0)
        }
        Commands::Colors(args) => {
            print_color(&args);
            Ok(0)
        }
    }
}

fn run_score(args: RunArgs) -> Result<i32> {
    let cwd = std::env::current_dir()?;
    let loaded = config::load_config(args.config.as_deref(), &cwd)?;
    let findings_path = resolve_path(&cwd, &args.path);
    debug!(path = %findings_path.display(), "scoring findings");
    let report = pscguard::core::run_score(&findings_path, &loaded.config)?;

    let output_json = args.json || loaded.config.general.json;
    if output_json {
        let json_report = JsonReport::from(&report);
        println!("{}", serde_json::to_string_pretty(&json_report)?);
    } else {
        print_human(&report);
    }

    if report.exit.ok { Ok(0) } else { Ok(1) }
}

fn print_color(args: &ColorsArgs) {
    let token = color_for_value(&args.value);
    println!("{} -> {}", args.value, token.paint(token.as_str()));
}

fn color_for_value(value: &str) -> ColorToken {
    match value.trim().parse::<f64>() {
        Ok(score) => classify_score_color(score),
        Err(_) => classify_risk_color(value),
    }
}

fn resolve_path(cwd: &Path, path: &PathBuf) -> PathBuf {
    if path.is_absolute() {
        path.clone()
    } else {
        cwd.join(path)
    }
}
