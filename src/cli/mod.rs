//! Burnout predictor CLI
//!
//! `burnout train` fits the model and writes the artifacts;
//! `burnout serve` loads them and starts the prediction service.

use clap::{Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::server::{run_server, ServerConfig};
use crate::training::{TrainEngine, TrainingConfig, TrainingReport, DEFAULT_DATA_PATH, DEFAULT_MODELS_DIR};
use crate::utils::DataLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "burnout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Burnout level classifier for remote-work survey data")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the classifier and write the artifacts
    Train {
        /// Labeled survey CSV
        #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
        data: PathBuf,

        /// Directory for the artifacts
        #[arg(short, long, default_value = DEFAULT_MODELS_DIR)]
        output: PathBuf,
    },

    /// Start the prediction service
    Serve {
        /// Bind address [env: API_HOST, default 0.0.0.0]
        #[arg(long)]
        host: Option<String>,

        /// Port [env: API_PORT, default 8000]
        #[arg(short, long)]
        port: Option<u16>,

        /// Artifact directory [env: MODELS_DIR, default models]
        #[arg(long)]
        models_dir: Option<PathBuf>,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(data_path: &Path, output: &Path) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let dataset = DataLoader::new().load_dataset(data_path)?;
    step_done(&format!("{} rows in {:?}", dataset.len(), start.elapsed()));

    let engine = TrainEngine::new(TrainingConfig::new(data_path, output));

    step_run(&format!(
        "Fitting {} trees",
        engine.config().forest.n_estimators.to_string().cyan()
    ));
    let start = Instant::now();
    let (bundle, mut report) = engine.fit(&dataset)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run("Writing artifacts");
    report.artifacts = bundle.save(output)?;
    step_done(&output.display().to_string());

    print_report(&report);
    Ok(())
}

fn print_report(report: &TrainingReport) {
    section("Summary");
    println!("  {}", kv("rows     ", &report.n_rows.to_string()));
    println!("  {}", kv("features ", &report.n_features.to_string()));
    println!(
        "  {}",
        kv("accuracy ", &format!("{:.4} (training set)", report.training_accuracy))
    );

    println!();
    println!("  {}", muted("class counts"));
    for (label, count) in &report.class_counts {
        println!("    {:<12} {}", label, count);
    }

    if !report.top_features.is_empty() {
        println!();
        println!("  {}", muted("top features"));
        for (name, importance) in &report.top_features {
            let bar = "█".repeat((importance * 40.0).round() as usize);
            println!("    {:<24} {:.4} {}", name, importance, accent(&bar));
        }
    }

    println!();
    for path in &report.artifacts {
        println!("  {} {}", ok("✓"), path.display());
    }
    println!();
}

pub async fn cmd_serve(
    host: Option<String>,
    port: Option<u16>,
    models_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let defaults = ServerConfig::default();
    let config = ServerConfig {
        host: host.unwrap_or(defaults.host),
        port: port.unwrap_or(defaults.port),
        models_dir: models_dir.unwrap_or(defaults.models_dir),
    };

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Burnout Predictor".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Predict", &format!("POST http://{}:{}/predict", config.host, config.port)));
    line_box(&kv("Model  ", &format!("GET  http://{}:{}/model", config.host, config.port)));
    line_box(&kv("Health ", &format!("GET  http://{}:{}/health", config.host, config.port)));
    line_box(&kv("Models ", &config.models_dir.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["burnout", "train"]).unwrap();
        match cli.command {
            Commands::Train { data, output } => {
                assert_eq!(data, PathBuf::from(DEFAULT_DATA_PATH));
                assert_eq!(output, PathBuf::from(DEFAULT_MODELS_DIR));
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from(["burnout", "serve", "--port", "9100", "--models-dir", "/tmp/m"])
            .unwrap();
        match cli.command {
            Commands::Serve { host, port, models_dir } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9100));
                assert_eq!(models_dir, Some(PathBuf::from("/tmp/m")));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[1mbold\x1b[0m"), "bold");
    }
}
