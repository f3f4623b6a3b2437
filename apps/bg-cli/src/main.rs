use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bg_core::Band;
use bg_engine::{Engine, EngineConfig, EngineError, FindingStatus, InterpretationResult};
use bg_panel::{Analyte, PanelError, load_path, validate_and_build_panel};

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "bg-cli")]
#[command(about = "Blood gas acid-base interpretation", long_about = None)]
struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a panel file and show normal-range flags
    Validate {
        /// Path to the panel file (.json, .yaml or .yml)
        panel_path: PathBuf,
    },
    /// Interpret a panel
    Interpret {
        /// Path to the panel file (.json, .yaml or .yml)
        panel_path: PathBuf,
        /// Engine configuration YAML (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the normal-range and plausibility tables
    Ranges,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Validate { panel_path } => cmd_validate(&panel_path),
        Commands::Interpret {
            panel_path,
            config,
            format,
        } => cmd_interpret(&panel_path, config.as_deref(), format),
        Commands::Ranges => {
            cmd_ranges();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_validate(panel_path: &Path) -> CliResult<()> {
    println!("Validating panel: {}", panel_path.display());
    let raw = load_path(panel_path)?;
    let panel = validate_and_build_panel(&raw)?;

    if panel.is_empty() {
        println!("✓ Panel is valid (no values supplied)");
        return Ok(());
    }
    println!("✓ Panel is valid");
    for r in panel.readings() {
        println!(
            "  {:<12} {:>8.2} {:<7} [{}] {}",
            r.analyte.key(),
            r.value,
            r.unit,
            band_text(r.normal_range),
            r.flag
        );
    }
    Ok(())
}

fn cmd_interpret(
    panel_path: &Path,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> CliResult<()> {
    let config = match config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config)?;

    let raw = load_path(panel_path)?;
    let panel = validate_and_build_panel(&raw)?;
    info!(path = %panel_path.display(), "interpreting panel");
    let result = engine.interpret(&panel);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&result)?),
        OutputFormat::Text => print!("{}", render_text(&result)),
    }
    Ok(())
}

fn cmd_ranges() {
    println!(
        "{:<12} {:<7} {:>16} {:>16}",
        "analyte", "unit", "normal", "plausible"
    );
    for analyte in Analyte::ALL {
        println!(
            "{:<12} {:<7} {:>16} {:>16}",
            analyte.key(),
            analyte.unit_label(),
            band_text(analyte.normal_range()),
            band_text(analyte.plausible_range())
        );
    }
}

fn band_text(band: Band) -> String {
    format!("{} - {}", band.low, band.high)
}

fn status_marker(status: FindingStatus) -> &'static str {
    match status {
        FindingStatus::Normal => "ok",
        FindingStatus::Abnormal => "!!",
        FindingStatus::NotApplicable => "--",
        FindingStatus::InsufficientData => "??",
        FindingStatus::Indeterminate => "<>",
    }
}

/// Terse step table followed by the impression.
fn render_text(result: &InterpretationResult) -> String {
    let mut out = String::new();
    for f in &result.findings {
        out.push_str(&format!(
            "{}. {:<28} [{}] {}\n",
            f.number,
            f.title,
            status_marker(f.status),
            f.label
        ));
        for e in &f.evidence {
            let reference = e.reference.map(band_text).unwrap_or_default();
            let flag = e.flag.map(|fl| fl.to_string()).unwrap_or_default();
            out.push_str(&format!(
                "     {:<20} {:>8.2} {:<7} {:>14} {}\n",
                e.name, e.value, e.unit, reference, flag
            ));
        }
        for note in &f.notes {
            out.push_str(&format!("     - {note}\n"));
        }
    }

    let imp = &result.impression;
    out.push_str(&format!("\nImpression: {}\n", imp.diagnosis));
    out.push_str(&format!("Compensation: {}\n", imp.compensation_description));
    if let Some(note) = &imp.mixed_disorder_note {
        out.push_str(&format!("Mixed disorder: {note}\n"));
    }
    if !imp.differentials.is_empty() {
        out.push_str(&format!("Consider: {}\n", imp.differentials.join(", ")));
    }
    if let Some(context) = &imp.clinical_context {
        out.push_str(&format!("Clinical context: {context}\n"));
    }
    out
}
