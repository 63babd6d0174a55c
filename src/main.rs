mod checks;
mod config;
mod engine;
mod error;
mod output;
mod parser;
mod registry;
mod scorecard;

use std::io::Write;

use clap::Parser;
use tracing::info;

use crate::error::GraderError;
use crate::output::OutputFormat;
use crate::scorecard::Grade;

#[derive(Parser)]
#[command(name = "kube-grader", about = "Grades Kubernetes manifests against best-practice checks")]
struct Cli {
    /// Manifest files to score, "-" for stdin
    #[arg(required_unless_present = "list_checks")]
    files: Vec<String>,

    /// Path to the configuration file
    #[arg(long, default_value = "kube-grader.yaml", env = "GRADER_CONFIG")]
    config: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    output: OutputFormat,

    /// Exit nonzero on Warning grades too, not only Critical
    #[arg(long)]
    exit_one_on_warning: bool,

    /// Disable the CPU limit requirement of the container-resources check
    #[arg(long)]
    ignore_container_cpu_limit: bool,

    /// Print the check catalog and exit
    #[arg(long)]
    list_checks: bool,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("kube-grader: {e}");
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> Result<i32, GraderError> {
    let mut config = config::GraderConfig::load(&cli.config)?;
    if cli.ignore_container_cpu_limit {
        config.checks.ignore_container_cpu_limit = true;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let mut registry = registry::CheckRegistry::new();
    checks::register_all(&mut registry, &config.checks)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.list_checks {
        for check in registry.enumerate() {
            writeln!(out, "{} [{}]", check.meta.name, check.target())?;
            writeln!(out, "    {}", check.meta.doc)?;
        }
        return Ok(0);
    }

    let mut objects = Vec::new();
    for path in &cli.files {
        let content = parser::read_input(path)?;
        objects.extend(parser::parse_manifest(&content)?);
    }

    info!(
        objects = objects.len(),
        checks = registry.len(),
        "scoring manifests"
    );

    let engine = engine::ScoreEngine::new(&registry);
    let card = engine.score(&objects);

    output::render(&card, cli.output, &mut out)?;

    let fail_at = if cli.exit_one_on_warning {
        Grade::Warning
    } else {
        Grade::Critical
    };
    let failed = card.lowest_grade().is_some_and(|grade| grade <= fail_at);
    Ok(if failed { 1 } else { 0 })
}
