use anyhow::{Context, Result};
use appsys_core::{AppError, AppPackage, AppRuntime, BridgeConfig, Handle};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the app's main script, or to a JSON app manifest
    #[arg(value_name = "APP")]
    app: PathBuf,

    /// Bridge configuration file (JSON)
    #[arg(long, env = "APPSYS_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Simulate a click on the object held by this top-level script variable
    #[arg(long, value_name = "VARIABLE")]
    click: Vec<String>,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The `EnvFilter` directive, spelled as on the command line.
    fn directive(self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_else(|| "info".to_string())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn init_logging(level: LogLevel, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.directive().parse()?)
        .from_env_lossy();

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<BridgeConfig> {
    match path {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(BridgeConfig::default()),
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = load_config(cli.config.as_ref()).map_err(|e| AppError::Config(format!("{e:#}")))?;
    let package = AppPackage::load(&cli.app)?;
    info!(app = %package.app_id, path = ?cli.app, "loaded app package");

    let mut runtime = AppRuntime::new(config);
    runtime.run(&package)?;
    runtime.pump_until_idle()?;

    for name in &cli.click {
        let Some(target) = runtime.variable::<Handle>(name) else {
            warn!(variable = %name, "no object handle in script variable; skipping click");
            continue;
        };
        runtime.click(&target)?;
        let report = runtime.pump_until_idle()?;
        info!(variable = %name, invoked = report.invoked, failed = report.failed, "clicked");
    }

    runtime.shutdown();
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.log_level, cli.log_format) {
        eprintln!("failed to initialize logging: {e:#}");
    }

    match run(&cli) {
        Ok(()) => info!("app finished"),
        Err(e) => {
            error!(code = e.code(), "{e}");
            std::process::exit(e.code());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_log_level_is_a_valid_directive() {
        for level in LogLevel::value_variants() {
            let directive = level.directive();
            assert!(directive.parse::<tracing_subscriber::filter::Directive>().is_ok(), "{directive}");
        }
        assert_eq!(LogLevel::Warn.directive(), "warn");
    }

    #[test]
    fn click_flags_accumulate() {
        let cli = Cli::try_parse_from(["appsys", "app.rhai", "--click", "a", "--click", "b", "--log-format", "json"]).unwrap();
        assert_eq!(cli.click, ["a", "b"]);
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.log_level, LogLevel::Info);
    }
}
