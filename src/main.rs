use std::fmt::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use pyversion_detect::config::{LOG_ENV_VAR, ResolverConfig, log_path};
use pyversion_detect::{DetectionResult, VersionResolver};

#[derive(Parser)]
#[command(name = "pyversion-detect")]
#[command(version, about = "Detect the version of a Python project")]
struct Cli {
    /// Project root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Print only the version string
    #[arg(long, conflicts_with = "json")]
    simple: bool,

    /// Print the full detection result as JSON
    #[arg(long)]
    json: bool,

    /// Resolver configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Append logs to the log file in the data directory instead of stderr
    #[arg(long)]
    log_file: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_logging(cli.log_file)?;

    let config = match &cli.config {
        Some(path) => ResolverConfig::from_json_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ResolverConfig::default(),
    };
    let resolver = VersionResolver::new(config);

    if cli.simple {
        let version = resolver.version(&cli.path)?;
        if let Some(version) = &version {
            println!("{version}");
        }
        return Ok(exit_code(version.is_some()));
    }

    let result = resolver.detect(&cli.path)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_report(&result)?);
    }

    Ok(exit_code(result.is_detected()))
}

/// Install the tracing subscriber; the returned guard flushes the log file
fn init_logging(to_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    let path = log_path();
    let dir = path.parent().context("log path has no parent directory")?;
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let file_name = path.file_name().context("log path has no file name")?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .init();

    Ok(Some(guard))
}

fn exit_code(detected: bool) -> ExitCode {
    if detected {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn render_report(result: &DetectionResult) -> Result<String, fmt::Error> {
    let mut out = String::new();
    match &result.version_info {
        Some(info) => {
            writeln!(out, "📦 Detection Results:")?;
            writeln!(out, "   Version: {}", info.version)?;
            writeln!(out, "   Source: {}", info.source)?;
            writeln!(out, "   Method: {}", info.method)?;
            writeln!(out, "   Dynamic: {}", info.is_dynamic)?;
            writeln!(
                out,
                "   Backend: {}",
                info.build_backend.as_deref().unwrap_or("none")
            )?;
            writeln!(out, "   Confidence: {}%", info.confidence)?;
        }
        None => {
            let attempts: Vec<&str> = result.attempts.iter().map(|a| a.as_str()).collect();
            writeln!(out, "❌ Version detection failed")?;
            writeln!(out, "   Attempts: {}", attempts.join(", "))?;
            if !result.errors.is_empty() {
                writeln!(out, "   Errors: {}", result.errors.join("; "))?;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyversion_detect::{VersionInfo, VersionSource};

    #[test]
    fn render_report_lists_version_details() {
        let result = DetectionResult {
            version_info: Some(VersionInfo {
                version: "1.2.0".to_string(),
                source: VersionSource::ScmDerived,
                method: "exact-tag".to_string(),
                is_dynamic: true,
                build_backend: Some("hatchling.build".to_string()),
                confidence: 75,
            }),
            attempts: VersionSource::ALL.to_vec(),
            errors: vec!["a".to_string(), "b".to_string()],
        };

        assert_eq!(
            render_report(&result).unwrap(),
            "📦 Detection Results:\n   Version: 1.2.0\n   Source: scm-derived\n   Method: exact-tag\n   Dynamic: true\n   Backend: hatchling.build\n   Confidence: 75%\n"
        );
    }

    #[test]
    fn render_report_lists_attempts_on_failure() {
        let result = DetectionResult {
            version_info: None,
            attempts: vec![VersionSource::StaticMetadataFile, VersionSource::ScmDerived],
            errors: vec!["no static version".to_string(), "not a git repository".to_string()],
        };

        assert_eq!(
            render_report(&result).unwrap(),
            "❌ Version detection failed\n   Attempts: static-metadata-file, scm-derived\n   Errors: no static version; not a git repository\n"
        );
    }

    #[test]
    fn cli_rejects_simple_with_json() {
        assert!(Cli::try_parse_from(["pyversion-detect", "--simple", "--json"]).is_err());
    }

    #[test]
    fn cli_defaults_to_current_directory() {
        let cli = Cli::try_parse_from(["pyversion-detect"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(!cli.simple && !cli.json && !cli.log_file);
        assert!(cli.config.is_none());
    }
}
