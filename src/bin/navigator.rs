//! Navigator sidecar - performs one analysis run and writes exactly one
//! JSON document to stdout.
//!
//! Usage: `ecoscan-navigator <url> <chrome-path> [--report] [--report-dir <dir>]`
//!
//! stdout carries the result or error document and nothing else; all
//! logging goes to stderr. A non-zero exit code signals failure.

use std::path::PathBuf;
use std::process::ExitCode;

use ecoscan::boundary::ErrorDocument;
use ecoscan::error::AppError;
use ecoscan::service::{AnalyzeOptions, Analyzer, InProcessAnalyzer};

struct Args {
    url: String,
    chrome_path: PathBuf,
    options: AnalyzeOptions,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ecoscan=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false)
        .with_ansi(false)
        .init();
}

fn parse_args(mut args: std::env::Args) -> Result<Args, String> {
    let program = args.next().unwrap_or_else(|| "ecoscan-navigator".to_string());
    let usage =
        format!("usage: {program} <url> <chrome-path> [--report] [--report-dir <dir>]");

    let url = args.next().ok_or_else(|| usage.clone())?;
    let chrome_path = PathBuf::from(args.next().ok_or_else(|| usage.clone())?);

    let mut options = AnalyzeOptions::default();
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--report" => options.generate_report = true,
            "--report-dir" => {
                let dir = args.next().ok_or_else(|| usage.clone())?;
                options.report_dir = Some(PathBuf::from(dir));
            }
            other => return Err(format!("unknown argument: {other}\n{usage}")),
        }
    }

    Ok(Args { url, chrome_path, options })
}

fn emit_failure(err: &AppError) -> ExitCode {
    log::error!("[NAVIGATOR] Run failed: {err}");
    let doc = ErrorDocument::from_error(err);
    // Serializing the error document cannot realistically fail; fall back
    // to a handwritten envelope if it somehow does.
    let json = serde_json::to_string(&doc).unwrap_or_else(|_| {
        r#"{"error":true,"code":"PARSE_ERROR","message":"failed to serialize error"}"#.to_string()
    });
    println!("{json}");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(usage) => {
            eprintln!("{usage}");
            return ExitCode::from(2);
        }
    };

    let analyzer = InProcessAnalyzer::new(args.chrome_path);
    match analyzer.analyze(&args.url, &args.options).await {
        Ok(result) => match serde_json::to_string(&result) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => emit_failure(&AppError::parse(format!("result serialization: {e}"))),
        },
        Err(err) => emit_failure(&err),
    }
}
