use std::process::ExitCode;

use anyhow::Context;
use edge_parity::{LogViewer, PreviewViewer, RunConfig, RunReport, Viewer, run};

/// Exit code when both engines ran but their edge maps differ.
const EXIT_MISMATCH: u8 = 2;

fn main() -> ExitCode {
    // Logging is configured by the run config, so argument errors go to stderr directly.
    let config = match RunConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = common::setup_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run_comparison(&config) {
        Ok(report) => {
            println!("{}", report);
            if report.is_equivalent() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_MISMATCH)
            }
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_comparison(config: &RunConfig) -> anyhow::Result<RunReport> {
    tracing::debug!("{:?}", config);

    let mut viewer: Box<dyn Viewer> = match &config.preview_dir {
        Some(dir) => Box::new(PreviewViewer::new(dir)),
        None => Box::new(LogViewer),
    };

    run(config, viewer.as_mut())
        .with_context(|| format!("edge comparison of {} failed", config.input.display()))
}
