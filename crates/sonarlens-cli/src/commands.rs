use std::io::{self, Write};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use sonarlens_core::copy_text::{Granularity, copy_text};
use sonarlens_core::detect;
use sonarlens_core::models::AnalysisOutcome;
use sonarlens_core::report::Analyzer;
use sonarlens_core::throttle::Throttle;
use sonarlens_core::{ClientConfig, MetricsClient};

use crate::cli::{AnalyzeArgs, Cli, Command, DetectArgs};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Coverage(args) => analyze(args, Mode::Coverage),
        Command::Duplication(args) => analyze(args, Mode::Duplication),
        Command::Combined(args) => analyze(args, Mode::Combined),
        Command::Detect(args) => detect_config(&args),
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Coverage,
    Duplication,
    Combined,
}

impl Mode {
    fn granularity(self) -> Granularity {
        match self {
            Self::Coverage => Granularity::AllCoverage,
            Self::Duplication => Granularity::AllDuplication,
            Self::Combined => Granularity::Combined,
        }
    }
}

fn analyze(args: AnalyzeArgs, mode: Mode) -> Result<()> {
    let mut config = ClientConfig::from_env(&args.base_url)?;
    if let Some(cookie) = &args.cookie {
        config = config.with_cookie(cookie.clone());
    }
    let throttle = Throttle::new(config.throttle);
    let client = MetricsClient::new(config)?;
    let mut analyzer = Analyzer::new(client, throttle);
    if args.progress {
        analyzer = analyzer.with_progress(Box::new(|message| eprintln!("{message}")));
    }

    let run = match mode {
        Mode::Coverage => analyzer.analyze_coverage(&args.project_key),
        Mode::Duplication => analyzer.analyze_duplication(&args.project_key),
        Mode::Combined => analyzer.analyze_combined(&args.project_key),
    };

    match run {
        Ok(run) => {
            let mut reports = run.reports;
            if let Some(key) = &args.file {
                reports.retain(|report| &report.component_key == key);
            }
            if args.copy_text {
                let granularity = if args.file.is_some() {
                    Granularity::SingleFile
                } else {
                    mode.granularity()
                };
                print!(
                    "{}",
                    copy_text(&reports, granularity, &args.base_url, Local::now())
                );
            } else {
                print_json(&AnalysisOutcome::ok(reports))?;
            }
            Ok(())
        }
        Err(err) => {
            // Fatal failures surface as the downstream failure envelope; no
            // partial report is emitted.
            print_json(&AnalysisOutcome::failed(err.to_string()))?;
            std::process::exit(1);
        }
    }
}

fn detect_config(args: &DetectArgs) -> Result<()> {
    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Detected {
        base_url: Option<String>,
        project_key: Option<String>,
    }

    print_json(&Detected {
        base_url: detect::base_url_from_url(&args.url),
        project_key: detect::project_key_from_url(&args.url),
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
