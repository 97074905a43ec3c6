use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use log::warn;
use serde::Serialize;

use crate::client::MetricsApi;
use crate::enrich::{collect_duplicate_blocks, enrich_uncovered};
use crate::error::Result;
use crate::measures::{
    COVERAGE_METRIC_KEYS, DUPLICATION_METRIC_KEYS, METRIC_COVERAGE, METRIC_DUPLICATED_BLOCKS,
    METRIC_DUPLICATED_LINES, METRIC_DUPLICATED_LINES_DENSITY, METRIC_UNCOVERED_LINES,
    MeasureScope, measure_f64, measure_u32,
};
use crate::models::{CoverageFacet, DuplicationFacet, FileReport};
use crate::throttle::Throttle;

/// Generation stamp for one analysis run. A token stays current until a later
/// run begins on the same analyzer; callers should discard results carrying a
/// superseded token instead of letting them overwrite newer ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunToken(u64);

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRun {
    pub token: RunToken,
    pub reports: Vec<FileReport>,
}

pub type ProgressSink = Box<dyn Fn(&str) + Send + Sync>;

/// Drives one analysis run: listing, extraction, enrichment, assembly.
///
/// Holds no report state across runs; every run returns its reports
/// explicitly in [`AnalysisRun`].
pub struct Analyzer<A: MetricsApi> {
    api: A,
    throttle: Throttle,
    progress: Option<ProgressSink>,
    run_seq: AtomicU64,
}

impl<A: MetricsApi> Analyzer<A> {
    pub fn new(api: A, throttle: Throttle) -> Self {
        Self {
            api,
            throttle,
            progress: None,
            run_seq: AtomicU64::new(0),
        }
    }

    /// Progress messages are forwarded in emission order; no other ordering
    /// guarantee is given.
    #[must_use]
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    #[must_use]
    pub fn is_current(&self, token: RunToken) -> bool {
        token.0 == self.run_seq.load(AtomicOrdering::SeqCst)
    }

    /// Per-file coverage report, sorted lowest coverage first. Every listed
    /// component is reported; fully covered files skip the source fetch.
    pub fn analyze_coverage(&self, project_key: &str) -> Result<AnalysisRun> {
        let token = self.begin_run();
        let reports = self.coverage_reports(project_key)?;
        Ok(AnalysisRun { token, reports })
    }

    /// Per-file duplication report, densest first. Components whose three
    /// duplication measures are all zero are excluded entirely.
    pub fn analyze_duplication(&self, project_key: &str) -> Result<AnalysisRun> {
        let token = self.begin_run();
        let reports = self.duplication_reports(project_key)?;
        Ok(AnalysisRun { token, reports })
    }

    /// Both reports merged into one record per file: coverage ordering is the
    /// base, duplication-only files append in density order.
    pub fn analyze_combined(&self, project_key: &str) -> Result<AnalysisRun> {
        let token = self.begin_run();
        let coverage = self.coverage_reports(project_key)?;
        let duplication = self.duplication_reports(project_key)?;
        Ok(AnalysisRun {
            token,
            reports: merge_reports(coverage, duplication),
        })
    }

    fn begin_run(&self) -> RunToken {
        RunToken(self.run_seq.fetch_add(1, AtomicOrdering::SeqCst) + 1)
    }

    fn notify(&self, message: &str) {
        if let Some(sink) = &self.progress {
            sink(message);
        }
    }

    fn coverage_reports(&self, project_key: &str) -> Result<Vec<FileReport>> {
        self.notify("Fetching coverage data with details...");
        let components = self.api.list_leaf_components(
            project_key,
            COVERAGE_METRIC_KEYS,
            METRIC_COVERAGE,
            true,
        )?;
        let total = components.len();
        let mut reports = Vec::with_capacity(total);
        for (idx, component) in components.iter().enumerate() {
            self.notify(&format!(
                "Processing coverage {}/{total}: {}",
                idx + 1,
                component.name
            ));
            let coverage =
                measure_f64(&component.measures, METRIC_COVERAGE, MeasureScope::Overall);
            let uncovered = measure_u32(
                &component.measures,
                METRIC_UNCOVERED_LINES,
                MeasureScope::Overall,
            );
            let details = if uncovered > 0 {
                let details = enrich_uncovered(&self.api, &component.key);
                self.throttle.pause();
                details
            } else {
                Vec::new()
            };
            reports.push(FileReport {
                file_name: component.name.clone(),
                file_path: component.path.clone(),
                component_key: component.key.clone(),
                coverage: Some(CoverageFacet {
                    coverage,
                    uncovered_lines: uncovered,
                    uncovered_line_details: details,
                }),
                duplication: None,
            });
        }
        reports.sort_by(|a, b| {
            coverage_of(a)
                .partial_cmp(&coverage_of(b))
                .unwrap_or(Ordering::Equal)
        });
        Ok(reports)
    }

    fn duplication_reports(&self, project_key: &str) -> Result<Vec<FileReport>> {
        self.notify("Fetching duplication data with details...");
        let components = self.api.list_leaf_components(
            project_key,
            DUPLICATION_METRIC_KEYS,
            METRIC_DUPLICATED_LINES_DENSITY,
            false,
        )?;
        let total = components.len();
        let mut reports = Vec::new();
        for (idx, component) in components.iter().enumerate() {
            self.notify(&format!(
                "Processing duplication {}/{total}: {}",
                idx + 1,
                component.name
            ));
            let lines = measure_u32(
                &component.measures,
                METRIC_DUPLICATED_LINES,
                MeasureScope::Overall,
            );
            let blocks = measure_u32(
                &component.measures,
                METRIC_DUPLICATED_BLOCKS,
                MeasureScope::Overall,
            );
            let density = measure_f64(
                &component.measures,
                METRIC_DUPLICATED_LINES_DENSITY,
                MeasureScope::Overall,
            );
            if lines == 0 && blocks == 0 && density == 0.0 {
                continue;
            }
            let details = if lines > 0 || blocks > 0 {
                let groups = match self.api.fetch_duplications(&component.key) {
                    Ok(groups) => groups,
                    Err(err) => {
                        warn!("duplication detail failed for {}: {err}", component.key);
                        Vec::new()
                    }
                };
                let details =
                    collect_duplicate_blocks(&self.api, &self.throttle, &groups, &component.key);
                self.throttle.pause();
                details
            } else {
                Vec::new()
            };
            reports.push(FileReport {
                file_name: component.name.clone(),
                file_path: component.path.clone(),
                component_key: component.key.clone(),
                coverage: None,
                duplication: Some(DuplicationFacet {
                    duplicated_lines: lines,
                    duplicated_blocks: blocks,
                    duplicated_density: density,
                    duplicated_block_details: details,
                }),
            });
        }
        reports.sort_by(|a, b| {
            density_of(b)
                .partial_cmp(&density_of(a))
                .unwrap_or(Ordering::Equal)
        });
        Ok(reports)
    }
}

fn coverage_of(report: &FileReport) -> f64 {
    report.coverage.as_ref().map_or(0.0, |facet| facet.coverage)
}

fn density_of(report: &FileReport) -> f64 {
    report
        .duplication
        .as_ref()
        .map_or(0.0, |facet| facet.duplicated_density)
}

fn merge_reports(coverage: Vec<FileReport>, duplication: Vec<FileReport>) -> Vec<FileReport> {
    let mut merged = coverage;
    for report in duplication {
        if let Some(existing) = merged
            .iter_mut()
            .find(|r| r.component_key == report.component_key)
        {
            existing.duplication = report.duplication;
        } else {
            merged.push(report);
        }
    }
    merged
}
