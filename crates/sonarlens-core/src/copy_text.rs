use std::fmt::Write as _;

use chrono::{DateTime, Local};

use crate::client::{SOURCE_LINES_FROM, SOURCE_LINES_TO, endpoint_url};
use crate::models::{CoverageFacet, DuplicationFacet, FileReport};

/// Which slice of a report the clipboard transcript covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One file, no header or numbering: the per-item clipboard form.
    SingleFile,
    AllCoverage,
    AllDuplication,
    /// Coverage and duplication fields together, zero-defaulted when a file
    /// carries only one facet.
    Combined,
}

/// Deterministically serializes a report slice to the plain-text transcript.
///
/// The timestamp is an explicit input so output is reproducible; ratios are
/// rendered to one decimal here and nowhere else.
#[must_use]
pub fn copy_text(
    reports: &[FileReport],
    granularity: Granularity,
    base_url: &str,
    generated_at: DateTime<Local>,
) -> String {
    let mut out = String::new();
    match granularity {
        Granularity::SingleFile => {
            if let Some(report) = reports.first() {
                write_single_file(&mut out, report, base_url);
            }
        }
        Granularity::AllCoverage => {
            write_header(&mut out, "Coverage", reports.len(), generated_at);
            for (idx, report) in reports.iter().enumerate() {
                write_numbered_entry(&mut out, idx + 1, report, base_url, true, false);
            }
        }
        Granularity::AllDuplication => {
            write_header(&mut out, "Duplication", reports.len(), generated_at);
            for (idx, report) in reports.iter().enumerate() {
                write_numbered_entry(&mut out, idx + 1, report, base_url, false, true);
            }
        }
        Granularity::Combined => {
            write_header(&mut out, "Complete", reports.len(), generated_at);
            for (idx, report) in reports.iter().enumerate() {
                write_numbered_entry(&mut out, idx + 1, report, base_url, true, true);
            }
        }
    }
    out
}

fn write_header(out: &mut String, title: &str, count: usize, generated_at: DateTime<Local>) {
    let _ = writeln!(out, "=== SonarQube {title} Analysis ===");
    let _ = writeln!(out, "Total Files: {count}");
    let _ = writeln!(
        out,
        "Analysis Date: {}",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    out.push('\n');
}

fn write_numbered_entry(
    out: &mut String,
    number: usize,
    report: &FileReport,
    base_url: &str,
    coverage_fields: bool,
    duplication_fields: bool,
) {
    let _ = writeln!(out, "{number}. File: {}", report.file_name);
    let _ = writeln!(out, "   Path: {}", report.file_path);
    let _ = writeln!(out, "   Component Key: {}", report.component_key);

    if coverage_fields {
        let coverage = report.coverage.as_ref().map_or(0.0, |c| c.coverage);
        let uncovered = report.coverage.as_ref().map_or(0, |c| c.uncovered_lines);
        let _ = writeln!(out, "   Coverage: {coverage:.1}%");
        let _ = writeln!(out, "   Uncovered Lines Count: {uncovered}");
    }
    if duplication_fields {
        let lines = report.duplication.as_ref().map_or(0, |d| d.duplicated_lines);
        let blocks = report
            .duplication
            .as_ref()
            .map_or(0, |d| d.duplicated_blocks);
        let density = report
            .duplication
            .as_ref()
            .map_or(0.0, |d| d.duplicated_density);
        let _ = writeln!(out, "   Duplicated Lines: {lines}");
        let _ = writeln!(out, "   Duplicated Blocks: {blocks}");
        let _ = writeln!(out, "   Duplication Density: {density:.1}%");
    }

    if coverage_fields {
        if let Some(facet) = report
            .coverage
            .as_ref()
            .filter(|facet| !facet.uncovered_line_details.is_empty())
        {
            write_uncovered_details(out, facet, &report.component_key, base_url);
        }
    }
    if duplication_fields {
        if let Some(facet) = report
            .duplication
            .as_ref()
            .filter(|facet| !facet.duplicated_block_details.is_empty())
        {
            write_duplication_details(out, facet, &report.component_key, base_url);
        }
    }
    out.push('\n');
}

fn write_uncovered_details(
    out: &mut String,
    facet: &CoverageFacet,
    component_key: &str,
    base_url: &str,
) {
    let numbers = facet
        .uncovered_line_details
        .iter()
        .map(|line| line.line_number)
        .collect::<Vec<_>>();
    let _ = writeln!(out, "   Uncovered Line Numbers: {}", join_numbers(&numbers));
    if let Some(url) = sources_api_url(base_url, component_key) {
        let _ = writeln!(out, "   API URL: {url}");
    }
    let _ = writeln!(out, "   Uncovered Lines Detail:");
    for line in &facet.uncovered_line_details {
        let _ = writeln!(out, "     Line {}: {}", line.line_number, line.code);
    }
}

fn write_duplication_details(
    out: &mut String,
    facet: &DuplicationFacet,
    component_key: &str,
    base_url: &str,
) {
    let _ = writeln!(
        out,
        "   Duplicated Line Numbers: {}",
        join_numbers(&facet.duplicated_line_numbers())
    );
    if let Some(url) = duplications_api_url(base_url, component_key) {
        let _ = writeln!(out, "   Duplications API URL: {url}");
    }
    let _ = writeln!(out, "   Duplicated Blocks Detail:");
    for block in &facet.duplicated_block_details {
        let _ = writeln!(
            out,
            "     Duplicate Block {} (Lines {}-{}, Size: {})",
            block.duplicate_id, block.from, block.to, block.size
        );
        let _ = writeln!(out, "     Source: {}", block.source_file);
        let span = (block.from..=block.to).collect::<Vec<_>>();
        let _ = writeln!(out, "     Lines: {}", join_numbers(&span));
        for line in &block.block_code {
            let _ = writeln!(out, "       Line {}: {}", line.line_number, line.code);
        }
        out.push('\n');
    }
}

fn write_single_file(out: &mut String, report: &FileReport, base_url: &str) {
    let _ = writeln!(out, "File: {}", report.file_name);
    let _ = writeln!(out, "Path: {}", report.file_path);
    let _ = writeln!(out, "Component Key: {}", report.component_key);

    if let Some(facet) = &report.coverage {
        let _ = writeln!(out, "Coverage: {:.1}%", facet.coverage);
        let _ = writeln!(out, "Uncovered Lines Count: {}", facet.uncovered_lines);
        if !facet.uncovered_line_details.is_empty() {
            let numbers = facet
                .uncovered_line_details
                .iter()
                .map(|line| line.line_number)
                .collect::<Vec<_>>();
            let _ = writeln!(out, "Uncovered Line Numbers: {}", join_numbers(&numbers));
            out.push('\n');
            let _ = writeln!(out, "Uncovered Lines Detail:");
            for line in &facet.uncovered_line_details {
                let _ = writeln!(out, "Line {}: {}", line.line_number, line.code);
            }
        }
    }

    if let Some(facet) = &report.duplication {
        let _ = writeln!(out, "Duplicated Lines: {}", facet.duplicated_lines);
        let _ = writeln!(out, "Duplicated Blocks: {}", facet.duplicated_blocks);
        let _ = writeln!(out, "Duplication Density: {:.1}%", facet.duplicated_density);
        if !facet.duplicated_block_details.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "Duplicated Blocks Detail:");
            let _ = writeln!(
                out,
                "Duplicated Line Numbers: {}",
                join_numbers(&facet.duplicated_line_numbers())
            );
            for block in &facet.duplicated_block_details {
                out.push('\n');
                let _ = writeln!(
                    out,
                    "Duplicate Block {} (Lines {}-{}, Size: {})",
                    block.duplicate_id, block.from, block.to, block.size
                );
                let _ = writeln!(out, "Source: {}", block.source_file);
                let span = (block.from..=block.to).collect::<Vec<_>>();
                let _ = writeln!(out, "Lines: {}", join_numbers(&span));
                for line in &block.block_code {
                    let _ = writeln!(out, "Line {}: {}", line.line_number, line.code);
                }
            }
        }
    }
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn sources_api_url(base_url: &str, component_key: &str) -> Option<String> {
    let from = SOURCE_LINES_FROM.to_string();
    let to = SOURCE_LINES_TO.to_string();
    endpoint_url(
        base_url,
        "/api/sources/lines",
        &[("key", component_key), ("from", &from), ("to", &to)],
    )
    .ok()
    .map(|url| url.to_string())
}

fn duplications_api_url(base_url: &str, component_key: &str) -> Option<String> {
    endpoint_url(base_url, "/api/duplications/show", &[("key", component_key)])
        .ok()
        .map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{BlockLine, DuplicateBlock, UncoveredLineDetail};

    const BASE_URL: &str = "https://sonar.example.com";

    fn fixed_timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    fn uncovered(line_number: u32, code: &str) -> UncoveredLineDetail {
        UncoveredLineDetail {
            line_number,
            code: code.to_string(),
            line_hits: 0,
            unit_test_hits: 0,
            integration_test_hits: 0,
            conditions: 0,
            covered_conditions: 0,
        }
    }

    fn coverage_report() -> FileReport {
        FileReport {
            file_name: "lib.rs".to_string(),
            file_path: "src/lib.rs".to_string(),
            component_key: "demo:src/lib.rs".to_string(),
            coverage: Some(CoverageFacet {
                coverage: 42.55,
                uncovered_lines: 2,
                uncovered_line_details: vec![uncovered(10, "let x = 1;"), uncovered(15, "x")],
            }),
            duplication: None,
        }
    }

    fn duplication_report() -> FileReport {
        FileReport {
            file_name: "lib.rs".to_string(),
            file_path: "src/lib.rs".to_string(),
            component_key: "demo:src/lib.rs".to_string(),
            coverage: None,
            duplication: Some(DuplicationFacet {
                duplicated_lines: 8,
                duplicated_blocks: 2,
                duplicated_density: 12.34,
                duplicated_block_details: vec![
                    DuplicateBlock {
                        block_id: "0-0".to_string(),
                        from: 5,
                        size: 4,
                        to: 8,
                        duplicate_id: 1,
                        total_duplicates: 2,
                        source_file: "demo:src/lib.rs".to_string(),
                        is_current_file: true,
                        block_code: vec![BlockLine {
                            line_number: 5,
                            code: "dup".to_string(),
                        }],
                    },
                    DuplicateBlock {
                        block_id: "0-1".to_string(),
                        from: 7,
                        size: 4,
                        to: 10,
                        duplicate_id: 1,
                        total_duplicates: 2,
                        source_file: "other:src/copy.rs".to_string(),
                        is_current_file: false,
                        block_code: Vec::new(),
                    },
                ],
            }),
        }
    }

    #[test]
    fn coverage_transcript_has_header_and_numbered_entry() {
        let text = copy_text(
            &[coverage_report()],
            Granularity::AllCoverage,
            BASE_URL,
            fixed_timestamp(),
        );
        assert!(text.starts_with(
            "=== SonarQube Coverage Analysis ===\nTotal Files: 1\nAnalysis Date: 2026-03-14 09:26:53\n\n"
        ));
        assert!(text.contains("1. File: lib.rs"));
        assert!(text.contains("   Coverage: 42.5%"));
        assert!(text.contains("   Uncovered Line Numbers: 10, 15"));
        assert!(text.contains("key=demo%3Asrc%2Flib.rs"));
        assert!(text.contains("     Line 10: let x = 1;"));
    }

    #[test]
    fn duplication_transcript_dedups_line_numbers_across_blocks() {
        let text = copy_text(
            &[duplication_report()],
            Granularity::AllDuplication,
            BASE_URL,
            fixed_timestamp(),
        );
        assert!(text.contains("=== SonarQube Duplication Analysis ==="));
        assert!(text.contains("   Duplication Density: 12.3%"));
        assert!(text.contains("   Duplicated Line Numbers: 5, 6, 7, 8, 9, 10"));
        assert!(text.contains("     Duplicate Block 1 (Lines 5-8, Size: 4)"));
        assert!(text.contains("     Source: other:src/copy.rs"));
        assert!(text.contains("       Line 5: dup"));
    }

    #[test]
    fn combined_transcript_zero_defaults_missing_facets() {
        let text = copy_text(
            &[coverage_report()],
            Granularity::Combined,
            BASE_URL,
            fixed_timestamp(),
        );
        assert!(text.contains("=== SonarQube Complete Analysis ==="));
        assert!(text.contains("   Coverage: 42.5%"));
        assert!(text.contains("   Duplicated Lines: 0"));
        assert!(text.contains("   Duplication Density: 0.0%"));
    }

    #[test]
    fn single_file_form_has_no_header_or_numbering() {
        let text = copy_text(
            &[coverage_report()],
            Granularity::SingleFile,
            BASE_URL,
            fixed_timestamp(),
        );
        assert!(text.starts_with("File: lib.rs\nPath: src/lib.rs\n"));
        assert!(!text.contains("==="));
        assert!(!text.contains("1. File"));
        assert!(text.contains("Uncovered Lines Detail:\nLine 10: let x = 1;"));
    }

    #[test]
    fn identical_inputs_produce_identical_transcripts() {
        let reports = [coverage_report()];
        let first = copy_text(&reports, Granularity::AllCoverage, BASE_URL, fixed_timestamp());
        let second = copy_text(&reports, Granularity::AllCoverage, BASE_URL, fixed_timestamp());
        assert_eq!(first, second);
    }
}
