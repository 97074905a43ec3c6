use log::warn;

use crate::client::MetricsApi;
use crate::models::{BlockLine, DuplicateBlock, DuplicationGroup, SourceLine, UncoveredLineDetail};
use crate::text::strip_markup;
use crate::throttle::Throttle;

/// Exactly the lines with zero execution hits, in original order.
///
/// Lines without a hit count carry no executable code and are never
/// uncovered. Markup is stripped from the source text here, once.
#[must_use]
pub fn uncovered_lines_from_sources(sources: &[SourceLine]) -> Vec<UncoveredLineDetail> {
    sources
        .iter()
        .filter(|line| line.line_hits == Some(0))
        .map(|line| UncoveredLineDetail {
            line_number: line.line,
            code: line.code.as_deref().map(strip_markup).unwrap_or_default(),
            line_hits: 0,
            unit_test_hits: line.ut_line_hits.unwrap_or(0),
            integration_test_hits: line.it_line_hits.unwrap_or(0),
            conditions: line.conditions.unwrap_or(0),
            covered_conditions: line.covered_conditions.unwrap_or(0),
        })
        .collect()
}

/// Fetches and filters one file's uncovered lines. Any fetch failure is
/// logged and yields an empty list so a single file cannot abort the batch.
pub fn enrich_uncovered(api: &impl MetricsApi, component_key: &str) -> Vec<UncoveredLineDetail> {
    match api.fetch_source_lines(component_key) {
        Ok(sources) => uncovered_lines_from_sources(&sources),
        Err(err) => {
            warn!("source lines unavailable for {component_key}: {err}");
            Vec::new()
        }
    }
}

/// Expands duplication groups into per-block records with their source text.
///
/// Each block's code comes from its origin component (the current file when
/// the block carries no explicit reference). A failed per-block fetch is
/// logged and leaves that block's code empty without discarding its metadata.
/// The throttle pauses after every block fetch; this loop is strictly
/// sequential.
pub fn collect_duplicate_blocks(
    api: &impl MetricsApi,
    throttle: &Throttle,
    groups: &[DuplicationGroup],
    component_key: &str,
) -> Vec<DuplicateBlock> {
    let mut blocks = Vec::new();
    for (group_idx, group) in groups.iter().enumerate() {
        for (block_idx, block_ref) in group.blocks.iter().enumerate() {
            let source_file = block_ref
                .file_ref
                .clone()
                .unwrap_or_else(|| component_key.to_string());
            let to = (block_ref.from + block_ref.size).saturating_sub(1);
            let block_code = match api.fetch_source_lines(&source_file) {
                Ok(sources) => slice_block_code(&sources, block_ref.from, to),
                Err(err) => {
                    warn!("source unavailable for duplicate block in {source_file}: {err}");
                    Vec::new()
                }
            };
            blocks.push(DuplicateBlock {
                block_id: format!("{group_idx}-{block_idx}"),
                from: block_ref.from,
                size: block_ref.size,
                to,
                duplicate_id: u32::try_from(group_idx + 1).unwrap_or(u32::MAX),
                total_duplicates: u32::try_from(group.blocks.len()).unwrap_or(u32::MAX),
                is_current_file: source_file == component_key,
                source_file,
                block_code,
            });
            throttle.pause();
        }
    }
    blocks
}

fn slice_block_code(sources: &[SourceLine], from: u32, to: u32) -> Vec<BlockLine> {
    sources
        .iter()
        .filter(|line| line.line >= from && line.line <= to)
        .map(|line| BlockLine {
            line_number: line.line,
            code: line.code.as_deref().map(strip_markup).unwrap_or_default(),
        })
        .collect()
}
