use serde::{Deserialize, Serialize};

/// One leaf source file as listed by the measures API.
///
/// `key` is the opaque identifier every follow-up query uses. A metric absent
/// from `measures` means "not applicable", never zero; the extractor supplies
/// the zero default.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSummary {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub measures: Vec<Measure>,
}

/// A named metric value, optionally scoped to a delta window inside `period`.
#[derive(Debug, Clone, Deserialize)]
pub struct Measure {
    pub metric: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub period: Option<MeasurePeriod>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasurePeriod {
    #[serde(default)]
    pub value: Option<String>,
}

/// One annotated source line from the sources API. `line_hits` is absent on
/// lines that carry no executable code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLine {
    pub line: u32,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub line_hits: Option<u32>,
    #[serde(default)]
    pub ut_line_hits: Option<u32>,
    #[serde(default)]
    pub it_line_hits: Option<u32>,
    #[serde(default)]
    pub conditions: Option<u32>,
    #[serde(default)]
    pub covered_conditions: Option<u32>,
}

/// One duplication group: a set of mutually identical line ranges, possibly
/// spanning files.
#[derive(Debug, Clone, Deserialize)]
pub struct DuplicationGroup {
    #[serde(default)]
    pub blocks: Vec<DuplicationBlockRef>,
}

/// A member range of a duplication group. `file_ref`, when present, names the
/// component the duplicated code actually lives in.
#[derive(Debug, Clone, Deserialize)]
pub struct DuplicationBlockRef {
    pub from: u32,
    pub size: u32,
    #[serde(default, rename = "_ref")]
    pub file_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UncoveredLineDetail {
    pub line_number: u32,
    pub code: String,
    pub line_hits: u32,
    pub unit_test_hits: u32,
    pub integration_test_hits: u32,
    pub conditions: u32,
    pub covered_conditions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockLine {
    pub line_number: u32,
    pub code: String,
}

/// One contiguous duplicated range within a file's report.
///
/// Invariant: `to - from + 1 == size`. `block_id` values are unique within one
/// report only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateBlock {
    pub block_id: String,
    pub from: u32,
    pub size: u32,
    pub to: u32,
    pub duplicate_id: u32,
    pub total_duplicates: u32,
    pub source_file: String,
    pub is_current_file: bool,
    pub block_code: Vec<BlockLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageFacet {
    pub coverage: f64,
    pub uncovered_lines: u32,
    pub uncovered_line_details: Vec<UncoveredLineDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicationFacet {
    pub duplicated_lines: u32,
    pub duplicated_blocks: u32,
    pub duplicated_density: f64,
    pub duplicated_block_details: Vec<DuplicateBlock>,
}

impl DuplicationFacet {
    /// Every line covered by any block, deduplicated, ascending.
    #[must_use]
    pub fn duplicated_line_numbers(&self) -> Vec<u32> {
        let mut lines: Vec<u32> = self
            .duplicated_block_details
            .iter()
            .flat_map(|block| block.from..=block.to)
            .collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }
}

/// The unit of output: one analyzed file. A coverage run fills `coverage`, a
/// duplication run fills `duplication`, the combined mode fills both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file_name: String,
    pub file_path: String,
    pub component_key: String,
    #[serde(flatten)]
    pub coverage: Option<CoverageFacet>,
    #[serde(flatten)]
    pub duplication: Option<DuplicationFacet>,
}

/// Downstream message envelope: either the report list or a failure reason.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<FileReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisOutcome {
    #[must_use]
    pub fn ok(reports: Vec<FileReport>) -> Self {
        Self {
            success: true,
            data: Some(reports),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn component_summary_tolerates_missing_optional_fields() {
        let component: ComponentSummary = serde_json::from_value(json!({
            "key": "demo:src/lib.rs"
        }))
        .expect("deserialize");
        assert_eq!(component.key, "demo:src/lib.rs");
        assert!(component.name.is_empty());
        assert!(component.measures.is_empty());
    }

    #[test]
    fn duplication_block_ref_reads_underscore_ref() {
        let block: DuplicationBlockRef = serde_json::from_value(json!({
            "from": 12,
            "size": 6,
            "_ref": "2"
        }))
        .expect("deserialize");
        assert_eq!(block.file_ref.as_deref(), Some("2"));
    }

    #[test]
    fn duplicated_line_numbers_dedup_overlapping_blocks() {
        let facet = DuplicationFacet {
            duplicated_lines: 8,
            duplicated_blocks: 2,
            duplicated_density: 12.5,
            duplicated_block_details: vec![
                block_span("0-0", 5, 4),
                block_span("1-0", 7, 3),
            ],
        };
        assert_eq!(facet.duplicated_line_numbers(), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn file_report_serializes_flat_camel_case_fields() {
        let report = FileReport {
            file_name: "lib.rs".to_string(),
            file_path: "src/lib.rs".to_string(),
            component_key: "demo:src/lib.rs".to_string(),
            coverage: Some(CoverageFacet {
                coverage: 42.5,
                uncovered_lines: 2,
                uncovered_line_details: Vec::new(),
            }),
            duplication: None,
        };
        let value = serde_json::to_value(&report).expect("serialize");
        assert_eq!(value["fileName"], "lib.rs");
        assert_eq!(value["coverage"], 42.5);
        assert_eq!(value["uncoveredLines"], 2);
        assert!(value.get("duplicatedLines").is_none());
    }

    fn block_span(id: &str, from: u32, size: u32) -> DuplicateBlock {
        DuplicateBlock {
            block_id: id.to_string(),
            from,
            size,
            to: from + size - 1,
            duplicate_id: 1,
            total_duplicates: 2,
            source_file: "demo:src/lib.rs".to_string(),
            is_current_file: true,
            block_code: Vec::new(),
        }
    }
}
