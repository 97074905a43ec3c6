use crate::models::Measure;

pub const METRIC_COVERAGE: &str = "coverage";
pub const METRIC_UNCOVERED_LINES: &str = "uncovered_lines";
pub const METRIC_DUPLICATED_LINES: &str = "duplicated_lines";
pub const METRIC_DUPLICATED_LINES_DENSITY: &str = "duplicated_lines_density";
pub const METRIC_DUPLICATED_BLOCKS: &str = "duplicated_blocks";

pub const COVERAGE_METRIC_KEYS: &[&str] = &[METRIC_COVERAGE, METRIC_UNCOVERED_LINES];
pub const DUPLICATION_METRIC_KEYS: &[&str] = &[
    METRIC_DUPLICATED_LINES,
    METRIC_DUPLICATED_LINES_DENSITY,
    METRIC_DUPLICATED_BLOCKS,
];

/// Which slot of a measure to read: the overall value or the delta-window
/// (`period`) value carried by `new_`-prefixed metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MeasureScope {
    #[default]
    Overall,
    NewCode,
}

fn raw_value<'a>(measures: &'a [Measure], metric: &str, scope: MeasureScope) -> Option<&'a str> {
    let measure = measures.iter().find(|m| m.metric == metric)?;
    match scope {
        MeasureScope::Overall => measure.value.as_deref(),
        MeasureScope::NewCode => measure.period.as_ref()?.value.as_deref(),
    }
}

/// Ratio metrics (`coverage`, `duplicated_lines_density`). Absent metric,
/// absent value, or a failed parse all yield `0.0`. No rounding here;
/// presentation rounds to one decimal.
#[must_use]
pub fn measure_f64(measures: &[Measure], metric: &str, scope: MeasureScope) -> f64 {
    raw_value(measures, metric, scope)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Count metrics (`uncovered_lines`, `duplicated_lines`, `duplicated_blocks`).
#[must_use]
pub fn measure_u32(measures: &[Measure], metric: &str, scope: MeasureScope) -> u32 {
    raw_value(measures, metric, scope)
        .and_then(|value| value.trim().parse::<u32>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn measures(value: serde_json::Value) -> Vec<Measure> {
        serde_json::from_value(value).expect("measure fixture")
    }

    #[test]
    fn absent_metric_defaults_to_zero() {
        let fixture = measures(json!([{"metric": "coverage", "value": "80.0"}]));
        assert_eq!(
            measure_u32(&fixture, METRIC_UNCOVERED_LINES, MeasureScope::Overall),
            0
        );
        assert_eq!(measure_f64(&[], METRIC_COVERAGE, MeasureScope::Overall), 0.0);
    }

    #[test]
    fn absent_value_and_garbage_default_to_zero() {
        let fixture = measures(json!([
            {"metric": "coverage"},
            {"metric": "uncovered_lines", "value": "n/a"}
        ]));
        assert_eq!(measure_f64(&fixture, METRIC_COVERAGE, MeasureScope::Overall), 0.0);
        assert_eq!(
            measure_u32(&fixture, METRIC_UNCOVERED_LINES, MeasureScope::Overall),
            0
        );
    }

    #[test]
    fn overall_scope_reads_scalar_value() {
        let fixture = measures(json!([{"metric": "coverage", "value": "42.5"}]));
        assert_eq!(measure_f64(&fixture, METRIC_COVERAGE, MeasureScope::Overall), 42.5);
    }

    #[test]
    fn new_code_scope_reads_period_value_only() {
        let fixture = measures(json!([{
            "metric": "new_coverage",
            "value": "88.0",
            "period": {"value": "61.3"}
        }]));
        assert_eq!(
            measure_f64(&fixture, "new_coverage", MeasureScope::NewCode),
            61.3
        );
        let without_period = measures(json!([{"metric": "new_coverage", "value": "88.0"}]));
        assert_eq!(
            measure_f64(&without_period, "new_coverage", MeasureScope::NewCode),
            0.0
        );
    }

    #[test]
    fn integer_metrics_parse_as_integers() {
        let fixture = measures(json!([{"metric": "duplicated_blocks", "value": "7"}]));
        assert_eq!(
            measure_u32(&fixture, METRIC_DUPLICATED_BLOCKS, MeasureScope::Overall),
            7
        );
    }
}
