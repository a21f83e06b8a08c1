use anyhow::Result;
use serde::Deserialize;

/// One row of the precomputed summary-statistics artifact.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct YearStat {
    pub year: String,
    pub student_count: u64,
}

/// One step of the data-processing pipeline, as published by the last
/// pipeline run.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PipelineStep {
    pub id: String,
    pub label: String,
    pub status: StepStatus,
}

/// Step state. Statuses this build does not know about deserialize as
/// `Unknown` and render like `Pending`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

pub fn parse_available_years(json: &str) -> Result<Vec<String>> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_summary_stats(json: &str) -> Result<Vec<YearStat>> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_pipeline_graph(json: &str) -> Result<Vec<PipelineStep>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_available_years() {
        let years = parse_available_years(r#"["2021", "2022", "2023"]"#).unwrap();
        assert_eq!(years, ["2021", "2022", "2023"]);
    }

    #[test]
    fn test_parse_summary_stats() {
        let json = r#"[
            {"year": "2021", "student_count": 46923847},
            {"year": "2022", "student_count": 47365021}
        ]"#;

        let stats = parse_summary_stats(json).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].year, "2021");
        assert_eq!(stats[0].student_count, 46923847);
    }

    #[test]
    fn test_parse_pipeline_graph() {
        let json = r#"[
            {"id": "download", "label": "Download raw census", "status": "completed"},
            {"id": "sanitize", "label": "Sanitize records", "status": "error"},
            {"id": "publish", "label": "Publish artifacts", "status": "pending"}
        ]"#;

        let steps = parse_pipeline_graph(json).unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].status, StepStatus::Completed);
        assert_eq!(steps[1].status, StepStatus::Error);
        assert_eq!(steps[2].status, StepStatus::Pending);
    }

    #[test]
    fn test_parse_unrecognized_status() {
        let json = r#"[{"id": "x", "label": "X", "status": "running"}]"#;
        let steps = parse_pipeline_graph(json).unwrap();
        assert_eq!(steps[0].status, StepStatus::Unknown);
    }

    #[test]
    fn test_parse_malformed_json_is_an_error() {
        assert!(parse_pipeline_graph("{not json").is_err());
        assert!(parse_available_years(r#"{"years": []}"#).is_err());
    }
}
