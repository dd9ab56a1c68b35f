//! 解析結果レポート
//!
//! ストアのスナップショットをcamelCaseのJSONレポートへ書き出す

use std::path::Path;

use serde::Serialize;

use image_ai_common::Item;

use crate::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    pub items: Vec<ReportRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub file_name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn build_report(items: &[Item], instruction: &str) -> Report {
    Report {
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        instruction: if instruction.is_empty() {
            None
        } else {
            Some(instruction.to_string())
        },
        items: items
            .iter()
            .map(|item| ReportRow {
                file_name: item.display_name.clone(),
                status: item.state.as_str().to_string(),
                description: item.state.description().map(str::to_string),
                error: item.state.error_message().map(str::to_string),
            })
            .collect(),
    }
}

pub fn save_report(report: &Report, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_ai_common::{AnalysisState, ImageData};

    fn item(name: &str, state: AnalysisState) -> Item {
        let mut item = Item::new(name, ImageData::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg"));
        item.state = state;
        item
    }

    #[test]
    fn test_build_report_maps_states() {
        let items = vec![
            item(
                "a.jpg",
                AnalysisState::Done {
                    description: "街並み".to_string(),
                },
            ),
            item(
                "b.jpg",
                AnalysisState::Failed {
                    message: "タイムアウト".to_string(),
                },
            ),
        ];

        let report = build_report(&items, "建物に注目して");
        assert_eq!(report.instruction.as_deref(), Some("建物に注目して"));
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].status, "done");
        assert_eq!(report.items[0].description.as_deref(), Some("街並み"));
        assert_eq!(report.items[0].error, None);
        assert_eq!(report.items[1].status, "failed");
        assert_eq!(report.items[1].error.as_deref(), Some("タイムアウト"));
    }

    #[test]
    fn test_report_json_skips_absent_fields() {
        let items = vec![item(
            "a.jpg",
            AnalysisState::Done {
                description: "夕景".to_string(),
            },
        )];
        let report = build_report(&items, "");

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"fileName\":\"a.jpg\""));
        assert!(json.contains("\"generatedAt\""));
        assert!(!json.contains("\"instruction\""));
        assert!(!json.contains("\"error\""));
    }
}
