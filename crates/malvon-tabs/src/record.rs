//! Persisted form of tabs and tab groups
//!
//! Records carry no renderer and no configuration; both are supplied again
//! when a record is turned back into a live [`Tab`](crate::Tab).

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::group::DEFAULT_TAB_GROUP_ICON;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub is_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabGroupRecord {
    pub name: String,
    pub tabs: Vec<TabRecord>,
    pub selected_index: i64,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    DEFAULT_TAB_GROUP_ICON.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_group_document_format() {
        let record = TabGroupRecord {
            name: "Work".to_string(),
            tabs: vec![
                TabRecord {
                    title: "Docs".to_string(),
                    url: Some("https://docs.rs".to_string()),
                    is_empty: false,
                },
                TabRecord {
                    title: "New Tab".to_string(),
                    url: None,
                    is_empty: true,
                },
            ],
            selected_index: 0,
            color: Some(Color::MINT),
            icon: "briefcase".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "name": "Work",
                "tabs": [
                    {"title": "Docs", "url": "https://docs.rs", "isEmpty": false},
                    {"title": "New Tab", "isEmpty": true}
                ],
                "selectedIndex": 0,
                "color": "00C7BECC",
                "icon": "briefcase"
            })
        );
    }

    #[test]
    fn test_optional_fields_default() {
        let record: TabGroupRecord = serde_json::from_str(
            r#"{"name":"Old","tabs":[{"title":"Untitled Tab"}],"selectedIndex":-1}"#,
        )
        .unwrap();

        assert_eq!(record.color, None);
        assert_eq!(record.icon, DEFAULT_TAB_GROUP_ICON);
        assert_eq!(record.tabs[0].url, None);
        assert!(!record.tabs[0].is_empty);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let result = serde_json::from_str::<TabGroupRecord>(r#"{"name":"Broken","tabs":[]}"#);
        assert!(result.is_err());
    }
}
