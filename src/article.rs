// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::doi;

/// One literature entry as the hub stores it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub doi: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub protein: String,
    #[serde(default)]
    pub hardness: FlagValue,
    #[serde(default)]
    pub whc: FlagValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ArticleRecord {
    pub fn new(doi: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            doi: doi.into(),
            title: title.into(),
            protein: String::new(),
            hardness: FlagValue::default(),
            whc: FlagValue::default(),
            timestamp: None,
        }
    }

    /// Normalized DOI used for every duplicate comparison.
    pub fn key(&self) -> String {
        doi::normalize(&self.doi)
    }
}

/// Gel hardness / water holding capacity. Some sheets carry a yes/no
/// flag, others a measurement note, so both shapes are kept.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FlagValue {
    Flag(bool),
    Text(String),
}

impl Default for FlagValue {
    fn default() -> Self {
        FlagValue::Flag(false)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Flag(value)
    }
}

impl FlagValue {
    pub fn is_set(&self) -> bool {
        match self {
            FlagValue::Flag(flag) => *flag,
            FlagValue::Text(text) => !text.trim().is_empty(),
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Flag(true) => write!(f, "Yes"),
            FlagValue::Flag(false) => write!(f, "No"),
            FlagValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// How spreadsheet cells for the hardness/WHC columns are read.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FlagPolicy {
    /// `yes`, `y`, `true`, `1` and `x` are set, anything else is not.
    #[default]
    Boolean,
    /// Non-empty cells are kept verbatim.
    FreeText,
}

impl FlagPolicy {
    pub fn interpret(self, cell: &str) -> FlagValue {
        let cell = cell.trim();
        match self {
            FlagPolicy::Boolean => {
                let set = matches!(
                    cell.to_lowercase().as_str(),
                    "yes" | "y" | "true" | "1" | "x"
                );
                FlagValue::Flag(set)
            }
            FlagPolicy::FreeText if cell.is_empty() => FlagValue::Flag(false),
            FlagPolicy::FreeText => FlagValue::Text(cell.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_policy_reads_common_spellings() {
        let policy = FlagPolicy::Boolean;
        assert_eq!(policy.interpret("Yes"), FlagValue::Flag(true));
        assert_eq!(policy.interpret(" TRUE "), FlagValue::Flag(true));
        assert_eq!(policy.interpret("1"), FlagValue::Flag(true));
        assert_eq!(policy.interpret("No"), FlagValue::Flag(false));
        assert_eq!(policy.interpret("12.5 N"), FlagValue::Flag(false));
        assert_eq!(policy.interpret(""), FlagValue::Flag(false));
    }

    #[test]
    fn free_text_policy_keeps_notes() {
        let policy = FlagPolicy::FreeText;
        assert_eq!(policy.interpret("12.5 N"), FlagValue::Text("12.5 N".into()));
        assert_eq!(policy.interpret("  "), FlagValue::Flag(false));
        assert!(policy.interpret("No").is_set());
    }

    #[test]
    fn flags_serialize_as_bare_json_values() {
        let mut record = ArticleRecord::new("10.1000/a", "Gel");
        record.hardness = true.into();
        record.whc = FlagValue::Text("high".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["hardness"], serde_json::json!(true));
        assert_eq!(json["whc"], serde_json::json!("high"));
        assert!(json.get("timestamp").is_none());

        let back: ArticleRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn key_is_normalized() {
        let record = ArticleRecord::new("https://doi.org/10.1000/ABC", "");
        assert_eq!(record.key(), "10.1000/abc");
    }
}
