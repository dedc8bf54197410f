use crate::window_aggregator::Verdict;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Body of one POST to the report sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub class_id: u32,
    pub class_name: String,
    pub confidence: f64,
    pub timestamp: String,
}

impl Report {
    pub fn from_verdict(
        verdict: &Verdict,
        category_names: &BTreeMap<u32, String>,
        timezone: chrono::FixedOffset,
    ) -> Self {
        let class_name = category_names
            .get(&verdict.category_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());

        Self {
            class_id: verdict.category_id,
            class_name,
            confidence: round_to_millis(verdict.confidence),
            timestamp: verdict
                .decided_at
                .with_timezone(&timezone)
                .to_rfc3339_opts(SecondsFormat::Millis, false),
        }
    }
}

fn round_to_millis(confidence: f32) -> f64 {
    (f64::from(confidence) * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn names() -> BTreeMap<u32, String> {
        BTreeMap::from([(2, "Super Smash Bros.".to_string())])
    }

    fn jst() -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn test_builds_payload() {
        let verdict = Verdict {
            category_id: 2,
            confidence: 0.876_54,
            decided_at: Utc.with_ymd_and_hms(2026, 10, 19, 3, 4, 5).unwrap(),
        };

        let report = Report::from_verdict(&verdict, &names(), jst());

        assert_eq!(
            report,
            Report {
                class_id: 2,
                class_name: "Super Smash Bros.".to_string(),
                confidence: 0.877,
                timestamp: "2026-10-19T12:04:05.000+09:00".to_string(),
            }
        );
    }

    #[test]
    fn test_unmapped_category_is_unknown() {
        let verdict = Verdict {
            category_id: 99,
            confidence: 0.5,
            decided_at: Utc::now(),
        };
        let report = Report::from_verdict(&verdict, &names(), jst());
        assert_eq!(report.class_name, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_json_field_names() {
        let verdict = Verdict {
            category_id: 2,
            confidence: 0.9,
            decided_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        };
        let report = Report::from_verdict(&verdict, &names(), jst());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "class_id": 2,
                "class_name": "Super Smash Bros.",
                "confidence": 0.9,
                "timestamp": "2026-01-02T12:04:05.000+09:00",
            })
        );
    }
}
