//! Travel record model and submission payload shapes

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Milliseconds per day, used for trip duration derivation
const MS_PER_DAY: i64 = 86_400_000;

/// Resolved geographic position (latitude/longitude pair)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Who the traveler went with
///
/// Serialized as the display string; `Unspecified` round-trips as `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompanionType {
    Solo,
    Friends,
    Couple,
    Family,
    Colleagues,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl CompanionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompanionType::Solo => "Solo",
            CompanionType::Friends => "Friends",
            CompanionType::Couple => "Couple",
            CompanionType::Family => "Family",
            CompanionType::Colleagues => "Colleagues",
            CompanionType::Unspecified => "",
        }
    }

    /// Parse from the wire/storage string. `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Solo" => Some(CompanionType::Solo),
            "Friends" => Some(CompanionType::Friends),
            "Couple" => Some(CompanionType::Couple),
            "Family" => Some(CompanionType::Family),
            "Colleagues" => Some(CompanionType::Colleagues),
            "" => Some(CompanionType::Unspecified),
            _ => None,
        }
    }
}

/// Spending style for the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BudgetStyle {
    #[serde(rename = "Budget-friendly")]
    BudgetFriendly,
    Comfortable,
    Luxury,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl BudgetStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStyle::BudgetFriendly => "Budget-friendly",
            BudgetStyle::Comfortable => "Comfortable",
            BudgetStyle::Luxury => "Luxury",
            BudgetStyle::Unspecified => "",
        }
    }

    /// Parse from the wire/storage string. `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Budget-friendly" => Some(BudgetStyle::BudgetFriendly),
            "Comfortable" => Some(BudgetStyle::Comfortable),
            "Luxury" => Some(BudgetStyle::Luxury),
            "" => Some(BudgetStyle::Unspecified),
            _ => None,
        }
    }
}

/// A persisted trip entry tied to one traveler, one destination, one
/// date range
///
/// `latitude`/`longitude` are always resolved from `destination_name`
/// by the geocoding client at creation time; a record whose destination
/// cannot be geocoded is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRecord {
    pub id: Uuid,
    /// Traveler name
    pub name: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub destination_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
    /// Rating 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
    #[serde(default)]
    pub companion_type: CompanionType,
    #[serde(default)]
    pub budget_style: BudgetStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memorable_food: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepest_impression_spot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_tips: Option<String>,
    /// Ordered tags; trimmed non-empty strings, duplicates kept
    #[serde(default)]
    pub keyword_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_brief_itinerary: Option<String>,
    /// Absolute or server-relative image URLs
    #[serde(default)]
    pub uploaded_images: Vec<String>,
    /// Trip length in days, derived when both dates are present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Value that arrives as either a single string or a list of strings
/// depending on the client path. Normalized at the ingestion boundary
/// into one canonical sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Flatten into the canonical sequence form
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Rating as submitted: forms send strings, JSON clients send numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatingValue {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Raw record submission as received from a client
///
/// Optional fields default to absent so partial payloads deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordSubmission {
    pub name: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub destination_name: String,
    pub accommodation: Option<String>,
    pub rating: Option<RatingValue>,
    pub highlights: Option<String>,
    pub companion_type: Option<String>,
    pub budget_style: Option<String>,
    pub memorable_food: Option<String>,
    pub deepest_impression_spot: Option<String>,
    pub travel_tips: Option<String>,
    pub keyword_tags: Option<OneOrMany>,
    pub daily_brief_itinerary: Option<String>,
    pub uploaded_images: Option<OneOrMany>,
}

/// Parse a date field into a UTC timestamp in milliseconds
///
/// Accepts plain `YYYY-MM-DD` (taken as midnight UTC) or a full RFC 3339
/// datetime.
pub fn parse_date_ms(value: &str) -> Option<i64> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Derive trip duration in days: ceil((end - start) / one day) + 1
///
/// `None` when either date fails to parse or the end precedes the start.
pub fn duration_days(start_date: &str, end_date: &str) -> Option<i64> {
    let start = parse_date_ms(start_date)?;
    let end = parse_date_ms(end_date)?;
    let delta = end - start;
    if delta < 0 {
        return None;
    }
    Some((delta + MS_PER_DAY - 1) / MS_PER_DAY + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_spans_inclusive_days() {
        assert_eq!(duration_days("2024-01-01", "2024-01-03"), Some(3));
        assert_eq!(duration_days("2024-01-01", "2024-01-01"), Some(1));
    }

    #[test]
    fn duration_absent_for_unparseable_or_reversed_dates() {
        assert_eq!(duration_days("2024-01-01", "not-a-date"), None);
        assert_eq!(duration_days("2024-01-03", "2024-01-01"), None);
    }

    #[test]
    fn duration_rounds_partial_days_up() {
        // 2024-01-01T20:00 -> 2024-01-03T10:00 is 1.58 days, ceil + 1 = 3
        assert_eq!(
            duration_days("2024-01-01T20:00:00Z", "2024-01-03T10:00:00Z"),
            Some(3)
        );
    }

    #[test]
    fn companion_type_round_trips_blank_variant() {
        let json = serde_json::to_string(&CompanionType::Unspecified).unwrap();
        assert_eq!(json, "\"\"");
        let parsed: CompanionType = serde_json::from_str("\"Friends\"").unwrap();
        assert_eq!(parsed, CompanionType::Friends);
        assert_eq!(CompanionType::parse("Colleagues"), Some(CompanionType::Colleagues));
        assert_eq!(CompanionType::parse("Robots"), None);
    }

    #[test]
    fn budget_style_uses_hyphenated_wire_name() {
        let parsed: BudgetStyle = serde_json::from_str("\"Budget-friendly\"").unwrap();
        assert_eq!(parsed, BudgetStyle::BudgetFriendly);
        assert_eq!(BudgetStyle::BudgetFriendly.as_str(), "Budget-friendly");
    }

    #[test]
    fn submission_accepts_string_or_list_for_tags() {
        let single: RecordSubmission =
            serde_json::from_str(r#"{"keywordTags": "beach, food"}"#).unwrap();
        assert!(matches!(single.keyword_tags, Some(OneOrMany::One(_))));

        let many: RecordSubmission =
            serde_json::from_str(r#"{"keywordTags": ["beach", "food"]}"#).unwrap();
        assert_eq!(
            many.keyword_tags.unwrap().into_vec(),
            vec!["beach".to_string(), "food".to_string()]
        );
    }
}
