//! Travel form: raw user input collected into a submission payload

use crate::models::{BudgetStyle, CompanionType, OneOrMany, RatingValue, RecordSubmission};
use crate::{Error, Result};

/// Raw form state for a new trip entry
///
/// Mirrors the add-record form: free-text fields stay strings until the
/// ingestion boundary normalizes them. `daily_entries` holds one
/// description per day; `uploaded_image_urls` are the stored-object URLs
/// returned by the upload endpoint before submission.
#[derive(Debug, Clone, Default)]
pub struct TravelForm {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub destination: String,
    pub accommodation: String,
    pub rating: String,
    pub highlights: String,
    pub companion_type: CompanionType,
    pub budget_style: BudgetStyle,
    pub memorable_food: String,
    pub deepest_impression_spot: String,
    pub travel_tips: String,
    pub keyword_tags: Vec<String>,
    pub daily_entries: Vec<String>,
    pub uploaded_image_urls: Vec<String>,
}

impl TravelForm {
    /// Produce the submission payload, or an error naming the missing
    /// required fields
    pub fn build(&self) -> Result<RecordSubmission> {
        if self.name.trim().is_empty()
            || self.start_date.trim().is_empty()
            || self.destination.trim().is_empty()
        {
            return Err(Error::InvalidInput(
                "Please fill in required fields: Name, Start Date, Destination.".to_string(),
            ));
        }

        Ok(RecordSubmission {
            name: self.name.clone(),
            start_date: self.start_date.clone(),
            end_date: non_empty(&self.end_date),
            destination_name: self.destination.clone(),
            accommodation: non_empty(&self.accommodation),
            rating: non_empty(&self.rating).map(RatingValue::Text),
            highlights: non_empty(&self.highlights),
            companion_type: Some(self.companion_type.as_str().to_string()),
            budget_style: Some(self.budget_style.as_str().to_string()),
            memorable_food: non_empty(&self.memorable_food),
            deepest_impression_spot: non_empty(&self.deepest_impression_spot),
            travel_tips: non_empty(&self.travel_tips),
            keyword_tags: Some(OneOrMany::Many(self.keyword_tags.clone())),
            daily_brief_itinerary: non_empty(&self.combined_itinerary()),
            uploaded_images: Some(OneOrMany::Many(self.uploaded_image_urls.clone())),
        })
    }

    /// Join non-empty day entries as "Day N: {text}" paragraphs
    fn combined_itinerary(&self) -> String {
        self.daily_entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.trim().is_empty())
            .map(|(i, entry)| format!("Day {}: {}", i + 1, entry.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
