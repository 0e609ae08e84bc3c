use serde::{Deserialize, Serialize};

/// Placeholder for text fields whose element was not found on the page
pub const MISSING_TEXT: &str = "N/A";

/// Placeholder for numeric fields whose element was not found on the page
pub const MISSING_NUMBER: i32 = -1;

/// One scraped room listing, serialized as a single CSV row
///
/// Field order is the column order of the output file and must stay in
/// sync with [`ListingData::CSV_HEADERS`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingData {
    pub price_per_week: i64,
    pub beds: i32,
    pub baths: i32,
    pub persons: i32,
    pub room_overview: String,
    pub availability: String,
    pub property_features: String,
    pub property_about: String,
    pub flatmates_about: String,
    pub district: String,
    pub url: String,
}

impl ListingData {
    pub const CSV_HEADERS: [&'static str; 11] = [
        "price_per_week",
        "beds",
        "baths",
        "persons",
        "room_overview",
        "availability",
        "property_features",
        "property_about",
        "flatmates_about",
        "district",
        "url",
    ];

    /// A row with every field set to its sentinel
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            price_per_week: i64::from(MISSING_NUMBER),
            beds: MISSING_NUMBER,
            baths: MISSING_NUMBER,
            persons: MISSING_NUMBER,
            room_overview: MISSING_TEXT.to_string(),
            availability: MISSING_TEXT.to_string(),
            property_features: MISSING_TEXT.to_string(),
            property_about: MISSING_TEXT.to_string(),
            flatmates_about: MISSING_TEXT.to_string(),
            district: MISSING_TEXT.to_string(),
            url: url.into(),
        }
    }

    /// Names of the columns that still hold a sentinel value
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let numbers = [
            ("price_per_week", self.price_per_week == i64::from(MISSING_NUMBER)),
            ("beds", self.beds == MISSING_NUMBER),
            ("baths", self.baths == MISSING_NUMBER),
            ("persons", self.persons == MISSING_NUMBER),
        ];
        let texts = [
            ("room_overview", &self.room_overview),
            ("availability", &self.availability),
            ("property_features", &self.property_features),
            ("property_about", &self.property_about),
            ("flatmates_about", &self.flatmates_about),
            ("district", &self.district),
        ];

        numbers
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| name)
            .chain(
                texts
                    .into_iter()
                    .filter(|(_, value)| value.as_str() == MISSING_TEXT)
                    .map(|(name, _)| name),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_reports_every_field_missing() {
        let listing = ListingData::empty("https://flatmates.com.au/share-house-sydney-1");
        let missing = listing.missing_fields();

        assert_eq!(missing.len(), ListingData::CSV_HEADERS.len() - 1);
        assert!(!missing.contains(&"url"));
    }

    #[test]
    fn populated_fields_are_not_reported() {
        let mut listing = ListingData::empty("https://flatmates.com.au/x");
        listing.price_per_week = 350;
        listing.district = "Newtown".to_string();

        let missing = listing.missing_fields();
        assert!(!missing.contains(&"price_per_week"));
        assert!(!missing.contains(&"district"));
        assert!(missing.contains(&"beds"));
    }
}
