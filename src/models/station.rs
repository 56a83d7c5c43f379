use serde::{Deserialize, Serialize};

/// Metadata embedded in the leading block of a station file.
///
/// Values are carried as the agency publishes them (decimal commas and
/// all); a label whose line had no value field stays `None` and is
/// written out as an empty cell rather than failing the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationMetadata {
    pub city: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl StationMetadata {
    pub fn new(
        city: Option<String>,
        latitude: Option<String>,
        longitude: Option<String>,
    ) -> Self {
        Self {
            city,
            latitude,
            longitude,
        }
    }

    pub fn city_or_empty(&self) -> &str {
        self.city.as_deref().unwrap_or("")
    }

    pub fn latitude_or_empty(&self) -> &str {
        self.latitude.as_deref().unwrap_or("")
    }

    pub fn longitude_or_empty(&self) -> &str {
        self.longitude.as_deref().unwrap_or("")
    }
}
