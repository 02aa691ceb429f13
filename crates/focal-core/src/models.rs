//! Core data models for focal.
//!
//! These types are shared across the focal crates and represent the
//! reconciliation-relevant view of a media record and the signals that
//! feed it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::source::Provenance;
use crate::text;

/// Title sentinel used when no signal can produce a presentable title.
pub const TITLE_UNKNOWN: &str = "Untitled";

/// Quality score at or above which a record counts as reviewed/approved.
pub const QUALITY_APPROVED: i32 = 3;

// =============================================================================
// RECORD
// =============================================================================

/// A media record: the photo entity, reduced to the fields the
/// reconciliation engine reads and writes.
///
/// Unknown camera/lens/cell/place are modeled as `None`, not as sentinel
/// ids. A record is mutated only through the merge, temporal, and title
/// routines plus the orchestrator; nothing else writes to it during a
/// reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Assigned once by the repository; `None` until first persisted.
    pub id: Option<Uuid>,

    pub title: String,
    pub title_source: Provenance,
    pub description: String,
    pub description_source: Provenance,

    /// Absolute capture time. `taken_at_local` is always set alongside it.
    pub taken_at: Option<DateTime<Utc>>,
    pub taken_at_local: Option<NaiveDateTime>,
    /// IANA zone name. `None` when the zone is unknown.
    pub time_zone: Option<String>,
    pub taken_source: Provenance,

    /// Date partition fields derived from local time. `None` = unknown.
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,

    pub latitude: f64,
    pub longitude: f64,
    pub altitude: i32,
    pub location_source: Provenance,
    pub cell: Option<Cell>,
    pub place: Option<Place>,

    pub camera: Option<Camera>,
    pub lens: Option<Lens>,
    pub camera_source: Provenance,
    pub camera_serial: String,
    pub focal_length: i32,
    pub f_number: f32,
    pub iso: i32,
    pub exposure: String,

    /// Derived quality score. Negative marks a hidden/rejected record.
    pub quality: i32,

    pub favorite: bool,
    pub private: bool,

    /// File name the record was indexed under.
    pub name: String,
    /// Original file name before import renaming, if any.
    pub original_name: String,
    /// Directory path the record was indexed under.
    pub path: String,

    /// Free keywords attached to the record (user- and location-derived).
    pub keywords: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a record with safe defaults: sentinel title, unknown
    /// camera/lens/location, lowest-tier provenance on every field.
    pub fn new() -> Self {
        Self {
            id: None,
            title: TITLE_UNKNOWN.to_string(),
            title_source: Provenance::default(),
            description: String::new(),
            description_source: Provenance::default(),
            taken_at: None,
            taken_at_local: None,
            time_zone: None,
            taken_source: Provenance::default(),
            year: None,
            month: None,
            day: None,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0,
            location_source: Provenance::default(),
            cell: None,
            place: None,
            camera: None,
            lens: None,
            camera_source: Provenance::default(),
            camera_serial: String::new(),
            focal_length: 0,
            f_number: 0.0,
            iso: 0,
            exposure: String::new(),
            quality: 0,
            favorite: false,
            private: false,
            name: String::new(),
            original_name: String::new(),
            path: String::new(),
            keywords: Vec::new(),
            created_at: Utc::now(),
            edited_at: None,
            deleted_at: None,
        }
    }

    /// Checks if the record has an assigned id.
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    /// Checks if the record has a title.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    /// Checks if the record has no title.
    pub fn no_title(&self) -> bool {
        self.title.is_empty()
    }

    /// Checks if the record has a description.
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }

    /// Checks if the record has a latitude and longitude.
    pub fn has_lat_lng(&self) -> bool {
        self.latitude != 0.0 || self.longitude != 0.0
    }

    /// Checks if latitude and longitude are missing.
    pub fn no_lat_lng(&self) -> bool {
        !self.has_lat_lng()
    }

    /// Checks if a resolved fine-grained location is loaded.
    pub fn location_loaded(&self) -> bool {
        self.cell.is_some()
    }

    /// Checks if a resolved coarse place is loaded.
    pub fn place_loaded(&self) -> bool {
        self.place.is_some()
    }

    /// Checks if the camera is unknown.
    pub fn unknown_camera(&self) -> bool {
        self.camera.is_none()
    }

    /// Checks if the lens is unknown.
    pub fn unknown_lens(&self) -> bool {
        self.lens.is_none()
    }

    /// Checks if the record has no camera serial number.
    pub fn no_camera_serial(&self) -> bool {
        self.camera_serial.is_empty()
    }

    /// Year of the absolute capture time, if known.
    pub fn taken_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.taken_at.map(|t| t.year())
    }

    /// Year of the local capture time, if known.
    pub fn taken_year_local(&self) -> Option<i32> {
        use chrono::Datelike;
        self.taken_at_local.map(|t| t.year())
    }

    /// Review state derived from quality score and lifecycle timestamps.
    ///
    /// Purged records no longer exist in storage, so a live record is
    /// never in that state.
    pub fn review_status(&self) -> ReviewStatus {
        if self.deleted_at.is_some() {
            ReviewStatus::Archived
        } else if self.quality >= QUALITY_APPROVED {
            ReviewStatus::Approved
        } else {
            ReviewStatus::Pending
        }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "record {}", id),
            None if !self.name.is_empty() => write!(f, "record '{}'", self.name),
            None => write!(f, "record (unsaved)"),
        }
    }
}

/// Review state machine: pending → approved → archived → purged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Quality score below the approval threshold.
    Pending,
    /// Approved explicitly or via score recomputation.
    Approved,
    /// Soft-deleted.
    Archived,
    /// Hard-deleted, terminal.
    Purged,
}

// =============================================================================
// LOCATION TYPES
// =============================================================================

/// Coarse place record (city/country level).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Place {
    /// Checks if the place has no city name.
    pub fn no_city(&self) -> bool {
        self.city.is_empty()
    }

    /// Checks if the city name is too long for a three-part title.
    pub fn long_city(&self) -> bool {
        self.city.chars().count() > 16
    }

    /// Checks if `text` already mentions the city.
    pub fn city_contains(&self, text: &str) -> bool {
        !self.city.is_empty() && text.contains(self.city.as_str())
    }
}

/// Fine-grained location record (neighborhood level), optionally linked
/// to its coarse place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub id: String,
    /// Locality name, e.g. "Central Park".
    pub name: String,
    /// Location category from the geodata source, e.g. "park".
    pub category: String,
    pub place: Option<Place>,
}

impl Cell {
    /// City name from the linked place, empty if unknown.
    pub fn city(&self) -> &str {
        self.place.as_ref().map(|p| p.city.as_str()).unwrap_or("")
    }

    /// Country name from the linked place, empty if unknown.
    pub fn country(&self) -> &str {
        self.place
            .as_ref()
            .map(|p| p.country.as_str())
            .unwrap_or("")
    }

    /// Checks if the cell has no city name.
    pub fn no_city(&self) -> bool {
        self.city().is_empty()
    }

    /// Checks if the city name is too long for a three-part title.
    pub fn long_city(&self) -> bool {
        self.city().chars().count() > 16
    }

    /// Checks if `text` already mentions the city.
    pub fn city_contains(&self, text: &str) -> bool {
        let city = self.city();
        !city.is_empty() && text.contains(city)
    }
}

// =============================================================================
// CAMERA TYPES
// =============================================================================

/// Camera make and model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub make: String,
    pub model: String,
}

impl Camera {
    /// A candidate with neither make nor model represents the unknown
    /// singleton and is never merged.
    pub fn is_unknown(&self) -> bool {
        self.make.is_empty() && self.model.is_empty()
    }
}

/// Lens make and model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    pub make: String,
    pub model: String,
}

impl Lens {
    /// See [`Camera::is_unknown`].
    pub fn is_unknown(&self) -> bool {
        self.make.is_empty() && self.model.is_empty()
    }
}

// =============================================================================
// CLASSIFICATION LABELS
// =============================================================================

/// Maximum uncertainty for a label to qualify as a title label.
pub const TITLE_MAX_UNCERTAINTY: i32 = 60;

/// Maximum uncertainty for a label to contribute keywords.
pub const KEYWORD_MAX_UNCERTAINTY: i32 = 80;

/// Where a label association came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSource {
    /// Image classification model.
    Image,
    /// Derived from a resolved location category.
    Location,
    /// Derived from record keywords.
    Keyword,
    /// Manually assigned.
    Manual,
}

impl LabelSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            LabelSource::Image => "image",
            LabelSource::Location => "location",
            LabelSource::Keyword => "keyword",
            LabelSource::Manual => "manual",
        }
    }
}

impl std::fmt::Display for LabelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classification label with its confidence signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// Priority weight; negative labels are low-value (e.g. generic scenery).
    pub priority: i32,
    /// Uncertainty percentage, 0 (certain) to 100 (useless).
    pub uncertainty: i32,
    pub source: LabelSource,
}

impl Label {
    pub fn new(name: impl Into<String>, priority: i32, uncertainty: i32, source: LabelSource) -> Self {
        Self {
            name: name.into(),
            priority,
            uncertainty,
            source,
        }
    }
}

/// Ranked classification labels, sorted by descending confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Labels(pub Vec<Label>);

impl Labels {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<&Label> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.0.iter()
    }

    /// Pick the best label for a title, or fall back to the given context
    /// string (typically a locality name or file title).
    ///
    /// A label qualifies with priority ≥ 0 and uncertainty ≤ 60. The
    /// fallback is used only when it is 2–25 characters long and carries
    /// no digits.
    pub fn best_title(&self, fallback: &str) -> Option<String> {
        for label in &self.0 {
            if label.priority >= 0
                && label.uncertainty <= TITLE_MAX_UNCERTAINTY
                && !label.name.is_empty()
            {
                return Some(label.name.clone());
            }
        }

        let runes = fallback.chars().count();

        if (2..=25).contains(&runes) && !text::contains_number(fallback) {
            Some(fallback.to_string())
        } else {
            None
        }
    }

    /// Keyword tokens from all labels confident enough to index.
    pub fn keywords(&self) -> Vec<String> {
        let mut out = Vec::new();

        for label in &self.0 {
            if label.priority >= -1 && label.uncertainty <= KEYWORD_MAX_UNCERTAINTY {
                out.extend(text::keywords(&label.name));
            }
        }

        text::unique_words(out)
    }
}

impl From<Vec<Label>> for Labels {
    fn from(labels: Vec<Label>) -> Self {
        Labels(labels)
    }
}

impl IntoIterator for Labels {
    type Item = Label;
    type IntoIter = std::vec::IntoIter<Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// SIGNALS
// =============================================================================

/// GPS coordinates extracted from file metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    /// Latitude in decimal degrees (positive = North).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive = East).
    pub longitude: f64,
    /// Altitude in meters above sea level.
    pub altitude: i32,
}

/// Metadata extracted from the media file, merged with `Meta` provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub taken_at: Option<DateTime<Utc>>,
    pub taken_at_local: Option<NaiveDateTime>,
    pub time_zone: Option<String>,
    pub gps: Option<GpsCoordinates>,
    pub camera: Option<Camera>,
    pub lens: Option<Lens>,
    pub focal_length: i32,
    pub f_number: f32,
    pub iso: i32,
    pub exposure: String,
    pub camera_serial: String,
    /// Embedded title, e.g. from IPTC/XMP.
    pub title: String,
    pub description: String,
}

/// A user-submitted edit, merged with `Manual` provenance.
///
/// `None` fields are untouched by the edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub taken_at_local: Option<NaiveDateTime>,
    pub time_zone: Option<String>,
    pub gps: Option<GpsCoordinates>,
    pub favorite: Option<bool>,
    pub private: Option<bool>,
    pub keywords: Option<Vec<String>>,
}
