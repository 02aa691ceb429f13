//! Multi-strategy title synthesis from location, labels, and file names.
//!
//! Strategies are tried in order: fine location (cell) with a label or
//! locality/city composition, coarse place, then label/file-name
//! fallbacks, ending at the "Untitled" sentinel. Every composed title is
//! committed through the merge engine with `Auto` provenance, so a manual
//! title set concurrently still wins.

use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Labels, Record, TITLE_UNKNOWN};
use crate::source::Provenance;
use crate::text;

/// File titles longer than this are used verbatim, without a year suffix.
const FILE_TITLE_YEAR_MAX: usize = 20;

/// Join non-empty title segments with " / ".
fn compose(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" / ")
}

impl Record {
    /// Derive a title candidate from the record's file name and/or path.
    ///
    /// Camera-generated names (`IMG_1234`-style) never produce a title.
    pub fn file_title(&self) -> String {
        if !text::is_generated(&self.name) {
            let title = text::file_title(&self.name);
            if !title.is_empty() {
                return title;
            }
        }

        if !self.original_name.is_empty() {
            if !text::is_generated(&self.original_name) {
                let title = text::file_title(&self.original_name);
                if !title.is_empty() {
                    return title;
                }
            }

            // The original's directory often names the event.
            let dir = Path::new(&self.original_name)
                .parent()
                .and_then(|p| p.to_str())
                .unwrap_or("");
            let title = text::file_title(dir);
            if !title.is_empty() {
                return title;
            }
        }

        if !self.path.is_empty() && !text::is_generated(&self.path) {
            return text::file_title(&self.path);
        }

        String::new()
    }

    /// Synthesize and commit a title from location and classification
    /// signals.
    ///
    /// Fails with [`Error::TitleLocked`] when a non-empty title is owned
    /// by a source stronger than automatic; such titles are immutable to
    /// this routine.
    pub fn update_title(&mut self, labels: &Labels) -> Result<()> {
        if self.title_source > Provenance::Auto && self.has_title() {
            return Err(Error::TitleLocked(self.id.unwrap_or_default()));
        }

        let old_title = self.title.clone();
        let file_title = self.file_title();
        let year = self
            .taken_year()
            .map(|y| y.to_string())
            .unwrap_or_default();

        let mut known_location = false;

        if let Some(cell) = self.cell.clone() {
            known_location = true;

            if let Some(label) = labels.best_title(&cell.name) {
                debug!(label = %label, "using label to create title");

                if cell.no_city() || cell.long_city() || cell.city_contains(&label) {
                    self.set_title(
                        &compose(&[&text::title_case(&label), cell.country(), &year]),
                        Provenance::Auto,
                    );
                } else {
                    self.set_title(
                        &compose(&[&text::title_case(&label), cell.city(), &year]),
                        Provenance::Auto,
                    );
                }
            } else if !cell.name.is_empty() && !cell.city().is_empty() {
                let name_len = cell.name.chars().count();

                if name_len > 45 {
                    self.set_title(&text::title_case(&cell.name), Provenance::Auto);
                } else if name_len > 20 || cell.long_city() || cell.name.contains(cell.city()) {
                    self.set_title(&compose(&[&cell.name, &year]), Provenance::Auto);
                } else {
                    self.set_title(
                        &compose(&[&cell.name, cell.city(), &year]),
                        Provenance::Auto,
                    );
                }
            } else if !cell.city().is_empty() && !cell.country().is_empty() {
                if cell.city().chars().count() > 20 {
                    self.set_title(&compose(&[cell.city(), &year]), Provenance::Auto);
                } else {
                    self.set_title(
                        &compose(&[cell.city(), cell.country(), &year]),
                        Provenance::Auto,
                    );
                }
            }
        } else if let Some(place) = self.place.clone() {
            known_location = true;

            if let Some(label) = labels.best_title(&file_title) {
                debug!(label = %label, "using label to create title");

                if place.no_city() || place.long_city() || place.city_contains(&label) {
                    self.set_title(
                        &compose(&[&text::title_case(&label), &place.country, &year]),
                        Provenance::Auto,
                    );
                } else {
                    self.set_title(
                        &compose(&[&text::title_case(&label), &place.city, &year]),
                        Provenance::Auto,
                    );
                }
            } else if !place.city.is_empty() && !place.country.is_empty() {
                if place.city.chars().count() > 20 {
                    self.set_title(&compose(&[&place.city, &year]), Provenance::Auto);
                } else {
                    self.set_title(
                        &compose(&[&place.city, &place.country, &year]),
                        Provenance::Auto,
                    );
                }
            }
        }

        if !known_location || self.no_title() {
            let label_usable = labels
                .first()
                .map(|l| l.priority >= -1 && l.uncertainty <= 85 && !l.name.is_empty())
                .unwrap_or(false);

            if file_title.is_empty() && label_usable {
                let label = labels.first().map(|l| l.name.as_str()).unwrap_or_default();

                if self.taken_source != Provenance::Auto {
                    self.set_title(
                        &compose(&[&text::title_case(label), &year]),
                        Provenance::Auto,
                    );
                } else {
                    self.set_title(&text::title_case(label), Provenance::Auto);
                }
            } else if !file_title.is_empty()
                && file_title.chars().count() <= FILE_TITLE_YEAR_MAX
                && self.taken_at_local.is_some()
                && self.taken_source != Provenance::Auto
            {
                let local_year = self
                    .taken_year_local()
                    .map(|y| y.to_string())
                    .unwrap_or_default();

                self.set_title(&compose(&[&file_title, &local_year]), Provenance::Auto);
            } else if !file_title.is_empty() {
                self.set_title(&file_title, Provenance::Auto);
            } else if self.taken_source != Provenance::Auto {
                self.set_title(&compose(&[TITLE_UNKNOWN, &year]), Provenance::Auto);
            } else {
                self.set_title(TITLE_UNKNOWN, Provenance::Auto);
            }
        }

        if self.title != old_title {
            debug!(record = %self, title = %self.title, "changed title");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Label, LabelSource, Place};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn label(name: &str, priority: i32, uncertainty: i32) -> Label {
        Label::new(name, priority, uncertainty, LabelSource::Image)
    }

    fn new_york_cell() -> Cell {
        Cell {
            id: "us:centralpark".to_string(),
            name: "Central Park".to_string(),
            category: "park".to_string(),
            place: Some(Place {
                id: "us:newyork".to_string(),
                city: "New York".to_string(),
                state: "NY".to_string(),
                country: "United States".to_string(),
            }),
        }
    }

    fn record_taken_in(year: i32) -> Record {
        let mut record = Record::new();
        record.title = String::new();
        record.taken_at = Some(Utc.with_ymd_and_hms(year, 6, 1, 12, 0, 0).unwrap());
        record.taken_at_local = Some(
            NaiveDate::from_ymd_opt(year, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        record.taken_source = crate::source::Provenance::Meta;
        record
    }

    #[test]
    fn test_title_from_location_and_label() {
        let mut record = record_taken_in(2020);
        record.cell = Some(new_york_cell());

        let labels = Labels(vec![label("Bridge", 0, 40)]);
        record.update_title(&labels).unwrap();

        assert_eq!(record.title, "Bridge / New York / 2020");
        assert_eq!(record.title_source, Provenance::Auto);
    }

    #[test]
    fn test_title_label_with_long_city_uses_country() {
        let mut record = record_taken_in(2020);
        let mut cell = new_york_cell();
        if let Some(place) = cell.place.as_mut() {
            place.city = "Llanfairpwllgwyngyll".to_string();
            place.country = "United Kingdom".to_string();
        }
        record.cell = Some(cell);

        let labels = Labels(vec![label("Bridge", 0, 40)]);
        record.update_title(&labels).unwrap();

        assert_eq!(record.title, "Bridge / United Kingdom / 2020");
    }

    #[test]
    fn test_title_label_already_containing_city_uses_country() {
        let mut record = record_taken_in(2020);
        record.cell = Some(new_york_cell());

        let labels = Labels(vec![label("New York Skyline", 0, 40)]);
        record.update_title(&labels).unwrap();

        assert_eq!(record.title, "New York Skyline / United States / 2020");
    }

    #[test]
    fn test_title_from_locality_fallback() {
        // No qualifying label: the locality name itself becomes the label.
        let mut record = record_taken_in(2019);
        record.cell = Some(new_york_cell());

        record.update_title(&Labels::default()).unwrap();

        assert_eq!(record.title, "Central Park / New York / 2019");
    }

    #[test]
    fn test_title_long_locality_two_part_form() {
        let mut record = record_taken_in(2019);
        let mut cell = new_york_cell();
        cell.name = "Friedrichshain Volkspark Rosengarten".to_string();
        record.cell = Some(cell);

        record.update_title(&Labels::default()).unwrap();

        // Locality >25 chars fails the label fallback, >20 chars drops
        // the city segment.
        assert_eq!(
            record.title,
            "Friedrichshain Volkspark Rosengarten / 2019"
        );
    }

    #[test]
    fn test_title_very_long_locality_used_alone() {
        let mut record = record_taken_in(2019);
        let mut cell = new_york_cell();
        cell.name = "An Exceedingly Long Locality Name That Keeps Going".to_string();
        record.cell = Some(cell);

        record.update_title(&Labels::default()).unwrap();

        assert_eq!(
            record.title,
            "An Exceedingly Long Locality Name That Keeps Going"
        );
    }

    #[test]
    fn test_title_city_country_when_no_locality() {
        let mut record = record_taken_in(2019);
        let mut cell = new_york_cell();
        cell.name = String::new();
        record.cell = Some(cell);

        record.update_title(&Labels::default()).unwrap();

        assert_eq!(record.title, "New York / United States / 2019");
    }

    #[test]
    fn test_title_from_place_with_file_title_context() {
        let mut record = record_taken_in(2018);
        record.name = "wedding in rome.jpg".to_string();
        record.place = Some(Place {
            id: "it:rome".to_string(),
            city: "Rome".to_string(),
            state: String::new(),
            country: "Italy".to_string(),
        });

        record.update_title(&Labels::default()).unwrap();

        // "Wedding In Rome" acts as the label; it already mentions the
        // city, so the country is used instead.
        assert_eq!(record.title, "Wedding In Rome / Italy / 2018");
    }

    #[test]
    fn test_title_from_place_city_country() {
        let mut record = record_taken_in(2018);
        record.name = "IMG_1234.jpg".to_string();
        record.place = Some(Place {
            id: "it:rome".to_string(),
            city: "Rome".to_string(),
            state: String::new(),
            country: "Italy".to_string(),
        });

        record.update_title(&Labels::default()).unwrap();

        assert_eq!(record.title, "Rome / Italy / 2018");
    }

    #[test]
    fn test_title_fallback_short_file_name_with_local_year() {
        let mut record = record_taken_in(2019);
        record.name = "Wedding.jpg".to_string();

        record.update_title(&Labels::default()).unwrap();

        assert_eq!(record.title, "Wedding / 2019");
    }

    #[test]
    fn test_title_fallback_long_file_name_verbatim() {
        let mut record = record_taken_in(2019);
        record.name = "our summer vacation at the baltic sea.jpg".to_string();

        record.update_title(&Labels::default()).unwrap();

        assert_eq!(record.title, "Our Summer Vacation At The Baltic Sea");
    }

    #[test]
    fn test_title_fallback_label_with_year() {
        let mut record = record_taken_in(2019);
        record.name = "IMG_1234.jpg".to_string();

        let labels = Labels(vec![label("Sunset", -1, 70)]);
        record.update_title(&labels).unwrap();

        assert_eq!(record.title, "Sunset / 2019");
    }

    #[test]
    fn test_title_fallback_label_without_year_for_auto_time() {
        let mut record = record_taken_in(2019);
        record.name = "IMG_1234.jpg".to_string();
        record.taken_source = Provenance::Auto;

        let labels = Labels(vec![label("Sunset", -1, 70)]);
        record.update_title(&labels).unwrap();

        assert_eq!(record.title, "Sunset");
    }

    #[test]
    fn test_title_fallback_rejects_weak_label() {
        let mut record = record_taken_in(2019);
        record.name = "IMG_1234.jpg".to_string();

        let labels = Labels(vec![label("noise", -2, 70)]);
        record.update_title(&labels).unwrap();

        assert_eq!(record.title, "Untitled / 2019");
    }

    #[test]
    fn test_title_untitled_sentinel_without_signals() {
        let mut record = Record::new();
        record.title = String::new();

        record.update_title(&Labels::default()).unwrap();

        assert_eq!(record.title, TITLE_UNKNOWN);
        assert!(record.has_title(), "title is never empty after synthesis");
    }

    #[test]
    fn test_title_locked_by_manual_source() {
        let mut record = record_taken_in(2020);
        record.set_title("My Wedding", Provenance::Manual);
        record.cell = Some(new_york_cell());

        let labels = Labels(vec![label("Bridge", 0, 40)]);
        let result = record.update_title(&labels);

        assert!(matches!(result, Err(Error::TitleLocked(_))));
        assert_eq!(record.title, "My Wedding");
    }

    #[test]
    fn test_title_resynthesis_over_auto_title() {
        let mut record = record_taken_in(2020);
        record.cell = Some(new_york_cell());

        record
            .update_title(&Labels(vec![label("Bridge", 0, 40)]))
            .unwrap();
        assert_eq!(record.title, "Bridge / New York / 2020");

        // Better classification arrives; the auto title is refreshed.
        record
            .update_title(&Labels(vec![label("Bow Bridge", 0, 10)]))
            .unwrap();
        assert_eq!(record.title, "Bow Bridge / New York / 2020");
    }

    #[test]
    fn test_title_meta_title_replaced_by_synthesis() {
        // Automatic classification ranks above file metadata, so an
        // embedded title does not survive synthesis.
        let mut record = record_taken_in(2020);
        record.set_title("OLYMPUS DIGITAL CAMERA", Provenance::Meta);
        record.cell = Some(new_york_cell());

        record
            .update_title(&Labels(vec![label("Bridge", 0, 40)]))
            .unwrap();

        assert_eq!(record.title, "Bridge / New York / 2020");
    }

    #[test]
    fn test_title_idempotent() {
        let mut record = record_taken_in(2020);
        record.cell = Some(new_york_cell());
        let labels = Labels(vec![label("Bridge", 0, 40)]);

        record.update_title(&labels).unwrap();
        let first = record.title.clone();

        record.update_title(&labels).unwrap();
        assert_eq!(record.title, first);
    }

    #[test]
    fn test_title_missing_year_omitted() {
        let mut record = Record::new();
        record.title = String::new();
        record.cell = Some(new_york_cell());

        record
            .update_title(&Labels(vec![label("Bridge", 0, 40)]))
            .unwrap();

        assert_eq!(record.title, "Bridge / New York");
    }

    #[test]
    fn test_file_title_prefers_name_over_path() {
        let mut record = Record::new();
        record.name = "beach sunset.jpg".to_string();
        record.path = "2019/summer".to_string();

        assert_eq!(record.file_title(), "Beach Sunset");
    }

    #[test]
    fn test_file_title_from_original_name_directory() {
        let mut record = Record::new();
        record.name = "IMG_1234.jpg".to_string();
        record.original_name = "rome trip/IMG_1234.jpg".to_string();

        assert_eq!(record.file_title(), "Rome Trip");
    }

    #[test]
    fn test_file_title_from_path_as_last_resort() {
        let mut record = Record::new();
        record.name = "IMG_1234.jpg".to_string();
        record.path = "2019/city lights".to_string();

        assert_eq!(record.file_title(), "City Lights");
    }

    #[test]
    fn test_file_title_empty_for_generated_names() {
        let mut record = Record::new();
        record.name = "IMG_1234.jpg".to_string();

        assert_eq!(record.file_title(), "");
    }
}
