//! Field merge engine: per-field setters with priority-based conflict
//! resolution.
//!
//! Every setter follows the same contract: invalid candidates (empty
//! strings, zero coordinates, non-positive measurements) are dropped, a
//! candidate from a source ranked below the field's current source is
//! dropped unless the field is still empty (bootstrap), and on accept the
//! value and its source are stored together. Setters return whether the
//! stored value actually changed, never block, and never touch any field
//! other than their own.

use tracing::debug;

use crate::models::{Camera, Lens, Record};
use crate::source::Provenance;
use crate::text;

impl Record {
    /// Set the title, clipped to the title limit.
    pub fn set_title(&mut self, title: &str, source: Provenance) -> bool {
        let new_title = text::clip(title, text::CLIP_TITLE);

        if new_title.is_empty() {
            return false;
        }

        if source < self.title_source && self.has_title() {
            debug!(
                field = "title",
                source = %source,
                current_source = %self.title_source,
                "merge rejected by priority"
            );
            return false;
        }

        let changed = self.title != new_title || self.title_source != source;

        self.title = new_title;
        self.title_source = source;

        changed
    }

    /// Set the description, clipped to the description limit.
    pub fn set_description(&mut self, description: &str, source: Provenance) -> bool {
        let new_desc = text::clip(description, text::CLIP_DESCRIPTION);

        if new_desc.is_empty() {
            return false;
        }

        if source < self.description_source && self.has_description() {
            return false;
        }

        let changed = self.description != new_desc || self.description_source != source;

        self.description = new_desc;
        self.description_source = source;

        changed
    }

    /// Set latitude, longitude and altitude as one triple.
    ///
    /// A candidate with both latitude and longitude exactly zero is
    /// invalid; a zero altitude is fine.
    pub fn set_coordinates(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: i32,
        source: Provenance,
    ) -> bool {
        if latitude == 0.0 && longitude == 0.0 {
            debug!(field = "coordinates", source = %source, "zero coordinates rejected");
            return false;
        }

        if source < self.location_source && self.has_lat_lng() {
            return false;
        }

        let changed = self.latitude != latitude
            || self.longitude != longitude
            || self.altitude != altitude
            || self.location_source != source;

        self.latitude = latitude;
        self.longitude = longitude;
        self.altitude = altitude;
        self.location_source = source;

        changed
    }

    /// Set the camera reference.
    pub fn set_camera(&mut self, camera: Camera, source: Provenance) -> bool {
        if camera.is_unknown() {
            return false;
        }

        if source < self.camera_source && !self.unknown_camera() {
            return false;
        }

        let changed = self.camera.as_ref() != Some(&camera) || self.camera_source != source;

        self.camera = Some(camera);
        self.camera_source = source;

        changed
    }

    /// Set the lens reference.
    ///
    /// Lens candidates are ranked against the camera source; the lens does
    /// not track a source of its own.
    pub fn set_lens(&mut self, lens: Lens, source: Provenance) -> bool {
        if lens.is_unknown() {
            return false;
        }

        if source < self.camera_source && !self.unknown_lens() {
            return false;
        }

        let changed = self.lens.as_ref() != Some(&lens);

        self.lens = Some(lens);

        changed
    }

    /// Merge exposure details. Each sub-field is merged independently:
    /// a candidate wins when the source ranks at least as high as the
    /// camera source, or when the current value is still empty/non-positive.
    pub fn set_exposure(
        &mut self,
        focal_length: i32,
        f_number: f32,
        iso: i32,
        exposure: &str,
        source: Provenance,
    ) -> bool {
        let has_priority = source >= self.camera_source;
        let mut changed = false;

        if focal_length > 0 && (has_priority || self.focal_length <= 0) {
            changed |= self.focal_length != focal_length;
            self.focal_length = focal_length;
        }

        if f_number > 0.0 && (has_priority || self.f_number <= 0.0) {
            changed |= self.f_number != f_number;
            self.f_number = f_number;
        }

        if iso > 0 && (has_priority || self.iso <= 0) {
            changed |= self.iso != iso;
            self.iso = iso;
        }

        if !exposure.is_empty() && (has_priority || self.exposure.is_empty()) {
            changed |= self.exposure != exposure;
            self.exposure = exposure.to_string();
        }

        changed
    }

    /// Set the camera serial number. First write wins; later candidates
    /// are ignored regardless of source.
    pub fn set_camera_serial(&mut self, serial: &str) -> bool {
        let val = text::clip(serial, text::CLIP_VARCHAR);

        if self.no_camera_serial() && !val.is_empty() {
            self.camera_serial = val;
            return true;
        }

        false
    }
}
