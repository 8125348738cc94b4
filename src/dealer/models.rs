//! Data models for scraped vehicles.

use serde::{Deserialize, Serialize};

/// Placeholder for text fields the page did not provide.
pub const UNKNOWN: &str = "N/A";

/// One vehicle as written to the output file.
///
/// Every field is always present; fields the detail page did not provide
/// carry the defaults documented on [`VehicleDraft::finish`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Absolute URL of the detail page
    pub link_details: String,
    /// Cleaned listing title
    pub name: String,
    pub brand: String,
    pub model_base: String,
    pub version_details: String,
    /// Asking price in BRL
    pub price: f64,
    /// "YYYY" or "YYYY/YYYY" (manufacture/model year)
    pub year: String,
    /// Odometer reading
    pub km: u64,
    pub transmission_type: String,
    pub fuel_type: String,
    pub color: String,
    pub doors: u32,
    pub options: Vec<String>,
    pub description: String,
    pub main_image_url: String,
    /// Gallery images, no duplicates
    pub photos: Vec<String>,
}

impl VehicleRecord {
    /// Returns true when the page yielded a model year.
    pub fn has_year(&self) -> bool {
        self.year != UNKNOWN
    }
}

/// A write-once slot: the first value stored wins, later writes are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T>(Option<T>);

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> Slot<T> {
    /// Stores `value` unless the slot is already filled. Returns whether it was stored.
    pub fn set(&mut self, value: T) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(value);
        true
    }

    /// Stores the value if one is given and the slot is still empty.
    pub fn set_opt(&mut self, value: Option<T>) -> bool {
        match value {
            Some(v) => self.set(v),
            None => false,
        }
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

/// Vehicle fields as they are being extracted from a detail page.
#[derive(Debug, Default)]
pub struct VehicleDraft {
    pub name: Slot<String>,
    pub brand: Slot<String>,
    pub model_base: Slot<String>,
    pub version_details: Slot<String>,
    pub price: Slot<f64>,
    pub year: Slot<String>,
    pub km: Slot<u64>,
    pub transmission_type: Slot<String>,
    pub fuel_type: Slot<String>,
    pub color: Slot<String>,
    pub doors: Slot<u32>,
    pub options: Slot<Vec<String>>,
    pub description: Slot<String>,
    pub main_image_url: Slot<String>,
    pub photos: Slot<Vec<String>>,
}

impl VehicleDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the documented defaults and produces the final record.
    ///
    /// Text fields fall back to `"N/A"` (name, brand, model, year,
    /// transmission, fuel, color) or to the empty string (version,
    /// description, main image). Numbers fall back to zero and lists to empty.
    /// An empty gallery is seeded with the main image when there is one.
    pub fn finish(self, link_details: impl Into<String>) -> VehicleRecord {
        let na = |slot: Slot<String>| slot.into_inner().unwrap_or_else(|| UNKNOWN.to_string());

        let main_image_url = self.main_image_url.into_inner().unwrap_or_default();
        let mut photos = self.photos.into_inner().unwrap_or_default();
        if photos.is_empty() && !main_image_url.is_empty() {
            photos.push(main_image_url.clone());
        }

        VehicleRecord {
            link_details: link_details.into(),
            name: na(self.name),
            brand: na(self.brand),
            model_base: na(self.model_base),
            version_details: self.version_details.into_inner().unwrap_or_default(),
            price: self.price.into_inner().unwrap_or(0.0),
            year: na(self.year),
            km: self.km.into_inner().unwrap_or(0),
            transmission_type: na(self.transmission_type),
            fuel_type: na(self.fuel_type),
            color: na(self.color),
            doors: self.doors.into_inner().unwrap_or(0),
            options: self.options.into_inner().unwrap_or_default(),
            description: self.description.into_inner().unwrap_or_default(),
            main_image_url,
            photos,
        }
    }
}
