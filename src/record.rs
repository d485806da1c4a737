//! Shipment records, map points and record normalization

use std::hash::{Hash, Hasher};

use serde::Serialize;

/// One raw order row as handed over by the ingestion layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipmentRecord {
    pub order_id: Option<String>,
    pub src_lat: Option<f64>,
    pub src_lon: Option<f64>,
    pub dst_lat: Option<f64>,
    pub dst_lon: Option<f64>,
    pub customer_country: Option<String>,
    pub order_country: Option<String>,
}

impl ShipmentRecord {
    /// Record with exact coordinates only
    pub fn with_coords(src: (f64, f64), dst: (f64, f64)) -> Self {
        Self {
            src_lat: Some(src.0),
            src_lon: Some(src.1),
            dst_lat: Some(dst.0),
            dst_lon: Some(dst.1),
            ..Self::default()
        }
    }

    /// Record with country names only
    pub fn with_countries(customer: &str, order: &str) -> Self {
        Self {
            customer_country: Some(customer.to_string()),
            order_country: Some(order.to_string()),
            ..Self::default()
        }
    }

    fn has_any_coordinate(&self) -> bool {
        [self.src_lat, self.src_lon, self.dst_lat, self.dst_lon]
            .iter()
            .any(Option::is_some)
    }

    fn has_any_country(&self) -> bool {
        self.customer_country.is_some() || self.order_country.is_some()
    }
}

/// A (latitude, longitude) pair used both as a route endpoint and as a map key.
///
/// Equality is plain floating-point equality of both coordinates. `Eq` and
/// `Hash` assume finite coordinates: use `try_new` for unvalidated input.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        debug_assert!(
            lat.is_finite() && lon.is_finite(),
            "non-finite point ({lat}, {lon})"
        );
        Self { lat, lon }
    }

    /// Build a point only when both coordinates are finite.
    pub fn try_new(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Self::new(lat, lon))
            }
            _ => None,
        }
    }

    // -0.0 and 0.0 compare equal, so they must hash equal too
    fn key_bits(&self) -> (u64, u64) {
        ((self.lat + 0.0).to_bits(), (self.lon + 0.0).to_bits())
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_bits().hash(state);
    }
}

/// How a record may be resolved to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordClass {
    ExactCoordinate,
    CountryOnly,
    Unusable,
}

/// A validated record. Which of its eligibilities is used is up to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// Position of the record in the input sequence
    pub index: usize,
    pub source: Option<Point>,
    pub destination: Option<Point>,
    pub customer_country: Option<String>,
    pub order_country: Option<String>,
}

impl NormalizedRecord {
    /// Both endpoints carry valid coordinates
    pub fn exact_endpoints(&self) -> Option<(Point, Point)> {
        Some((self.source?, self.destination?))
    }

    /// Both country fields are usable
    pub fn countries(&self) -> Option<(&str, &str)> {
        Some((
            self.customer_country.as_deref()?,
            self.order_country.as_deref()?,
        ))
    }

    pub fn is_exact(&self) -> bool {
        self.exact_endpoints().is_some()
    }

    pub fn is_country_eligible(&self) -> bool {
        self.countries().is_some()
    }

    /// Primary classification; exact coordinates win when both apply.
    pub fn class(&self) -> RecordClass {
        if self.is_exact() {
            RecordClass::ExactCoordinate
        } else if self.is_country_eligible() {
            RecordClass::CountryOnly
        } else {
            RecordClass::Unusable
        }
    }
}

/// Validates raw records and keeps the per-run unusable counter.
#[derive(Debug, Default)]
pub struct Normalizer {
    seen: usize,
    unusable: usize,
    any_coordinate_field: bool,
    any_country_field: bool,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, record: &ShipmentRecord) -> NormalizedRecord {
        let index = self.seen;
        self.seen += 1;
        self.any_coordinate_field |= record.has_any_coordinate();
        self.any_country_field |= record.has_any_country();

        let normalized = NormalizedRecord {
            index,
            source: Point::try_new(record.src_lat, record.src_lon),
            destination: Point::try_new(record.dst_lat, record.dst_lon),
            customer_country: clean_country(record.customer_country.as_deref()),
            order_country: clean_country(record.order_country.as_deref()),
        };

        if normalized.class() == RecordClass::Unusable {
            self.unusable += 1;
            tracing::trace!(index, order_id = ?record.order_id, "malformed record dropped");
        }
        normalized
    }

    pub fn normalize_all(&mut self, records: &[ShipmentRecord]) -> Vec<NormalizedRecord> {
        records.iter().map(|r| self.normalize(r)).collect()
    }

    pub fn records_seen(&self) -> usize {
        self.seen
    }

    pub fn unusable(&self) -> usize {
        self.unusable
    }

    /// True when no record carried a coordinate or a country value at all
    pub fn saw_no_fields(&self) -> bool {
        self.seen > 0 && !self.any_coordinate_field && !self.any_country_field
    }
}

fn clean_country(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
