//! Per-country mean coordinates used as fallback route endpoints

use std::collections::HashMap;

use crate::record::{NormalizedRecord, Point};

#[derive(Debug, Default, Clone, Copy)]
struct MeanAccumulator {
    lat_sum: f64,
    lon_sum: f64,
    samples: usize,
}

impl MeanAccumulator {
    fn add(&mut self, point: Point) {
        self.lat_sum += point.lat;
        self.lon_sum += point.lon;
        self.samples += 1;
    }

    /// None when the sums overflowed to a non-finite value
    fn mean(&self) -> Option<Point> {
        let n = self.samples as f64;
        Point::try_new(Some(self.lat_sum / n), Some(self.lon_sum / n))
    }
}

/// Country centroids for the source role (customer country) and the
/// destination role (order country).
#[derive(Debug, Default, Clone)]
pub struct CountryCentroids {
    source: HashMap<String, Point>,
    destination: HashMap<String, Point>,
}

impl CountryCentroids {
    /// Build centroids from every record carrying a valid coordinate for the role.
    ///
    /// A country only gets a centroid if at least one record with that country
    /// has a valid coordinate for the role in question.
    pub fn build(records: &[NormalizedRecord]) -> Self {
        let mut source: HashMap<String, MeanAccumulator> = HashMap::new();
        let mut destination: HashMap<String, MeanAccumulator> = HashMap::new();

        for record in records {
            if let (Some(point), Some(country)) = (record.source, &record.customer_country) {
                source.entry(country.clone()).or_default().add(point);
            }
            if let (Some(point), Some(country)) = (record.destination, &record.order_country) {
                destination.entry(country.clone()).or_default().add(point);
            }
        }

        Self {
            source: finite_means(source),
            destination: finite_means(destination),
        }
    }

    pub fn source(&self, customer_country: &str) -> Option<Point> {
        self.source.get(customer_country).copied()
    }

    pub fn destination(&self, order_country: &str) -> Option<Point> {
        self.destination.get(order_country).copied()
    }

    /// Resolve a (customer country, order country) pair to centroid endpoints.
    pub fn endpoints(&self, customer_country: &str, order_country: &str) -> Option<(Point, Point)> {
        Some((
            self.source(customer_country)?,
            self.destination(order_country)?,
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty() && self.destination.is_empty()
    }

    pub fn country_counts(&self) -> (usize, usize) {
        (self.source.len(), self.destination.len())
    }
}

fn finite_means(sums: HashMap<String, MeanAccumulator>) -> HashMap<String, Point> {
    sums.into_iter()
        .filter_map(|(country, acc)| Some((country, acc.mean()?)))
        .collect()
}
