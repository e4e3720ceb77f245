use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// A single daily close for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("price series is empty")]
    Empty,
    #[error("price on {0} is not a positive number")]
    NonPositivePrice(NaiveDate),
    #[error("price series is not strictly ascending at {0}")]
    OutOfOrder(NaiveDate),
}

/// Non-empty run of price points, strictly ascending by date, all prices
/// positive and finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        if points.is_empty() {
            return Err(SeriesError::Empty);
        }
        for point in &points {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(SeriesError::NonPositivePrice(point.date));
            }
        }
        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::OutOfOrder(pair[1].date));
            }
        }
        Ok(Self { points })
    }

    /// Stable-sorts by date and drops later duplicates of a date before
    /// validating.
    pub fn from_unordered(mut points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self::new(points)
    }

    /// One-point series. The caller guarantees a positive price.
    pub fn single(point: PricePoint) -> Self {
        debug_assert!(point.price > 0.0);
        Self { points: vec![point] }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    /// Point with the smallest absolute day distance to `target`; ties go to
    /// the earliest point.
    pub fn closest_to(&self, target: NaiveDate) -> &PricePoint {
        let mut best = self.first();
        let mut best_distance = (best.date - target).num_days().abs();

        for point in &self.points[1..] {
            let distance = (point.date - target).num_days().abs();
            if distance < best_distance {
                best = point;
                best_distance = distance;
            }
        }
        best
    }
}
