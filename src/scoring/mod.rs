//! Relevance scoring for candidate records
//!
//! The score is a fixed-weight sum of rating, review volume and listing
//! completeness, rounded to four decimals. Malformed inputs contribute zero.

use crate::feed::CandidateRecord;
use url::Url;

/// Weights of each score component; they sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub rating: f64,
    pub reviews: f64,
    pub address: f64,
    pub thumbnail: f64,
    pub hours: f64,
}

pub const WEIGHTS: ScoreWeights = ScoreWeights {
    rating: 0.4,
    reviews: 0.3,
    address: 0.1,
    thumbnail: 0.1,
    hours: 0.1,
};

/// Highest rating the feed uses
const MAX_RATING: f64 = 5.0;

/// Computes the normalized relevance of a record, in [0, 1]
pub fn score(record: &CandidateRecord) -> f64 {
    let raw = WEIGHTS.rating * rating_fraction(record.rating)
        + WEIGHTS.reviews * review_volume(record.review_count)
        + WEIGHTS.address * presence(has_address(record))
        + WEIGHTS.thumbnail * presence(has_thumbnail(record))
        + WEIGHTS.hours * presence(has_structured_hours(record));

    round4(raw.clamp(0.0, 1.0))
}

/// Attaches `score_normalized` to every record
pub fn score_all(records: &mut [CandidateRecord]) {
    for record in records.iter_mut() {
        record.score_normalized = Some(score(record));
    }
}

fn rating_fraction(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) if r.is_finite() => (r / MAX_RATING).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// `log10(reviews + 1) / 3`, saturating at 1000 reviews
fn review_volume(reviews: Option<u64>) -> f64 {
    let reviews = reviews.unwrap_or(0) as f64;
    ((reviews + 1.0).log10() / 3.0).min(1.0)
}

fn has_address(record: &CandidateRecord) -> bool {
    record
        .address
        .as_deref()
        .is_some_and(|a| !a.trim().is_empty())
}

fn has_thumbnail(record: &CandidateRecord) -> bool {
    record
        .thumbnail_url
        .as_deref()
        .is_some_and(|t| Url::parse(t.trim()).is_ok())
}

fn has_structured_hours(record: &CandidateRecord) -> bool {
    record
        .operating_hours
        .as_ref()
        .is_some_and(|h| h.is_structured())
}

fn presence(present: bool) -> f64 {
    if present {
        1.0
    } else {
        0.0
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
