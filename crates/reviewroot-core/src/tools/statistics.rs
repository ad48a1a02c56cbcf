//! Rating statistics over retrieved reviews

use super::prompts::statistics_prompt;
use super::types::ReviewRecord;
use crate::error::Result;
use crate::llm::Generator;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Prefix of the string returned when the report could not be produced
pub const STATISTICS_FAILED_PREFIX: &str = "Statistics calculation failed: ";

/// Aggregates computed from `ReviewRecord::rating`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatingStats {
    /// All reviews, rated or not
    pub total: usize,
    /// Reviews carrying a rating
    pub rated: usize,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Ratings of 4 and above
    pub positive: usize,
    /// Ratings of 2 and below
    pub negative: usize,
}

impl RatingStats {
    pub fn from_reviews(reviews: &[ReviewRecord]) -> Self {
        let ratings: Vec<f64> = reviews.iter().filter_map(|r| r.rating).collect();

        let (min, max) = ratings.iter().fold((None, None), |(lo, hi), &r| {
            (
                Some(lo.map_or(r, |lo: f64| lo.min(r))),
                Some(hi.map_or(r, |hi: f64| hi.max(r))),
            )
        });

        Self {
            total: reviews.len(),
            rated: ratings.len(),
            average: (!ratings.is_empty())
                .then(|| ratings.iter().sum::<f64>() / ratings.len() as f64),
            min,
            max,
            positive: ratings.iter().filter(|&&r| r >= 4.0).count(),
            negative: ratings.iter().filter(|&&r| r <= 2.0).count(),
        }
    }
}

impl fmt::Display for RatingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total number of reviews: {}", self.total)?;
        writeln!(f, "Rated reviews: {}", self.rated)?;
        match self.average {
            Some(avg) => writeln!(f, "Average rating: {:.2}", avg)?,
            None => writeln!(f, "Average rating: n/a")?,
        }
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => writeln!(f, "Rating range: {:.1} - {:.1}", lo, hi)?,
            _ => writeln!(f, "Rating range: n/a")?,
        }
        writeln!(f, "Positive reviews (4-5): {}", self.positive)?;
        write!(f, "Negative reviews (1-2): {}", self.negative)
    }
}

/// Phrases locally computed rating statistics through the LLM
pub struct StatisticsReporter {
    generator: Arc<dyn Generator>,
}

impl StatisticsReporter {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Statistics report, or the LLM error
    ///
    /// An empty list yields the zero aggregate without an LLM call.
    pub async fn try_report(&self, reviews: &[ReviewRecord]) -> Result<String> {
        let stats = RatingStats::from_reviews(reviews);
        if reviews.is_empty() {
            return Ok(stats.to_string());
        }
        self.generator
            .generate(&statistics_prompt(reviews, &stats))
            .await
    }
}
