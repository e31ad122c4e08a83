//! Clinic service-rating dashboard
//!
//! Each rating is five answers. Four questions are satisfaction scales scored
//! 4 (very satisfied) down to 1 (very unsatisfied) and averaged per rating;
//! the waiting-time question is reported as a percentage per bucket.

use crate::domain::{MomConnectError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Questions asked per rating
pub const QUESTIONS_PER_RATING: u64 = 5;

/// One stored answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingResponse {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Question {
    Friendliness,
    WaitingTimesFeel,
    WaitingTimesLength,
    Cleanliness,
    Privacy,
}

impl Question {
    const SATISFACTION: [Question; 4] = [
        Question::Friendliness,
        Question::WaitingTimesFeel,
        Question::Cleanliness,
        Question::Privacy,
    ];

    fn key(self) -> &'static str {
        match self {
            Question::Friendliness => "question_1_friendliness",
            Question::WaitingTimesFeel => "question_2_waiting_times_feel",
            Question::WaitingTimesLength => "question_3_waiting_times_length",
            Question::Cleanliness => "question_4_cleanliness",
            Question::Privacy => "question_5_privacy",
        }
    }
}

impl FromStr for Question {
    type Err = MomConnectError;

    fn from_str(s: &str) -> Result<Self> {
        [
            Question::Friendliness,
            Question::WaitingTimesFeel,
            Question::WaitingTimesLength,
            Question::Cleanliness,
            Question::Privacy,
        ]
        .into_iter()
        .find(|q| q.key() == s)
        .ok_or_else(|| MomConnectError::Validation(format!("Unknown rating question '{s}'")))
    }
}

/// Satisfaction answers with their scores
const SATISFACTION_SCORES: [(&str, u64); 4] = [
    ("very-satisfied", 4),
    ("satisfied", 3),
    ("not-satisfied", 2),
    ("very-unsatisfied", 1),
];

/// Waiting-time answers and the report key each one is published under
const WAITING_TIME_BUCKETS: [(&str, &str); 4] = [
    ("less-than-an-hour", "less_than_an_hour"),
    ("between-1-and-3-hours", "between_1_and_3_hours"),
    ("more-than-4-hours", "more_than_4_hours"),
    ("all-day", "all_day"),
];

/// Aggregated dashboard figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingDashboard {
    pub num_ratings: u64,
    /// Mean score per satisfaction question
    pub averages: BTreeMap<String, f64>,
    /// Percentage of ratings per waiting-time bucket
    pub waiting_times: BTreeMap<String, f64>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Builds the dashboard from every stored answer
///
/// With no answers at all every figure is zero.
///
/// # Errors
///
/// `MomConnectError::Validation` for an unknown question or answer.
pub fn build_dashboard(responses: &[RatingResponse]) -> Result<RatingDashboard> {
    let mut counts: BTreeMap<(Question, String), u64> = BTreeMap::new();

    for response in responses {
        let question: Question = response.key.parse()?;
        let allowed = match question {
            Question::WaitingTimesLength => WAITING_TIME_BUCKETS
                .iter()
                .any(|(answer, _)| *answer == response.value),
            _ => SATISFACTION_SCORES
                .iter()
                .any(|(answer, _)| *answer == response.value),
        };
        if !allowed {
            return Err(MomConnectError::Validation(format!(
                "Unknown answer '{}' to {}",
                response.value, response.key
            )));
        }
        *counts
            .entry((question, response.value.clone()))
            .or_default() += 1;
    }

    let total = responses.len() as u64;
    let num_ratings = total.div_ceil(QUESTIONS_PER_RATING);
    let count = |question: Question, answer: &str| -> u64 {
        counts
            .get(&(question, answer.to_string()))
            .copied()
            .unwrap_or(0)
    };
    let per_rating = |value: f64| -> f64 {
        if num_ratings == 0 {
            0.0
        } else {
            round1(value / num_ratings as f64)
        }
    };

    let averages = Question::SATISFACTION
        .iter()
        .map(|&question| {
            let score: u64 = SATISFACTION_SCORES
                .iter()
                .map(|(answer, weight)| count(question, answer) * weight)
                .sum();
            (question.key().to_string(), per_rating(score as f64))
        })
        .collect();

    let waiting_times = WAITING_TIME_BUCKETS
        .iter()
        .map(|(answer, key)| {
            let n = count(Question::WaitingTimesLength, answer) as f64;
            (key.to_string(), per_rating(n * 100.0))
        })
        .collect();

    Ok(RatingDashboard {
        num_ratings,
        averages,
        waiting_times,
    })
}
