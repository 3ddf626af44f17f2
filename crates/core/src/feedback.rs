use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub String);

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feedback exactly as submitted by a user; every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSubmission {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub prediction_id: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub actual_price: Option<Decimal>,
    #[serde(default)]
    pub accuracy_rating: Option<i32>,
    #[serde(default)]
    pub usefulness_rating: Option<i32>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Validated feedback ready to hand to a sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub user_id: String,
    pub prediction_id: Option<String>,
    pub actual_price: Option<Decimal>,
    pub accuracy_rating: Option<i32>,
    pub usefulness_rating: Option<i32>,
    pub comments: Option<String>,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackReceipt {
    pub feedback_id: FeedbackId,
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

impl FeedbackReceipt {
    pub fn accepted(feedback_id: FeedbackId, timestamp: impl Into<String>) -> Self {
        Self {
            feedback_id,
            status: "success".to_string(),
            message: "Thank you for your feedback! Your input helps us improve our predictions."
                .to_string(),
            timestamp: timestamp.into(),
        }
    }
}

impl FeedbackSubmission {
    pub fn validate(self, received_at: DateTime<Utc>) -> Result<FeedbackRecord, DomainError> {
        check_rating("accuracy_rating", self.accuracy_rating)?;
        check_rating("usefulness_rating", self.usefulness_rating)?;
        if matches!(self.actual_price, Some(price) if price <= Decimal::ZERO) {
            return Err(DomainError::invalid_input("actual_price must be greater than 0"));
        }

        let timestamp = self
            .timestamp
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| received_at.to_rfc3339());
        let user_id = self
            .user_id
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "anonymous".to_string());

        Ok(FeedbackRecord {
            user_id,
            prediction_id: self.prediction_id,
            actual_price: self.actual_price,
            accuracy_rating: self.accuracy_rating,
            usefulness_rating: self.usefulness_rating,
            comments: self.comments,
            timestamp,
        })
    }
}

fn check_rating(field: &str, rating: Option<i32>) -> Result<(), DomainError> {
    match rating {
        Some(value) if !RATING_RANGE.contains(&value) => {
            Err(DomainError::invalid_input(format!("{field} must be between 1 and 5")))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{FeedbackId, FeedbackReceipt, FeedbackSubmission};
    use crate::errors::DomainError;

    #[test]
    fn empty_submission_is_anonymous_and_stamped_with_receipt_time() {
        let received_at = Utc.with_ymd_and_hms(2025, 12, 5, 8, 30, 0).single().expect("time");

        let record = FeedbackSubmission::default().validate(received_at).expect("valid");

        assert_eq!(record.user_id, "anonymous");
        assert_eq!(record.timestamp, "2025-12-05T08:30:00+00:00");
    }

    #[test]
    fn caller_timestamp_is_preserved() {
        let submission = FeedbackSubmission {
            timestamp: Some("2025-12-01T10:00:00".to_string()),
            accuracy_rating: Some(5),
            usefulness_rating: Some(1),
            ..FeedbackSubmission::default()
        };

        let record = submission.validate(Utc::now()).expect("valid");

        assert_eq!(record.timestamp, "2025-12-01T10:00:00");
        assert_eq!(record.accuracy_rating, Some(5));
    }

    #[test]
    fn ratings_outside_one_to_five_are_rejected() {
        for (accuracy, usefulness, field) in
            [(Some(0), None, "accuracy_rating"), (Some(3), Some(6), "usefulness_rating")]
        {
            let submission = FeedbackSubmission {
                accuracy_rating: accuracy,
                usefulness_rating: usefulness,
                ..FeedbackSubmission::default()
            };

            let error = submission.validate(Utc::now()).expect_err("rating out of range");
            assert_eq!(
                error,
                DomainError::InvalidInput(format!("{field} must be between 1 and 5"))
            );
        }
    }

    #[test]
    fn non_positive_actual_price_is_rejected() {
        let submission =
            FeedbackSubmission { actual_price: Some(Decimal::ZERO), ..FeedbackSubmission::default() };

        assert!(matches!(
            submission.validate(Utc::now()),
            Err(DomainError::InvalidInput(ref message)) if message.contains("actual_price")
        ));
    }

    #[test]
    fn receipt_reports_success() {
        let receipt = FeedbackReceipt::accepted(FeedbackId("FB-1a2b3c4d".to_string()), "now");

        assert_eq!(receipt.status, "success");
        assert_eq!(receipt.feedback_id.to_string(), "FB-1a2b3c4d");
    }
}
