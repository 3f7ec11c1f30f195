// models.rs
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{self, ApiError};

pub const OPTION_LIMITS: RangeInclusive<usize> = 2..=5;
pub const BIDDING_TIME_LIMITS: RangeInclusive<i64> = 1..=60;
pub const TITLE_LIMITS: RangeInclusive<usize> = 1..=300;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Act {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub is_live: bool,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Poll {
    pub id: i32,
    pub act_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct PollOption {
    pub id: i32,
    pub poll_id: i32,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct PollVote {
    pub id: i32,
    pub poll_id: i32,
    pub user_id: Uuid,
    pub option_id: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub title: String,
    pub description: Option<String>,
    pub options: Vec<String>,
    pub bidding_time: i64,
}

impl CreatePollRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let title_len = self.title.trim().len();
        if !TITLE_LIMITS.contains(&title_len) {
            return Err(error::title_invalid_size(TITLE_LIMITS, title_len));
        }
        if !OPTION_LIMITS.contains(&self.options.len()) {
            return Err(error::option_count_invalid(OPTION_LIMITS, self.options.len()));
        }
        if !BIDDING_TIME_LIMITS.contains(&self.bidding_time) {
            return Err(error::bidding_time_invalid(BIDDING_TIME_LIMITS, self.bidding_time));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub option_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub id: i32,
    pub text: String,
    pub votes: i64,
    pub percent: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: i32,
    pub act_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub total_votes: i64,
    pub options: Vec<OptionTally>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(options: usize, bidding_time: i64) -> CreatePollRequest {
        CreatePollRequest {
            title: String::from("Pick one"),
            description: None,
            options: (0..options).map(|i| format!("Option {i}")).collect(),
            bidding_time,
        }
    }

    #[test]
    fn accepts_in_range_requests() {
        assert!(request(2, 1).validate().is_ok());
        assert!(request(5, 60).validate().is_ok());
    }

    #[test]
    fn rejects_bad_option_counts() {
        assert!(request(1, 10).validate().is_err());
        assert!(request(6, 10).validate().is_err());
    }

    #[test]
    fn rejects_bad_bidding_times() {
        assert!(request(3, 0).validate().is_err());
        assert!(request(3, 61).validate().is_err());
    }

    #[test]
    fn rejects_blank_titles() {
        let mut req = request(2, 10);
        req.title = String::from("   ");
        assert!(req.validate().is_err());
    }
}
