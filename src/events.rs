// src/events.rs
use serde::Serialize;

use crate::models::PollResponse;

/// Events pushed to an act's viewer room. Create and vote carry the full
/// recomputed tally so clients can render without a follow-up fetch; closure
/// carries only the poll id.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum PollEvent {
    #[serde(rename = "poll:new")]
    New(PollResponse),

    #[serde(rename = "poll:update")]
    Update(PollResponse),

    #[serde(rename = "poll:closed")]
    Closed {
        #[serde(rename = "pollId")]
        poll_id: i32,
    },
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::models::{OptionTally, PollResponse};

    #[test]
    fn closed_event_carries_only_the_poll_id() {
        let event = PollEvent::Closed { poll_id: 7 };

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "event": "poll:closed", "data": { "pollId": 7 } })
        );
    }

    #[test]
    fn update_event_wraps_the_full_tally() {
        let event = PollEvent::Update(PollResponse {
            id: 3,
            act_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            title: String::from("Next map?"),
            description: None,
            is_active: true,
            created_at: Utc::now(),
            ends_at: Utc::now() + Duration::minutes(2),
            total_votes: 1,
            options: vec![OptionTally {
                id: 1,
                text: String::from("A"),
                votes: 1,
                percent: 100,
            }],
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "poll:update");
        assert_eq!(value["data"]["totalVotes"], 1);
        assert_eq!(value["data"]["options"][0]["percent"], 100);
    }
}
