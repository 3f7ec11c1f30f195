// src/tally.rs
use crate::models::{OptionTally, Poll, PollOption, PollResponse, PollVote};

/// Recompute the full tally for a poll from its raw rows. Counts always
/// reflect exactly the votes passed in; nothing is cached between reads.
pub fn format_poll(poll: Poll, options: Vec<PollOption>, votes: &[PollVote]) -> PollResponse {
    let total_votes = votes.len() as i64;

    let options = options
        .into_iter()
        .map(|option| {
            let count = votes.iter().filter(|v| v.option_id == option.id).count() as i64;
            OptionTally {
                id: option.id,
                text: option.text,
                votes: count,
                percent: percent(count, total_votes),
            }
        })
        .collect();

    PollResponse {
        id: poll.id,
        act_id: poll.act_id,
        created_by: poll.created_by,
        title: poll.title,
        description: poll.description,
        is_active: poll.is_active,
        created_at: poll.created_at,
        ends_at: poll.ends_at,
        total_votes,
        options,
    }
}

fn percent(votes: i64, total: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (votes as f64 / total as f64 * 100.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;

    fn sample_poll() -> Poll {
        Poll {
            id: 1,
            act_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            title: String::from("Which route should we take?"),
            description: None,
            is_active: true,
            created_at: Utc::now(),
            ends_at: Utc::now() + Duration::minutes(5),
        }
    }

    fn option(id: i32, text: &str) -> PollOption {
        PollOption {
            id,
            poll_id: 1,
            text: String::from(text),
        }
    }

    fn vote(id: i32, option_id: i32) -> PollVote {
        PollVote {
            id,
            poll_id: 1,
            user_id: Uuid::new_v4(),
            option_id,
        }
    }

    #[test]
    fn no_votes_yields_zero_percentages() {
        let formatted = format_poll(sample_poll(), vec![option(1, "A"), option(2, "B")], &[]);

        assert_eq!(formatted.total_votes, 0);
        assert!(formatted.options.iter().all(|o| o.votes == 0 && o.percent == 0));
    }

    #[test]
    fn tally_follows_votes() {
        let formatted = format_poll(
            sample_poll(),
            vec![option(1, "A"), option(2, "B")],
            &[vote(1, 1)],
        );
        assert_eq!(formatted.total_votes, 1);
        assert_eq!(formatted.options[0].votes, 1);
        assert_eq!(formatted.options[0].percent, 100);
        assert_eq!(formatted.options[1].votes, 0);
        assert_eq!(formatted.options[1].percent, 0);

        let formatted = format_poll(
            sample_poll(),
            vec![option(1, "A"), option(2, "B")],
            &[vote(1, 1), vote(2, 2)],
        );
        assert_eq!(formatted.options[0].percent, 50);
        assert_eq!(formatted.options[1].percent, 50);
    }

    #[test]
    fn votes_sum_to_total() {
        let votes = [vote(1, 1), vote(2, 1), vote(3, 2), vote(4, 3)];
        let formatted = format_poll(
            sample_poll(),
            vec![option(1, "A"), option(2, "B"), option(3, "C")],
            &votes,
        );

        let sum: i64 = formatted.options.iter().map(|o| o.votes).sum();
        assert_eq!(sum, formatted.total_votes);
    }

    #[test]
    fn percentages_round_independently() {
        // 1/3 and 2/3 round to 33 and 67; they need not sum to 100
        let votes = [vote(1, 1), vote(2, 2), vote(3, 2)];
        let formatted = format_poll(sample_poll(), vec![option(1, "A"), option(2, "B")], &votes);

        assert_eq!(formatted.options[0].percent, 33);
        assert_eq!(formatted.options[1].percent, 67);
    }

    #[test]
    fn options_keep_their_insertion_order() {
        let formatted = format_poll(
            sample_poll(),
            vec![option(1, "first"), option(2, "second"), option(3, "third")],
            &[],
        );

        let texts: Vec<&str> = formatted.options.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }
}
