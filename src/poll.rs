// src/poll.rs
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tokio::time;
use tracing::{error, info};
use uuid::Uuid;

use crate::acts;
use crate::error::{self, ApiError};
use crate::events::PollEvent;
use crate::models::{CreatePollRequest, Poll, PollOption, PollResponse, PollVote};
use crate::state::AppState;
use crate::tally;

pub async fn create_poll(
    state: &AppState,
    act_id: Uuid,
    user_id: Uuid,
    req: CreatePollRequest,
) -> Result<PollResponse, ApiError> {
    req.validate()?;

    let act = acts::get_act(&state.pool, act_id).await?;
    if !act.is_live {
        return Err(ApiError::Forbidden(String::from("Act is not live")));
    }
    if !acts::can_run_polls(&state.pool, &act, user_id).await? {
        return Err(ApiError::Forbidden(String::from(
            "Only the act owner or a navigator can run polls",
        )));
    }

    let ends_at = Utc::now() + Duration::minutes(req.bidding_time);

    let poll = sqlx::query_as::<_, Poll>(
        "INSERT INTO polls (act_id, created_by, title, description, ends_at) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, act_id, created_by, title, description, is_active, created_at, ends_at",
    )
    .bind(act_id)
    .bind(user_id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(ends_at)
    .fetch_one(&state.pool)
    .await?;

    for text in &req.options {
        sqlx::query("INSERT INTO poll_options (poll_id, text) VALUES ($1, $2)")
            .bind(poll.id)
            .bind(text)
            .execute(&state.pool)
            .await?;
    }

    info!("poll {} created on act {act_id}, ends at {ends_at}", poll.id);

    let formatted = get_poll(&state.pool, poll.id).await?;
    state.rooms.publish(act_id, &PollEvent::New(formatted.clone()));

    spawn_auto_close(state.clone(), poll.id, act_id, poll.ends_at);

    Ok(formatted)
}

pub async fn vote(
    state: &AppState,
    poll_id: i32,
    user_id: Uuid,
    option_id: i32,
) -> Result<PollResponse, ApiError> {
    let poll = fetch_poll(&state.pool, poll_id).await?;

    let option = sqlx::query_scalar::<_, i32>(
        "SELECT id FROM poll_options WHERE id = $1 AND poll_id = $2",
    )
    .bind(option_id)
    .bind(poll_id)
    .fetch_optional(&state.pool)
    .await?;
    if option.is_none() {
        return Err(ApiError::NotFound(format!(
            "Option {option_id} not found on poll {poll_id}"
        )));
    }

    ensure_votable(&poll, Utc::now())?;

    // Check if the user has already voted on this poll
    let existing = sqlx::query_scalar::<_, i32>(
        "SELECT id FROM poll_votes WHERE poll_id = $1 AND user_id = $2",
    )
    .bind(poll_id)
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?;
    if existing.is_some() {
        return Err(error::duplicate_vote());
    }

    // Record the vote; the unique (poll_id, user_id) constraint settles the
    // race where the same user submits twice at once
    let inserted = sqlx::query("INSERT INTO poll_votes (poll_id, user_id, option_id) VALUES ($1, $2, $3)")
        .bind(poll_id)
        .bind(user_id)
        .bind(option_id)
        .execute(&state.pool)
        .await;

    if let Err(e) = inserted {
        if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
            return Err(error::duplicate_vote());
        }
        return Err(e.into());
    }

    let formatted = get_poll(&state.pool, poll_id).await?;
    state
        .rooms
        .publish(poll.act_id, &PollEvent::Update(formatted.clone()));

    Ok(formatted)
}

pub async fn close_poll(state: &AppState, poll_id: i32, user_id: Uuid) -> Result<(), ApiError> {
    let poll = fetch_poll(&state.pool, poll_id).await?;

    let act = acts::get_act(&state.pool, poll.act_id).await?;
    if !acts::can_run_polls(&state.pool, &act, user_id).await? {
        return Err(ApiError::Forbidden(String::from(
            "Only the act owner or a navigator can run polls",
        )));
    }

    // Closing an already closed poll succeeds without a second closed event
    if deactivate(&state.pool, poll_id).await? {
        info!("poll {poll_id} closed by {user_id}");
        state.rooms.publish(poll.act_id, &PollEvent::Closed { poll_id });
    }

    Ok(())
}

pub async fn get_active_polls(pool: &PgPool, act_id: Uuid) -> Result<Vec<PollResponse>, ApiError> {
    // ends_at is checked here as well as in the timer, so polls whose timer
    // died with a restart still drop out of the listing once expired
    let polls = sqlx::query_as::<_, Poll>(
        "SELECT id, act_id, created_by, title, description, is_active, created_at, ends_at \
         FROM polls WHERE act_id = $1 AND is_active = TRUE AND ends_at > NOW() \
         ORDER BY created_at DESC",
    )
    .bind(act_id)
    .fetch_all(pool)
    .await?;

    let mut formatted = Vec::with_capacity(polls.len());
    for poll in polls {
        formatted.push(format_with_rows(pool, poll).await?);
    }

    Ok(formatted)
}

pub async fn get_poll(pool: &PgPool, poll_id: i32) -> Result<PollResponse, ApiError> {
    let poll = fetch_poll(pool, poll_id).await?;
    format_with_rows(pool, poll).await
}

async fn fetch_poll(pool: &PgPool, poll_id: i32) -> Result<Poll, ApiError> {
    sqlx::query_as::<_, Poll>(
        "SELECT id, act_id, created_by, title, description, is_active, created_at, ends_at \
         FROM polls WHERE id = $1",
    )
    .bind(poll_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Poll {poll_id} not found")))
}

async fn format_with_rows(pool: &PgPool, poll: Poll) -> Result<PollResponse, ApiError> {
    let options = sqlx::query_as::<_, PollOption>(
        "SELECT id, poll_id, text FROM poll_options WHERE poll_id = $1 ORDER BY id ASC",
    )
    .bind(poll.id)
    .fetch_all(pool)
    .await?;

    let votes = sqlx::query_as::<_, PollVote>(
        "SELECT id, poll_id, user_id, option_id FROM poll_votes WHERE poll_id = $1",
    )
    .bind(poll.id)
    .fetch_all(pool)
    .await?;

    Ok(tally::format_poll(poll, options, &votes))
}

/// A vote is only accepted while the poll is flagged active and its deadline
/// has not passed. The deadline wins even when the timer has not yet written
/// the flag.
fn ensure_votable(poll: &Poll, now: DateTime<Utc>) -> Result<(), ApiError> {
    if !poll.is_active || now >= poll.ends_at {
        return Err(error::poll_closed());
    }
    Ok(())
}

/// Arm the one-shot closing timer for a freshly created poll. The update is
/// guarded on `is_active`, so a poll closed early by hand turns the firing
/// into a no-op and no second closed event goes out. Timers live in-process
/// only; a restart loses them and expired polls are filtered at read time.
fn spawn_auto_close(state: AppState, poll_id: i32, act_id: Uuid, ends_at: DateTime<Utc>) {
    tokio::spawn(async move {
        let wait = (ends_at - Utc::now()).to_std().unwrap_or_default();
        time::sleep(wait).await;

        match deactivate(&state.pool, poll_id).await {
            Ok(true) => {
                info!("poll {poll_id} reached its bidding deadline");
                state.rooms.publish(act_id, &PollEvent::Closed { poll_id });
            }
            Ok(false) => {}
            Err(e) => error!("scheduled close of poll {poll_id} failed: {e}"),
        }
    });
}

/// Flip the poll inactive. Returns whether this call made the transition.
async fn deactivate(pool: &PgPool, poll_id: i32) -> Result<bool, ApiError> {
    let result =
        sqlx::query("UPDATE polls SET is_active = FALSE WHERE id = $1 AND is_active = TRUE")
            .bind(poll_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}
