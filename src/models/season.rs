//! Season, event and race models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppResult;

/// League season, keyed by year.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Season {
    pub year: i32,
    /// Highest event number with imported results.
    pub last_event: Option<i32>,
}

/// One league event (a day of racing) within a season.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub year: i32,
    pub number: i32,
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
}

/// A single race held at an event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Race {
    pub year: i32,
    pub event_number: i32,
    pub number: i32,
    pub map: String,
    pub discipline_id: String,
}

/// Discipline identifier for score-format races.
pub const SCORE_DISCIPLINE: &str = "SCO";

impl Race {
    /// Score races rank by points collected rather than time.
    pub fn is_score(&self) -> bool {
        self.discipline_id == SCORE_DISCIPLINE
    }
}

/// Season repository for database operations.
pub struct SeasonRepository;

impl SeasonRepository {
    /// Lists all seasons, newest first.
    pub async fn list(pool: &sqlx::PgPool) -> AppResult<Vec<Season>> {
        let seasons = sqlx::query_as::<_, Season>(
            r"
            SELECT year, last_event
            FROM seasons
            ORDER BY year DESC
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(seasons)
    }

    /// Finds a season by year.
    pub async fn find(pool: &sqlx::PgPool, year: i32) -> AppResult<Option<Season>> {
        let season = sqlx::query_as::<_, Season>(
            r"
            SELECT year, last_event
            FROM seasons
            WHERE year = $1
            LIMIT 1
            ",
        )
        .bind(year)
        .fetch_optional(pool)
        .await?;

        Ok(season)
    }

    /// Lists the events of a season in running order.
    pub async fn events(pool: &sqlx::PgPool, year: i32) -> AppResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r"
            SELECT year, number, name, date
            FROM events
            WHERE year = $1
            ORDER BY number
            ",
        )
        .bind(year)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    /// Finds one event of a season.
    pub async fn find_event(
        pool: &sqlx::PgPool,
        year: i32,
        number: i32,
    ) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r"
            SELECT year, number, name, date
            FROM events
            WHERE year = $1 AND number = $2
            LIMIT 1
            ",
        )
        .bind(year)
        .bind(number)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// Lists the races held at one event.
    pub async fn event_races(
        pool: &sqlx::PgPool,
        year: i32,
        event_number: i32,
    ) -> AppResult<Vec<Race>> {
        let races = sqlx::query_as::<_, Race>(
            r"
            SELECT year, event_number, number, map, discipline_id
            FROM races
            WHERE year = $1 AND event_number = $2
            ORDER BY number
            ",
        )
        .bind(year)
        .bind(event_number)
        .fetch_all(pool)
        .await?;

        Ok(races)
    }

    /// Lists every race of a season, ordered by event then race number.
    pub async fn races(pool: &sqlx::PgPool, year: i32) -> AppResult<Vec<Race>> {
        let races = sqlx::query_as::<_, Race>(
            r"
            SELECT year, event_number, number, map, discipline_id
            FROM races
            WHERE year = $1
            ORDER BY event_number, number
            ",
        )
        .bind(year)
        .fetch_all(pool)
        .await?;

        Ok(races)
    }
}
