//! Race result model.

use std::fmt;
use std::str::FromStr;

use sqlx::FromRow;

use crate::error::{AppError, AppResult};

/// Finishing status of a competitor in a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultStatus {
    /// Finished with a valid result
    Ok,
    /// Did not start
    Dns,
    /// Did not finish
    Dnf,
    /// Mispunch
    Mp,
    /// Disqualified
    Dq,
    /// Not timed
    Nt,
}

impl ResultStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Dns => "DNS",
            Self::Dnf => "DNF",
            Self::Mp => "MP",
            Self::Dq => "DQ",
            Self::Nt => "NT",
        }
    }

    /// Only clean finishes earn league points.
    pub const fn is_scoring(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "OK" => Ok(Self::Ok),
            "DNS" => Ok(Self::Dns),
            "DNF" => Ok(Self::Dnf),
            "MP" => Ok(Self::Mp),
            "DQ" => Ok(Self::Dq),
            "NT" => Ok(Self::Nt),
            other => Err(AppError::Internal(format!("Unknown result status: {other}"))),
        }
    }
}

/// A result row joined with the member it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct MemberResult {
    pub member_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub event_number: i32,
    pub race_number: i32,
    pub race_grade: String,
    /// Elapsed time in seconds
    pub time: Option<i32>,
    pub status: String,
    pub raw_points: Option<i32>,
    pub points: Option<i32>,
}

impl MemberResult {
    /// Parsed status; unknown values are logged and treated as non-scoring.
    pub fn parsed_status(&self) -> Option<ResultStatus> {
        match self.status.parse() {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!(
                    member_id = self.member_id,
                    event_number = self.event_number,
                    error = %e,
                    "Ignoring result with unrecognised status"
                );
                None
            }
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Result repository for database operations.
pub struct ResultRepository;

impl ResultRepository {
    /// All results of a season, with member details.
    pub async fn for_season(pool: &sqlx::PgPool, year: i32) -> AppResult<Vec<MemberResult>> {
        let results = sqlx::query_as::<_, MemberResult>(
            r"
            SELECT r.member_id, m.first_name, m.last_name, m.gender,
                   r.event_number, r.race_number, r.race_grade,
                   r.time, r.status, r.raw_points, r.points
            FROM results r
            JOIN members m ON m.member_id = r.member_id AND m.year = r.year
            WHERE r.year = $1
            ORDER BY r.event_number, r.race_number, r.race_grade
            ",
        )
        .bind(year)
        .fetch_all(pool)
        .await?;

        Ok(results)
    }

    /// Results of a single event, with member details.
    pub async fn for_event(
        pool: &sqlx::PgPool,
        year: i32,
        event_number: i32,
    ) -> AppResult<Vec<MemberResult>> {
        let results = sqlx::query_as::<_, MemberResult>(
            r"
            SELECT r.member_id, m.first_name, m.last_name, m.gender,
                   r.event_number, r.race_number, r.race_grade,
                   r.time, r.status, r.raw_points, r.points
            FROM results r
            JOIN members m ON m.member_id = r.member_id AND m.year = r.year
            WHERE r.year = $1 AND r.event_number = $2
            ORDER BY r.race_number, r.race_grade, r.time NULLS LAST
            ",
        )
        .bind(year)
        .bind(event_number)
        .fetch_all(pool)
        .await?;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_and_display_agree() {
        let all = [
            ResultStatus::Ok,
            ResultStatus::Dns,
            ResultStatus::Dnf,
            ResultStatus::Mp,
            ResultStatus::Dq,
            ResultStatus::Nt,
        ];
        for status in all {
            let parsed: ResultStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_parse_trims_whitespace() {
        assert_eq!(" MP ".parse::<ResultStatus>().unwrap(), ResultStatus::Mp);
    }

    #[test]
    fn test_status_parse_unknown() {
        let parsed = "WTF".parse::<ResultStatus>();
        assert!(matches!(parsed, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_only_ok_scores() {
        assert!(ResultStatus::Ok.is_scoring());
        assert!(!ResultStatus::Mp.is_scoring());
        assert!(!ResultStatus::Dnf.is_scoring());
    }

    #[test]
    fn test_member_result_unknown_status_is_none() {
        let result = MemberResult {
            member_id: 1,
            first_name: "Ana".to_string(),
            last_name: "Reid".to_string(),
            gender: "F".to_string(),
            event_number: 1,
            race_number: 1,
            race_grade: "W21".to_string(),
            time: None,
            status: "???".to_string(),
            raw_points: None,
            points: None,
        };
        assert!(result.parsed_status().is_none());
        assert_eq!(result.full_name(), "Ana Reid");
    }
}
