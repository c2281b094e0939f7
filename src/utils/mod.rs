//! Utility module.

pub mod race_time;
pub mod standings;

pub use race_time::format_race_time;
pub use standings::{
    compute_standings, EventScore, GradeStandings, LeagueRules, StandingEntry, StandingsFilter,
};
