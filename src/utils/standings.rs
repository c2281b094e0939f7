//! League standings calculation.
//!
//! Turns the flat list of a season's results into one ranked table per grade.
//! A member scores in an event with their best `OK` result in that grade;
//! the season total is the sum of their best `best_x_scores` event scores, and
//! only members with at least `min_events_to_qualify` scoring events are ranked.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, BEST_X_SCORES, MIN_EVENTS_TO_QUALIFY};
use crate::models::MemberResult;

/// Qualification and totalling rules for a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueRules {
    pub min_events_to_qualify: usize,
    pub best_x_scores: usize,
}

impl Default for LeagueRules {
    fn default() -> Self {
        Self {
            min_events_to_qualify: MIN_EVENTS_TO_QUALIFY,
            best_x_scores: BEST_X_SCORES,
        }
    }
}

impl LeagueRules {
    pub const fn from_config(config: &AppConfig) -> Self {
        Self {
            min_events_to_qualify: config.min_events_to_qualify,
            best_x_scores: config.best_x_scores,
        }
    }
}

/// Optional narrowing of the standings table.
///
/// Both `grade` and `gender` match case-insensitively, so `?grade=m21`
/// selects the `M21` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandingsFilter {
    pub grade: Option<String>,
    pub gender: Option<String>,
}

impl StandingsFilter {
    fn accepts(&self, result: &MemberResult) -> bool {
        let grade_ok = self
            .grade
            .as_deref()
            .is_none_or(|g| g.eq_ignore_ascii_case(&result.race_grade));
        let gender_ok = self
            .gender
            .as_deref()
            .is_none_or(|g| g.eq_ignore_ascii_case(&result.gender));
        grade_ok && gender_ok
    }
}

/// A member's score at one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventScore {
    pub event_number: i32,
    pub points: i32,
    /// Whether this score is among the member's best and counts towards the total.
    pub counted: bool,
}

/// One row of a grade's table.
#[derive(Debug, Clone, Serialize)]
pub struct StandingEntry {
    /// Competition rank; `None` until the member qualifies.
    pub position: Option<usize>,
    pub member_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub total: i64,
    pub events_completed: usize,
    pub qualified: bool,
    pub scores: Vec<EventScore>,
}

/// Ranked table for a single grade.
#[derive(Debug, Clone, Serialize)]
pub struct GradeStandings {
    pub grade: String,
    pub entries: Vec<StandingEntry>,
}

struct MemberTally {
    first_name: String,
    last_name: String,
    gender: String,
    // event number -> best points at that event
    best: BTreeMap<i32, i32>,
}

/// Computes the standings for every grade present in `results`.
pub fn compute_standings(
    results: &[MemberResult],
    rules: LeagueRules,
    filter: &StandingsFilter,
) -> Vec<GradeStandings> {
    let mut grades: BTreeMap<&str, BTreeMap<i32, MemberTally>> = BTreeMap::new();

    for result in results.iter().filter(|r| filter.accepts(r)) {
        let tally = grades
            .entry(result.race_grade.as_str())
            .or_default()
            .entry(result.member_id)
            .or_insert_with(|| MemberTally {
                first_name: result.first_name.clone(),
                last_name: result.last_name.clone(),
                gender: result.gender.clone(),
                best: BTreeMap::new(),
            });

        if !result.parsed_status().is_some_and(|s| s.is_scoring()) {
            continue;
        }

        let points = result.points.unwrap_or(0);
        tally
            .best
            .entry(result.event_number)
            .and_modify(|p| *p = (*p).max(points))
            .or_insert(points);
    }

    grades
        .into_iter()
        .map(|(grade, members)| GradeStandings {
            grade: grade.to_string(),
            entries: rank_entries(
                members
                    .into_iter()
                    .map(|(member_id, tally)| build_entry(member_id, tally, rules))
                    .collect(),
            ),
        })
        .collect()
}

fn build_entry(member_id: i32, tally: MemberTally, rules: LeagueRules) -> StandingEntry {
    let mut scores: Vec<EventScore> = tally
        .best
        .into_iter()
        .map(|(event_number, points)| EventScore {
            event_number,
            points,
            counted: false,
        })
        .collect();

    // Best scores first; earlier events win ties so the choice is stable
    scores.sort_by_key(|s| (Reverse(s.points), s.event_number));
    for score in scores.iter_mut().take(rules.best_x_scores) {
        score.counted = true;
    }
    let total = scores
        .iter()
        .filter(|s| s.counted)
        .map(|s| i64::from(s.points))
        .sum();
    scores.sort_by_key(|s| s.event_number);

    let events_completed = scores.len();

    StandingEntry {
        position: None,
        member_id,
        first_name: tally.first_name,
        last_name: tally.last_name,
        gender: tally.gender,
        total,
        events_completed,
        qualified: events_completed >= rules.min_events_to_qualify,
        scores,
    }
}

fn rank_entries(mut entries: Vec<StandingEntry>) -> Vec<StandingEntry> {
    entries.sort_by(|a, b| {
        b.qualified
            .cmp(&a.qualified)
            .then_with(|| b.total.cmp(&a.total))
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.first_name.cmp(&b.first_name))
    });

    let mut previous: Option<(i64, usize)> = None;
    for (index, entry) in entries.iter_mut().enumerate() {
        if !entry.qualified {
            break;
        }
        let position = match previous {
            Some((total, position)) if total == entry.total => position,
            _ => index + 1,
        };
        entry.position = Some(position);
        previous = Some((entry.total, position));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(
        member_id: i32,
        last_name: &str,
        grade: &str,
        event_number: i32,
        status: &str,
        points: Option<i32>,
    ) -> MemberResult {
        MemberResult {
            member_id,
            first_name: format!("First{member_id}"),
            last_name: last_name.to_string(),
            gender: if member_id % 2 == 0 { "F" } else { "M" }.to_string(),
            event_number,
            race_number: 1,
            race_grade: grade.to_string(),
            time: Some(1800),
            status: status.to_string(),
            raw_points: None,
            points,
        }
    }

    fn scored(member_id: i32, last_name: &str, grade: &str, points: &[i32]) -> Vec<MemberResult> {
        points
            .iter()
            .zip(1..)
            .map(|(&p, event)| result(member_id, last_name, grade, event, "OK", Some(p)))
            .collect()
    }

    fn standings(results: &[MemberResult]) -> Vec<GradeStandings> {
        compute_standings(results, LeagueRules::default(), &StandingsFilter::default())
    }

    #[test]
    fn test_default_rules_match_league_constants() {
        let rules = LeagueRules::default();
        assert_eq!(rules.min_events_to_qualify, 3);
        assert_eq!(rules.best_x_scores, 5);
    }

    #[test]
    fn test_only_best_five_scores_count() {
        let results = scored(1, "Hill", "M21", &[10, 90, 80, 70, 60, 50, 40]);
        let table = standings(&results);

        let entry = &table[0].entries[0];
        assert_eq!(entry.total, 90 + 80 + 70 + 60 + 50);
        assert_eq!(entry.events_completed, 7);

        let dropped: Vec<i32> = entry
            .scores
            .iter()
            .filter(|s| !s.counted)
            .map(|s| s.event_number)
            .collect();
        assert_eq!(dropped, vec![1, 7]);
    }

    #[test]
    fn test_fewer_than_three_events_does_not_qualify() {
        let mut results = scored(1, "Able", "W21", &[100, 100]);
        results.extend(scored(2, "Baker", "W21", &[10, 10, 10]));
        let table = standings(&results);

        let entries = &table[0].entries;
        assert_eq!(entries[0].member_id, 2);
        assert!(entries[0].qualified);
        assert_eq!(entries[0].position, Some(1));

        assert_eq!(entries[1].member_id, 1);
        assert!(!entries[1].qualified);
        assert_eq!(entries[1].position, None);
        assert_eq!(entries[1].total, 200);
    }

    #[test]
    fn test_non_ok_results_do_not_score() {
        let results = vec![
            result(1, "Hill", "M21", 1, "OK", Some(50)),
            result(1, "Hill", "M21", 2, "MP", Some(99)),
            result(1, "Hill", "M21", 3, "DNF", None),
        ];
        let table = standings(&results);

        let entry = &table[0].entries[0];
        assert_eq!(entry.total, 50);
        assert_eq!(entry.events_completed, 1);
        assert!(!entry.qualified);
    }

    #[test]
    fn test_member_with_only_non_scoring_results_is_listed() {
        let results = vec![result(3, "Stone", "M35", 1, "DNS", None)];
        let table = standings(&results);

        assert_eq!(table[0].entries.len(), 1);
        assert_eq!(table[0].entries[0].total, 0);
        assert!(table[0].entries[0].scores.is_empty());
    }

    #[test]
    fn test_missing_points_score_zero() {
        let results = vec![
            result(1, "Hill", "M21", 1, "OK", None),
            result(1, "Hill", "M21", 2, "OK", Some(30)),
            result(1, "Hill", "M21", 3, "OK", None),
        ];
        let entry = &standings(&results)[0].entries[0];

        assert_eq!(entry.total, 30);
        assert_eq!(entry.events_completed, 3);
        assert!(entry.qualified);
    }

    #[test]
    fn test_best_race_per_event_is_used() {
        let mut second_race = result(1, "Hill", "M21", 1, "OK", Some(80));
        second_race.race_number = 2;
        let results = vec![result(1, "Hill", "M21", 1, "OK", Some(40)), second_race];
        let entry = &standings(&results)[0].entries[0];

        assert_eq!(entry.events_completed, 1);
        assert_eq!(entry.scores, vec![EventScore {
            event_number: 1,
            points: 80,
            counted: true,
        }]);
    }

    #[test]
    fn test_ties_share_position() {
        let mut results = scored(1, "Able", "W21", &[50, 50, 50]);
        results.extend(scored(2, "Baker", "W21", &[60, 45, 45]));
        results.extend(scored(3, "Cole", "W21", &[40, 40, 40]));
        let entries = &standings(&results)[0].entries;

        assert_eq!(entries[0].position, Some(1));
        assert_eq!(entries[1].position, Some(1));
        // Tied members are ordered by name
        assert_eq!(entries[0].last_name, "Able");
        assert_eq!(entries[1].last_name, "Baker");
        assert_eq!(entries[2].position, Some(3));
    }

    #[test]
    fn test_grades_are_separate_tables_in_order() {
        let mut results = scored(1, "Hill", "W35", &[10, 10, 10]);
        results.extend(scored(2, "Moss", "M21", &[20, 20, 20]));
        let table = standings(&results);

        let grades: Vec<&str> = table.iter().map(|g| g.grade.as_str()).collect();
        assert_eq!(grades, vec!["M21", "W35"]);
        assert_eq!(table[0].entries[0].position, Some(1));
        assert_eq!(table[1].entries[0].position, Some(1));
    }

    #[test]
    fn test_filter_by_grade_and_gender() {
        let mut results = scored(1, "Hill", "M21", &[10, 10, 10]);
        results.extend(scored(2, "Moss", "W21", &[20, 20, 20]));
        results.extend(scored(4, "Reed", "M21", &[30, 30, 30]));

        let by_grade = compute_standings(&results, LeagueRules::default(), &StandingsFilter {
            grade: Some("M21".to_string()),
            gender: None,
        });
        assert_eq!(by_grade.len(), 1);
        assert_eq!(by_grade[0].entries.len(), 2);

        let by_gender = compute_standings(&results, LeagueRules::default(), &StandingsFilter {
            grade: None,
            gender: Some("f".to_string()),
        });
        let members: Vec<i32> = by_gender
            .iter()
            .flat_map(|g| g.entries.iter().map(|e| e.member_id))
            .collect();
        assert_eq!(members, vec![4, 2]);
    }

    #[test]
    fn test_grade_filter_ignores_case() {
        let mut results = scored(1, "Hill", "M21", &[10, 10, 10]);
        results.extend(scored(2, "Moss", "W21", &[20, 20, 20]));

        let table = compute_standings(&results, LeagueRules::default(), &StandingsFilter {
            grade: Some("m21".to_string()),
            gender: None,
        });
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].grade, "M21");
        assert_eq!(table[0].entries[0].member_id, 1);
    }

    #[test]
    fn test_custom_rules() {
        let rules = LeagueRules {
            min_events_to_qualify: 1,
            best_x_scores: 2,
        };
        let results = scored(1, "Hill", "M21", &[5, 9, 7]);
        let table = compute_standings(&results, rules, &StandingsFilter::default());

        let entry = &table[0].entries[0];
        assert_eq!(entry.total, 16);
        assert!(entry.qualified);
    }

    #[test]
    fn test_empty_results() {
        assert!(standings(&[]).is_empty());
    }
}
