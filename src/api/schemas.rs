//! API response schemas.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Event, MemberResult, Race, ResultStatus, Season};
use crate::utils::{format_race_time, GradeStandings, LeagueRules};

/// Response for `GET /api/seasons`.
#[derive(Debug, Serialize)]
pub struct SeasonListResponse {
    pub seasons: Vec<Season>,
}

/// An event together with the races held at it.
#[derive(Debug, Serialize)]
pub struct EventWithRaces {
    #[serde(flatten)]
    pub event: Event,
    pub races: Vec<Race>,
}

/// Response for `GET /api/seasons/{year}`.
#[derive(Debug, Serialize)]
pub struct SeasonDetailResponse {
    pub year: i32,
    pub last_event: Option<i32>,
    pub events: Vec<EventWithRaces>,
}

impl SeasonDetailResponse {
    /// Attaches each race to its event; races of unknown events are dropped.
    pub fn new(season: Season, events: Vec<Event>, races: Vec<Race>) -> Self {
        let mut by_event: BTreeMap<i32, Vec<Race>> = BTreeMap::new();
        for race in races {
            by_event.entry(race.event_number).or_default().push(race);
        }

        let events = events
            .into_iter()
            .map(|event| EventWithRaces {
                races: by_event.remove(&event.number).unwrap_or_default(),
                event,
            })
            .collect();

        Self {
            year: season.year,
            last_event: season.last_event,
            events,
        }
    }
}

/// One competitor's line in an event result list.
#[derive(Debug, Serialize)]
pub struct ResultEntry {
    /// Finishing place among clean finishers in the grade.
    pub position: Option<usize>,
    pub member_id: i32,
    pub name: String,
    pub status: String,
    pub time: Option<i32>,
    pub time_display: Option<String>,
    pub raw_points: Option<i32>,
    pub points: Option<i32>,
}

/// Results of one grade within a race.
#[derive(Debug, Serialize)]
pub struct GradeResults {
    pub grade: String,
    pub results: Vec<ResultEntry>,
}

/// Results of one race.
#[derive(Debug, Serialize)]
pub struct RaceResults {
    pub race_number: i32,
    pub map: Option<String>,
    pub discipline_id: Option<String>,
    pub grades: Vec<GradeResults>,
}

/// Response for `GET /api/seasons/{year}/events/{event}/results`.
#[derive(Debug, Serialize)]
pub struct EventResultsResponse {
    pub year: i32,
    pub event: Event,
    pub races: Vec<RaceResults>,
}

impl EventResultsResponse {
    /// Groups results by race and grade and orders each grade.
    ///
    /// Clean finishers come first. Score races order them by points and then
    /// time, every other race by time alone. Everyone else follows without a
    /// position. Results of a race missing from `races` are ordered by time.
    pub fn new(event: Event, races: &[Race], results: Vec<MemberResult>) -> Self {
        let race_info: BTreeMap<i32, &Race> = races.iter().map(|r| (r.number, r)).collect();

        let mut grouped: BTreeMap<i32, BTreeMap<String, Vec<MemberResult>>> = BTreeMap::new();
        for result in results {
            grouped
                .entry(result.race_number)
                .or_default()
                .entry(result.race_grade.clone())
                .or_default()
                .push(result);
        }

        let races = grouped
            .into_iter()
            .map(|(race_number, grades)| {
                let race = race_info.get(&race_number).copied();
                let is_score = race.is_some_and(Race::is_score);
                RaceResults {
                    race_number,
                    map: race.map(|r| r.map.clone()),
                    discipline_id: race.map(|r| r.discipline_id.clone()),
                    grades: grades
                        .into_iter()
                        .map(|(grade, results)| GradeResults {
                            grade,
                            results: order_results(results, is_score),
                        })
                        .collect(),
                }
            })
            .collect();

        Self {
            year: event.year,
            event,
            races,
        }
    }
}

fn order_results(mut results: Vec<MemberResult>, is_score: bool) -> Vec<ResultEntry> {
    let is_clean = |r: &MemberResult| r.parsed_status() == Some(ResultStatus::Ok);

    results.sort_by_key(|r| {
        let points = if is_score { r.points.unwrap_or(0) } else { 0 };
        (!is_clean(r), Reverse(points), r.time.unwrap_or(i32::MAX))
    });

    let mut position = 0;
    results
        .into_iter()
        .map(|r| {
            let place = if is_clean(&r) {
                position += 1;
                Some(position)
            } else {
                None
            };
            ResultEntry {
                position: place,
                member_id: r.member_id,
                name: r.full_name(),
                time_display: r.time.map(format_race_time),
                status: r.status,
                time: r.time,
                raw_points: r.raw_points,
                points: r.points,
            }
        })
        .collect()
}

/// League rules echoed alongside the standings.
#[derive(Debug, Serialize)]
pub struct RulesInfo {
    pub min_events_to_qualify: usize,
    pub best_x_scores: usize,
}

impl From<LeagueRules> for RulesInfo {
    fn from(rules: LeagueRules) -> Self {
        Self {
            min_events_to_qualify: rules.min_events_to_qualify,
            best_x_scores: rules.best_x_scores,
        }
    }
}

/// Response for `GET /api/seasons/{year}/standings`.
#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub year: i32,
    pub rules: RulesInfo,
    pub grades: Vec<GradeStandings>,
}
