//! HTTP request handler module.

use axum::{extract::State, http::StatusCode, Json};

use crate::api::extractors::{ApiPath, ApiQuery};
use crate::api::schemas::{
    EventResultsResponse, SeasonDetailResponse, SeasonListResponse, StandingsResponse,
};
use crate::api::state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ResultRepository, Season, SeasonRepository};
use crate::utils::{compute_standings, StandingsFilter};

/// Season list handler.
///
/// # Route
///
/// `GET /api/seasons`
pub async fn list_seasons_handler(
    State(state): State<AppState>,
) -> AppResult<Json<SeasonListResponse>> {
    let seasons = SeasonRepository::list(&state.db).await?;
    Ok(Json(SeasonListResponse { seasons }))
}

/// Season detail handler with events and their races.
///
/// # Route
///
/// `GET /api/seasons/{year}`
pub async fn season_handler(
    State(state): State<AppState>,
    ApiPath(year): ApiPath<i32>,
) -> AppResult<Json<SeasonDetailResponse>> {
    let season = find_season(&state, year).await?;

    let events = SeasonRepository::events(&state.db, year).await?;
    let races = SeasonRepository::races(&state.db, year).await?;

    Ok(Json(SeasonDetailResponse::new(season, events, races)))
}

/// Event results handler.
///
/// # Route
///
/// `GET /api/seasons/{year}/events/{event}/results`
pub async fn event_results_handler(
    State(state): State<AppState>,
    ApiPath((year, event_number)): ApiPath<(i32, i32)>,
) -> AppResult<Json<EventResultsResponse>> {
    let event = SeasonRepository::find_event(&state.db, year, event_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_number} of {year} not found")))?;

    let races = SeasonRepository::event_races(&state.db, year, event_number).await?;
    let results = ResultRepository::for_event(&state.db, year, event_number).await?;

    Ok(Json(EventResultsResponse::new(event, &races, results)))
}

/// League standings handler.
///
/// Accepts optional `grade` and `gender` query parameters.
///
/// # Route
///
/// `GET /api/seasons/{year}/standings`
pub async fn standings_handler(
    State(state): State<AppState>,
    ApiPath(year): ApiPath<i32>,
    ApiQuery(filter): ApiQuery<StandingsFilter>,
) -> AppResult<Json<StandingsResponse>> {
    find_season(&state, year).await?;

    let results = ResultRepository::for_season(&state.db, year).await?;
    let grades = compute_standings(&results, state.rules, &filter);

    tracing::debug!(
        year = year,
        results = results.len(),
        grades = grades.len(),
        "Computed standings"
    );

    Ok(Json(StandingsResponse {
        year,
        rules: state.rules.into(),
        grades,
    }))
}

async fn find_season(state: &AppState, year: i32) -> AppResult<Season> {
    SeasonRepository::find(&state.db, year)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Season {year} not found")))
}

/// Fallback for unknown API paths.
pub async fn api_not_found_handler() -> AppError {
    AppError::NotFound("No such API endpoint".to_string())
}

/// Health check response.
#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness check handler.
///
/// # Route
///
/// `GET /api/health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness check response.
#[derive(serde::Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// Readiness check handler.
///
/// Checks database connectivity.
///
/// # Route
///
/// `GET /api/ready`
pub async fn readiness_handler(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let db_ok = sqlx::query("SELECT 1").fetch_one(&state.db).await.is_ok();

    if db_ok {
        Ok(Json(ReadinessResponse {
            status: "ok",
            database: "connected",
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "degraded",
                database: "disconnected",
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_health_handler() {
        let Json(health) = health_handler().await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_api_not_found_handler() {
        let response = api_not_found_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_readiness_response_serialization() {
        let json = serde_json::to_value(ReadinessResponse {
            status: "degraded",
            database: "disconnected",
        })
        .unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["database"], "disconnected");
    }
}
