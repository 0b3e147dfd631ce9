use axum::extract::{Path, State};
use chrono::NaiveDate;
use diesel::{prelude::*, SqliteConnection};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{now, nullable, parse_id, require};
use crate::{
    auth::AdminSession,
    database::{
        self,
        model::{NewSeason, Season, SeasonChangeset},
        schema::seasons,
    },
    error::ApiError,
    response::{ApiResponse, Payload},
    state::SharedState,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeason {
    pub name: String,
    pub year: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSeason {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

fn check_year(year: i32) -> Result<(), ApiError> {
    if !(1900..=2200).contains(&year) {
        return Err(ApiError::validation(format!("{year} is not a valid year")));
    }
    Ok(())
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ApiError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(ApiError::validation("endDate cannot be before startDate"))
        }
        _ => Ok(()),
    }
}

/// Clears the active flag on every season except `keep`.
fn deactivate_others(conn: &mut SqliteConnection, keep: i32) -> QueryResult<usize> {
    diesel::update(
        seasons::table
            .filter(seasons::id.ne(keep))
            .filter(seasons::is_active.eq(true)),
    )
    .set(seasons::is_active.eq(false))
    .execute(conn)
}

#[instrument(skip(state))]
pub async fn list_seasons(
    State(state): State<SharedState>,
) -> Result<ApiResponse<Vec<Season>>, ApiError> {
    let rows = database::run(&state.pool, |conn| {
        Ok(seasons::table
            .order((seasons::year.desc(), seasons::name.asc()))
            .load::<Season>(conn)?)
    })
    .await?;

    Ok(ApiResponse::ok(rows))
}

#[instrument(skip(state))]
pub async fn active_season(
    State(state): State<SharedState>,
) -> Result<ApiResponse<Season>, ApiError> {
    let season = database::run(&state.pool, |conn| {
        seasons::table
            .filter(seasons::is_active.eq(true))
            .order(seasons::updated_at.desc())
            .first::<Season>(conn)
            .optional()?
            .ok_or_else(|| ApiError::NotFound("No active season".to_string()))
    })
    .await?;

    Ok(ApiResponse::ok(season))
}

#[instrument(skip(state))]
pub async fn get_season(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Season>, ApiError> {
    let id = parse_id(&id)?;
    let season = database::run(&state.pool, move |conn| {
        seasons::table
            .find(id)
            .first::<Season>(conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Season"))
    })
    .await?;

    Ok(ApiResponse::ok(season))
}

#[instrument(skip_all)]
pub async fn create_season(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Payload(payload): Payload<CreateSeason>,
) -> Result<ApiResponse<Season>, ApiError> {
    require("name", &payload.name)?;
    check_year(payload.year)?;
    check_dates(payload.start_date, payload.end_date)?;

    let stamp = now();
    let new_season = NewSeason {
        name: payload.name,
        year: payload.year,
        start_date: payload.start_date,
        end_date: payload.end_date,
        is_active: payload.is_active,
        created_at: stamp,
        updated_at: stamp,
    };

    let season = database::run(&state.pool, move |conn| {
        Ok(conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(seasons::table)
                .values(&new_season)
                .execute(conn)?;
            let season = seasons::table
                .order(seasons::id.desc())
                .first::<Season>(conn)?;
            if season.is_active {
                deactivate_others(conn, season.id)?;
            }
            Ok(season)
        })?)
    })
    .await?;

    info!(
        "Created season {} ({}), active: {}",
        season.id, season.name, season.is_active
    );
    Ok(ApiResponse::created(season))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_season(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateSeason>,
) -> Result<ApiResponse<Season>, ApiError> {
    let id = parse_id(&id)?;
    if let Some(name) = &payload.name {
        require("name", name)?;
    }
    if let Some(year) = payload.year {
        check_year(year)?;
    }

    let changes = SeasonChangeset {
        name: payload.name,
        year: payload.year,
        start_date: payload.start_date,
        end_date: payload.end_date,
        is_active: payload.is_active,
        updated_at: now(),
    };

    let season = database::run(&state.pool, move |conn| {
        conn.transaction::<_, ApiError, _>(|conn| {
            let current = seasons::table
                .find(id)
                .first::<Season>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("Season"))?;
            check_dates(
                changes.start_date.unwrap_or(current.start_date),
                changes.end_date.unwrap_or(current.end_date),
            )?;

            diesel::update(seasons::table.find(id))
                .set(&changes)
                .execute(conn)?;
            if changes.is_active == Some(true) {
                let cleared = deactivate_others(conn, id)?;
                info!("Season {id} activated, {cleared} other season(s) deactivated");
            }
            Ok(seasons::table.find(id).first::<Season>(conn)?)
        })
    })
    .await?;

    Ok(ApiResponse::ok(season))
}

#[instrument(skip(state, _admin))]
pub async fn delete_season(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = database::run(&state.pool, move |conn| {
        Ok(diesel::delete(seasons::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("Season"));
    }
    Ok(ApiResponse::message("Season deleted"))
}
