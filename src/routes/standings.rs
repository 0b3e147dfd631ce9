use axum::extract::{Path, State};
use diesel::prelude::*;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{now, parse_id};
use crate::{
    auth::AdminSession,
    database::{
        self,
        model::{Standing, StandingChangeset},
        schema::standings,
    },
    error::ApiError,
    live,
    response::{ApiResponse, Payload},
    standings::{self as table, StandingView},
    state::SharedState,
};

/// Manual correction of a row; the next recalculation overwrites it.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStanding {
    pub played: Option<i32>,
    pub won: Option<i32>,
    pub drawn: Option<i32>,
    pub lost: Option<i32>,
    pub points: Option<i32>,
    pub set_won: Option<i32>,
    pub set_lost: Option<i32>,
}

impl UpdateStanding {
    fn validate(&self) -> Result<(), ApiError> {
        let counters = [
            self.played,
            self.won,
            self.drawn,
            self.lost,
            self.points,
            self.set_won,
            self.set_lost,
        ];
        if counters.iter().flatten().any(|v| *v < 0) {
            return Err(ApiError::validation("Counters cannot be negative"));
        }
        Ok(())
    }
}

#[instrument(skip(state))]
pub async fn list_standings(
    State(state): State<SharedState>,
) -> Result<ApiResponse<Vec<StandingView>>, ApiError> {
    let rows = database::run(&state.pool, table::load_table).await?;
    Ok(ApiResponse::ok(rows))
}

#[instrument(skip(state))]
pub async fn get_standing(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<StandingView>, ApiError> {
    let id = parse_id(&id)?;
    let row = database::run(&state.pool, move |conn| {
        standings::table
            .find(id)
            .first::<Standing>(conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Standing"))
    })
    .await?;

    Ok(ApiResponse::ok(row.into()))
}

#[instrument(skip(state, admin), fields(user = %admin.username))]
pub async fn recalculate(
    State(state): State<SharedState>,
    admin: AdminSession,
) -> Result<ApiResponse<Vec<StandingView>>, ApiError> {
    let rows = database::run(&state.pool, table::recalculate).await?;

    info!("Standings recalculated on request, {} teams", rows.len());
    live::standings_updated(&state.io, &rows);
    Ok(ApiResponse::ok(rows))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_standing(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateStanding>,
) -> Result<ApiResponse<StandingView>, ApiError> {
    let id = parse_id(&id)?;
    payload.validate()?;

    let changes = StandingChangeset {
        played: payload.played,
        won: payload.won,
        drawn: payload.drawn,
        lost: payload.lost,
        points: payload.points,
        set_won: payload.set_won,
        set_lost: payload.set_lost,
        updated_at: now(),
    };

    let (row, rows) = database::run(&state.pool, move |conn| {
        let updated = diesel::update(standings::table.find(id))
            .set(&changes)
            .execute(conn)?;
        if updated == 0 {
            return Err(ApiError::not_found("Standing"));
        }
        let row = standings::table.find(id).first::<Standing>(conn)?;
        Ok((row, table::load_table(conn)?))
    })
    .await?;

    live::standings_updated(&state.io, &rows);
    Ok(ApiResponse::ok(row.into()))
}

#[instrument(skip(state, _admin))]
pub async fn delete_standing(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = database::run(&state.pool, move |conn| {
        Ok(diesel::delete(standings::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("Standing"));
    }
    Ok(ApiResponse::message("Standing deleted"))
}
