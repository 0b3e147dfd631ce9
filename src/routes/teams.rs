use axum::extract::{Path, State};
use diesel::prelude::*;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{now, parse_id, require};
use crate::{
    auth::AdminSession,
    database::{
        self,
        model::{NewTeam, Team, TeamChangeset},
        schema::teams,
    },
    error::ApiError,
    live,
    response::{ApiResponse, Payload},
    standings,
    state::SharedState,
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeam {
    pub name: String,
    pub logo_url: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub logo_url: Option<String>,
}

#[instrument(skip(state))]
pub async fn list_teams(
    State(state): State<SharedState>,
) -> Result<ApiResponse<Vec<Team>>, ApiError> {
    let rows = database::run(&state.pool, |conn| {
        Ok(teams::table.order(teams::name.asc()).load::<Team>(conn)?)
    })
    .await?;

    Ok(ApiResponse::ok(rows))
}

#[instrument(skip(state))]
pub async fn get_team(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Team>, ApiError> {
    let id = parse_id(&id)?;
    let team = database::run(&state.pool, move |conn| {
        teams::table
            .find(id)
            .first::<Team>(conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Team"))
    })
    .await?;

    Ok(ApiResponse::ok(team))
}

#[instrument(skip_all)]
pub async fn create_team(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Payload(payload): Payload<CreateTeam>,
) -> Result<ApiResponse<Team>, ApiError> {
    require("name", &payload.name)?;

    let stamp = now();
    let new_team = NewTeam {
        name: payload.name.trim().to_string(),
        logo_url: payload.logo_url,
        created_at: stamp,
        updated_at: stamp,
    };

    let (team, table) = database::run(&state.pool, move |conn| {
        let team = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(teams::table)
                .values(&new_team)
                .execute(conn)?;
            teams::table.order(teams::id.desc()).first::<Team>(conn)
        })?;
        let table = standings::recalculate(conn)?;
        Ok((team, table))
    })
    .await?;

    info!("Created team {} ({})", team.id, team.name);
    live::standings_updated(&state.io, &table);
    Ok(ApiResponse::created(team))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_team(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateTeam>,
) -> Result<ApiResponse<Team>, ApiError> {
    let id = parse_id(&id)?;
    if let Some(name) = &payload.name {
        require("name", name)?;
    }

    let changes = TeamChangeset {
        name: payload.name.map(|n| n.trim().to_string()),
        logo_url: payload.logo_url,
        updated_at: now(),
    };

    let (team, table) = database::run(&state.pool, move |conn| {
        let updated = diesel::update(teams::table.find(id))
            .set(&changes)
            .execute(conn)?;
        if updated == 0 {
            return Err(ApiError::not_found("Team"));
        }
        let team = teams::table.find(id).first::<Team>(conn)?;
        let table = standings::recalculate(conn)?;
        Ok((team, table))
    })
    .await?;

    live::standings_updated(&state.io, &table);
    Ok(ApiResponse::ok(team))
}

#[instrument(skip(state, _admin))]
pub async fn delete_team(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id)?;
    let table = database::run(&state.pool, move |conn| {
        let deleted = diesel::delete(teams::table.find(id)).execute(conn)?;
        if deleted == 0 {
            return Err(ApiError::not_found("Team"));
        }
        standings::recalculate(conn)
    })
    .await?;

    info!("Deleted team {id}");
    live::standings_updated(&state.io, &table);
    Ok(ApiResponse::message("Team deleted"))
}
