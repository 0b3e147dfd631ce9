use axum::extract::{Path, Query, State};
use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{now, nullable, parse_id, require};
use crate::{
    auth::AdminSession,
    database::{
        self,
        model::{NewPlayer, Player, PlayerChangeset},
        schema::players,
    },
    error::ApiError,
    response::{ApiResponse, Payload},
    state::SharedState,
};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub height: f64,
    pub position: String,
    pub jersey_number: i32,
    pub nationality: String,
    pub image_url: String,
    pub bio: Option<String>,
    pub featured: bool,
    pub season_ids: Vec<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Player> for PlayerView {
    type Error = ApiError;

    fn try_from(row: Player) -> Result<Self, Self::Error> {
        Ok(PlayerView {
            season_ids: serde_json::from_str(&row.season_ids)?,
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            date_of_birth: row.date_of_birth,
            height: row.height,
            position: row.position,
            jersey_number: row.jersey_number,
            nationality: row.nationality,
            image_url: row.image_url,
            bio: row.bio,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PlayerQuery {
    pub featured: Option<bool>,
    pub position: Option<String>,
    pub season: Option<i32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlayer {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub height: f64,
    pub position: String,
    pub jersey_number: i32,
    pub nationality: String,
    pub image_url: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub season_ids: Vec<i32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlayer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub height: Option<f64>,
    pub position: Option<String>,
    pub jersey_number: Option<i32>,
    pub nationality: Option<String>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub bio: Option<Option<String>>,
    pub featured: Option<bool>,
    pub season_ids: Option<Vec<i32>>,
}

fn check_jersey(number: i32) -> Result<(), ApiError> {
    if !(0..=99).contains(&number) {
        return Err(ApiError::validation("Jersey number must be between 0 and 99"));
    }
    Ok(())
}

fn check_height(height: f64) -> Result<(), ApiError> {
    if !height.is_finite() || height <= 0.0 {
        return Err(ApiError::validation("Height must be a positive number"));
    }
    Ok(())
}

impl CreatePlayer {
    fn validate(&self) -> Result<(), ApiError> {
        require("firstName", &self.first_name)?;
        require("lastName", &self.last_name)?;
        require("position", &self.position)?;
        require("nationality", &self.nationality)?;
        check_jersey(self.jersey_number)?;
        check_height(self.height)
    }
}

impl UpdatePlayer {
    fn validate(&self) -> Result<(), ApiError> {
        for (field, value) in [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("position", &self.position),
            ("nationality", &self.nationality),
        ] {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        if let Some(number) = self.jersey_number {
            check_jersey(number)?;
        }
        if let Some(height) = self.height {
            check_height(height)?;
        }
        Ok(())
    }
}

#[instrument(skip(state))]
pub async fn list_players(
    State(state): State<SharedState>,
    Query(query): Query<PlayerQuery>,
) -> Result<ApiResponse<Vec<PlayerView>>, ApiError> {
    let PlayerQuery {
        featured,
        position,
        season,
    } = query;

    let rows = database::run(&state.pool, move |conn| {
        let mut q = players::table.into_boxed();
        if let Some(featured) = featured {
            q = q.filter(players::featured.eq(featured));
        }
        if let Some(position) = position {
            q = q.filter(players::position.eq(position));
        }
        Ok(q
            .order((players::jersey_number.asc(), players::last_name.asc()))
            .load::<Player>(conn)?)
    })
    .await?;

    let mut views = rows
        .into_iter()
        .map(PlayerView::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(season) = season {
        views.retain(|p| p.season_ids.contains(&season));
    }

    Ok(ApiResponse::ok(views))
}

#[instrument(skip(state))]
pub async fn get_player(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<PlayerView>, ApiError> {
    let id = parse_id(&id)?;
    let row = database::run(&state.pool, move |conn| {
        players::table
            .find(id)
            .first::<Player>(conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Player"))
    })
    .await?;

    Ok(ApiResponse::ok(row.try_into()?))
}

#[instrument(skip_all)]
pub async fn create_player(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Payload(payload): Payload<CreatePlayer>,
) -> Result<ApiResponse<PlayerView>, ApiError> {
    payload.validate()?;

    let stamp = now();
    let new_player = NewPlayer {
        season_ids: serde_json::to_string(&payload.season_ids)?,
        first_name: payload.first_name,
        last_name: payload.last_name,
        date_of_birth: payload.date_of_birth,
        height: payload.height,
        position: payload.position,
        jersey_number: payload.jersey_number,
        nationality: payload.nationality,
        image_url: payload.image_url,
        bio: payload.bio,
        featured: payload.featured,
        created_at: stamp,
        updated_at: stamp,
    };

    let row = database::run(&state.pool, move |conn| {
        Ok(conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(players::table)
                .values(&new_player)
                .execute(conn)?;
            players::table
                .order(players::id.desc())
                .first::<Player>(conn)
        })?)
    })
    .await?;

    info!("Created player {} #{}", row.id, row.jersey_number);
    Ok(ApiResponse::created(row.try_into()?))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_player(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdatePlayer>,
) -> Result<ApiResponse<PlayerView>, ApiError> {
    let id = parse_id(&id)?;
    payload.validate()?;

    let changes = PlayerChangeset {
        season_ids: payload
            .season_ids
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?,
        first_name: payload.first_name,
        last_name: payload.last_name,
        date_of_birth: payload.date_of_birth,
        height: payload.height,
        position: payload.position,
        jersey_number: payload.jersey_number,
        nationality: payload.nationality,
        image_url: payload.image_url,
        bio: payload.bio,
        featured: payload.featured,
        updated_at: Some(now()),
    };

    let row = database::run(&state.pool, move |conn| {
        let updated = diesel::update(players::table.find(id))
            .set(&changes)
            .execute(conn)?;
        if updated == 0 {
            return Err(ApiError::not_found("Player"));
        }
        Ok(players::table.find(id).first::<Player>(conn)?)
    })
    .await?;

    Ok(ApiResponse::ok(row.try_into()?))
}

#[instrument(skip(state, _admin))]
pub async fn delete_player(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = database::run(&state.pool, move |conn| {
        Ok(diesel::delete(players::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("Player"));
    }
    info!("Deleted player {id}");
    Ok(ApiResponse::message("Player deleted"))
}
