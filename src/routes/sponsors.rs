use axum::extract::{Path, Query, State};
use diesel::prelude::*;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{now, nullable, parse_id, require};
use crate::{
    auth::AdminSession,
    database::{
        self,
        model::{NewSponsor, Sponsor, SponsorChangeset},
        schema::sponsors,
    },
    error::ApiError,
    response::{ApiResponse, Payload},
    state::SharedState,
};

#[derive(Deserialize, Debug)]
pub struct SponsorQuery {
    pub tier: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateSponsor {
    pub name: String,
    pub logo_url: String,
    pub website: Option<String>,
    pub tier: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSponsor {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub website: Option<Option<String>>,
    pub tier: Option<String>,
}

#[instrument(skip(state))]
pub async fn list_sponsors(
    State(state): State<SharedState>,
    Query(query): Query<SponsorQuery>,
) -> Result<ApiResponse<Vec<Sponsor>>, ApiError> {
    let rows = database::run(&state.pool, move |conn| {
        let mut q = sponsors::table.into_boxed();
        if let Some(tier) = query.tier {
            q = q.filter(sponsors::tier.eq(tier));
        }
        Ok(q
            .order((sponsors::tier.asc(), sponsors::name.asc()))
            .load::<Sponsor>(conn)?)
    })
    .await?;

    Ok(ApiResponse::ok(rows))
}

#[instrument(skip(state))]
pub async fn get_sponsor(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Sponsor>, ApiError> {
    let id = parse_id(&id)?;
    let sponsor = database::run(&state.pool, move |conn| {
        sponsors::table
            .find(id)
            .first::<Sponsor>(conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Sponsor"))
    })
    .await?;

    Ok(ApiResponse::ok(sponsor))
}

#[instrument(skip_all)]
pub async fn create_sponsor(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Payload(payload): Payload<CreateSponsor>,
) -> Result<ApiResponse<Sponsor>, ApiError> {
    require("name", &payload.name)?;
    require("tier", &payload.tier)?;

    let stamp = now();
    let new_sponsor = NewSponsor {
        name: payload.name,
        logo_url: payload.logo_url,
        website: payload.website.filter(|w| !w.trim().is_empty()),
        tier: payload.tier,
        created_at: stamp,
        updated_at: stamp,
    };

    let sponsor = database::run(&state.pool, move |conn| {
        Ok(conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(sponsors::table)
                .values(&new_sponsor)
                .execute(conn)?;
            sponsors::table
                .order(sponsors::id.desc())
                .first::<Sponsor>(conn)
        })?)
    })
    .await?;

    info!("Created sponsor {} ({})", sponsor.id, sponsor.tier);
    Ok(ApiResponse::created(sponsor))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_sponsor(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateSponsor>,
) -> Result<ApiResponse<Sponsor>, ApiError> {
    let id = parse_id(&id)?;
    for (field, value) in [("name", &payload.name), ("tier", &payload.tier)] {
        if let Some(value) = value {
            require(field, value)?;
        }
    }

    let changes = SponsorChangeset {
        name: payload.name,
        logo_url: payload.logo_url,
        website: payload
            .website
            .map(|w| w.filter(|w| !w.trim().is_empty())),
        tier: payload.tier,
        updated_at: now(),
    };

    let sponsor = database::run(&state.pool, move |conn| {
        let updated = diesel::update(sponsors::table.find(id))
            .set(&changes)
            .execute(conn)?;
        if updated == 0 {
            return Err(ApiError::not_found("Sponsor"));
        }
        Ok(sponsors::table.find(id).first::<Sponsor>(conn)?)
    })
    .await?;

    Ok(ApiResponse::ok(sponsor))
}

#[instrument(skip(state, _admin))]
pub async fn delete_sponsor(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = database::run(&state.pool, move |conn| {
        Ok(diesel::delete(sponsors::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("Sponsor"));
    }
    Ok(ApiResponse::message("Sponsor deleted"))
}
