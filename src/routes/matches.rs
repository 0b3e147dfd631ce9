use axum::extract::{Path, Query, State};
use chrono::{DateTime, NaiveDateTime};
use diesel::{prelude::*, SqliteConnection};
use serde::{de, Deserialize, Deserializer};
use tracing::{debug, info, instrument};

use super::{now, nullable, parse_id};
use crate::{
    auth::AdminSession,
    database::{
        self,
        model::{Match, Team},
        schema::{matches, seasons, teams},
    },
    error::ApiError,
    live,
    match_result::{Scores, Winner},
    r#match::{MatchDetails, MatchDraft, MatchStatus, TeamSnapshot},
    response::{ApiResponse, Payload},
    standings::{self, StandingView},
    state::SharedState,
};

/// Accepts RFC 3339 timestamps (converted to UTC) as well as naive ones.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.naive_utc());
    }
    raw.parse::<NaiveDateTime>()
        .map_err(|e| format!("invalid date '{raw}': {e}"))
}

fn datetime<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    parse_datetime(&raw).map_err(de::Error::custom)
}

fn optional_datetime<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
    Option::<String>::deserialize(d)?
        .map(|raw| parse_datetime(&raw).map_err(de::Error::custom))
        .transpose()
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    pub season: Option<i32>,
    pub status: Option<MatchStatus>,
    pub team: Option<i32>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatch {
    pub season_id: i32,
    pub tournament: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub game_day: String,
    #[serde(deserialize_with = "datetime")]
    pub date: NaiveDateTime,
    pub location: String,
    pub home_team_id: i32,
    pub away_team_id: i32,
    #[serde(default)]
    pub status: MatchStatus,
    pub scores: Option<Scores>,
    pub winner_team: Option<Winner>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatch {
    pub season_id: Option<i32>,
    pub tournament: Option<String>,
    pub stage: Option<String>,
    pub game_day: Option<String>,
    #[serde(default, deserialize_with = "optional_datetime")]
    pub date: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub home_team_id: Option<i32>,
    pub away_team_id: Option<i32>,
    pub status: Option<MatchStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub scores: Option<Option<Scores>>,
    #[serde(default, deserialize_with = "nullable")]
    pub winner_team: Option<Option<Winner>>,
}

impl UpdateMatch {
    /// Whether the update can change what the match adds to the standings.
    fn touches_result(&self) -> bool {
        self.status.is_some()
            || self.scores.is_some()
            || self.winner_team.is_some()
            || self.home_team_id.is_some()
            || self.away_team_id.is_some()
    }
}

fn ensure_season(conn: &mut SqliteConnection, season_id: i32) -> Result<(), ApiError> {
    let found = seasons::table
        .find(season_id)
        .select(seasons::id)
        .first::<i32>(conn)
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(ApiError::validation(format!(
            "Season {season_id} does not exist"
        ))),
    }
}

fn team_snapshot(
    conn: &mut SqliteConnection,
    team_id: i32,
    side: &str,
) -> Result<TeamSnapshot, ApiError> {
    teams::table
        .find(team_id)
        .first::<Team>(conn)
        .optional()?
        .map(|team| TeamSnapshot::from(&team))
        .ok_or_else(|| ApiError::validation(format!("{side} team {team_id} does not exist")))
}

fn find_match(conn: &mut SqliteConnection, id: i32) -> Result<Match, ApiError> {
    matches::table
        .find(id)
        .first::<Match>(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found("Match"))
}

fn announce(state: &SharedState, details: &MatchDetails, table: Option<&[StandingView]>) {
    live::match_updated(&state.io, details);
    if let Some(table) = table {
        live::standings_updated(&state.io, table);
    }
}

#[instrument(skip(state))]
pub async fn list_matches(
    State(state): State<SharedState>,
    Query(query): Query<MatchQuery>,
) -> Result<ApiResponse<Vec<MatchDetails>>, ApiError> {
    let MatchQuery {
        season,
        status,
        team,
    } = query;

    let rows = database::run(&state.pool, move |conn| {
        let mut q = matches::table.into_boxed();
        if let Some(season) = season {
            q = q.filter(matches::season_id.eq(season));
        }
        if let Some(status) = status {
            q = q.filter(matches::status.eq(status.as_str()));
        }
        if let Some(team) = team {
            q = q.filter(
                matches::home_team_id
                    .eq(team)
                    .or(matches::away_team_id.eq(team)),
            );
        }
        Ok(q
            .order((matches::date.asc(), matches::id.asc()))
            .load::<Match>(conn)?)
    })
    .await?;

    let details = rows
        .iter()
        .map(MatchDetails::from_match)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ApiResponse::ok(details))
}

#[instrument(skip(state))]
pub async fn get_match(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<MatchDetails>, ApiError> {
    let id = parse_id(&id)?;
    let row = database::run(&state.pool, move |conn| find_match(conn, id)).await?;
    Ok(ApiResponse::ok(MatchDetails::from_match(&row)?))
}

#[instrument(skip_all)]
pub async fn create_match(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Payload(payload): Payload<CreateMatch>,
) -> Result<ApiResponse<MatchDetails>, ApiError> {
    if payload.home_team_id == payload.away_team_id {
        return Err(ApiError::validation("Home and away team must be different"));
    }

    let stamp = now();
    let (details, table) = database::run(&state.pool, move |conn| {
        ensure_season(conn, payload.season_id)?;
        let draft = MatchDraft {
            home_team: team_snapshot(conn, payload.home_team_id, "Home")?,
            away_team: team_snapshot(conn, payload.away_team_id, "Away")?,
            season_id: payload.season_id,
            tournament: payload.tournament,
            stage: payload.stage,
            game_day: payload.game_day,
            date: payload.date,
            location: payload.location,
            status: payload.status,
            scores: payload.scores,
            winner_team: payload.winner_team,
        }
        .resolve()?;
        let new_match = draft.into_row(stamp, stamp)?;

        let created = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(matches::table)
                .values(&new_match)
                .execute(conn)?;
            matches::table.order(matches::id.desc()).first::<Match>(conn)
        })?;
        let details = MatchDetails::from_match(&created)?;

        let table = if details.is_completed() {
            Some(standings::recalculate(conn)?)
        } else {
            None
        };
        Ok((details, table))
    })
    .await?;

    info!(
        "Created match {}: {} vs {} ({})",
        details.id, details.home_team.name, details.away_team.name, details.status
    );
    announce(&state, &details, table.as_deref());
    Ok(ApiResponse::created(details))
}

#[instrument(skip(state, _admin, payload))]
pub async fn update_match(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateMatch>,
) -> Result<ApiResponse<MatchDetails>, ApiError> {
    let id = parse_id(&id)?;
    let touches_result = payload.touches_result();

    let (details, table) = database::run(&state.pool, move |conn| {
        let before = MatchDetails::from_match(&find_match(conn, id)?)?;
        let was_completed = before.is_completed();
        let created_at = before.created_at;
        let mut draft = MatchDraft::from(before);

        if let Some(season_id) = payload.season_id {
            ensure_season(conn, season_id)?;
            draft.season_id = season_id;
        }
        if let Some(team_id) = payload.home_team_id {
            draft.home_team = team_snapshot(conn, team_id, "Home")?;
        }
        if let Some(team_id) = payload.away_team_id {
            draft.away_team = team_snapshot(conn, team_id, "Away")?;
        }
        if let Some(tournament) = payload.tournament {
            draft.tournament = tournament;
        }
        if let Some(stage) = payload.stage {
            draft.stage = stage;
        }
        if let Some(game_day) = payload.game_day {
            draft.game_day = game_day;
        }
        if let Some(date) = payload.date {
            draft.date = date;
        }
        if let Some(location) = payload.location {
            draft.location = location;
        }
        if let Some(status) = payload.status {
            draft.status = status;
        }
        if let Some(scores) = payload.scores {
            draft.scores = scores;
            // New scores re-derive the winner unless one is given explicitly.
            draft.winner_team = None;
        }
        if let Some(winner) = payload.winner_team {
            draft.winner_team = winner;
        }

        let row = draft.resolve()?.into_row(created_at, now())?;
        diesel::update(matches::table.find(id))
            .set(&row)
            .execute(conn)?;
        let details = MatchDetails::from_match(&find_match(conn, id)?)?;

        let table = if touches_result && (was_completed || details.is_completed()) {
            Some(standings::recalculate(conn)?)
        } else {
            None
        };
        Ok((details, table))
    })
    .await?;

    debug!("Updated match {id}, standings recalculated: {}", table.is_some());
    announce(&state, &details, table.as_deref());
    Ok(ApiResponse::ok(details))
}

#[instrument(skip(state, _admin))]
pub async fn delete_match(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id)?;

    let table = database::run(&state.pool, move |conn| {
        let existing = MatchDetails::from_match(&find_match(conn, id)?)?;
        diesel::delete(matches::table.find(id)).execute(conn)?;

        if existing.is_completed() {
            Ok(Some(standings::recalculate(conn)?))
        } else {
            Ok(None)
        }
    })
    .await?;

    info!("Deleted match {id}");
    live::match_deleted(&state.io, id);
    if let Some(table) = &table {
        live::standings_updated(&state.io, table);
    }
    Ok(ApiResponse::message("Match deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_accept_offsets_and_naive_values() {
        let utc = parse_datetime("2024-10-05T18:00:00Z").unwrap();
        let shifted = parse_datetime("2024-10-05T20:00:00+02:00").unwrap();
        let naive = parse_datetime("2024-10-05T18:00:00").unwrap();
        assert_eq!(utc, naive);
        assert_eq!(shifted, naive);
        assert!(parse_datetime("next saturday").is_err());
    }

    #[test]
    fn explicit_null_clears_scores() {
        let cleared: UpdateMatch = serde_json::from_str(r#"{"scores": null}"#).unwrap();
        assert_eq!(cleared.scores, Some(None));
        assert!(cleared.touches_result());

        let untouched: UpdateMatch = serde_json::from_str(r#"{"location": "Arena"}"#).unwrap();
        assert_eq!(untouched.scores, None);
        assert!(!untouched.touches_result());
    }
}
