use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::{auth, error::ApiError, response::ApiResponse, state::SharedState};

pub mod contact;
pub mod matches;
pub mod news;
pub mod players;
pub mod seasons;
pub mod sponsors;
pub mod standings;
pub mod teams;
pub mod upload;

/// Ids in paths must be positive integers.
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::InvalidId(raw.to_string()))
}

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Tells an absent field (`None`) apart from an explicit `null` (`Some(None)`).
pub(crate) fn nullable<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(d).map(Some)
}

pub fn api() -> Router<SharedState> {
    Router::new()
        .route("/health", get(|| async { ApiResponse::<()>::message("ok") }))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route(
            "/players",
            get(players::list_players).post(players::create_player),
        )
        .route(
            "/players/:id",
            get(players::get_player)
                .patch(players::update_player)
                .put(players::update_player)
                .delete(players::delete_player),
        )
        .route("/teams", get(teams::list_teams).post(teams::create_team))
        .route(
            "/teams/:id",
            get(teams::get_team)
                .patch(teams::update_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        .route(
            "/matches",
            get(matches::list_matches).post(matches::create_match),
        )
        .route(
            "/matches/:id",
            get(matches::get_match)
                .patch(matches::update_match)
                .put(matches::update_match)
                .delete(matches::delete_match),
        )
        .route("/standings", get(standings::list_standings))
        .route("/standings/recalculate", post(standings::recalculate))
        .route(
            "/standings/:id",
            get(standings::get_standing)
                .patch(standings::update_standing)
                .put(standings::update_standing)
                .delete(standings::delete_standing),
        )
        .route(
            "/sponsors",
            get(sponsors::list_sponsors).post(sponsors::create_sponsor),
        )
        .route(
            "/sponsors/:id",
            get(sponsors::get_sponsor)
                .patch(sponsors::update_sponsor)
                .put(sponsors::update_sponsor)
                .delete(sponsors::delete_sponsor),
        )
        .route(
            "/seasons",
            get(seasons::list_seasons).post(seasons::create_season),
        )
        .route("/seasons/active", get(seasons::active_season))
        .route(
            "/seasons/:id",
            get(seasons::get_season)
                .patch(seasons::update_season)
                .put(seasons::update_season)
                .delete(seasons::delete_season),
        )
        .route("/news", get(news::list_news).post(news::create_article))
        .route("/news/slug/:slug", get(news::get_article_by_slug))
        .route(
            "/news/:id",
            get(news::get_article)
                .patch(news::update_article)
                .put(news::update_article)
                .delete(news::delete_article),
        )
        .route(
            "/contact",
            get(contact::list_messages).post(contact::create_message),
        )
        .route(
            "/contact/:id",
            get(contact::get_message)
                .patch(contact::update_message)
                .delete(contact::delete_message),
        )
        .route(
            "/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::max(upload::MAX_UPLOAD_BYTES)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        for raw in ["0", "-3", "abc", "65f0c2a1e4b0", ""] {
            assert!(matches!(parse_id(raw), Err(ApiError::InvalidId(_))), "{raw}");
        }
    }
}
