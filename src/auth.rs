//! Admin sign-in.
//!
//! There is a single admin account whose credentials come from the
//! configuration. Logging in hands out a bearer token stored in the `tokens`
//! table; admin-only handlers take an [`AdminSession`] argument.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use diesel::{prelude::*, SqliteConnection};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    database::{
        self,
        model::{NewToken, NewUser, Token, User},
        schema::{
            tokens::dsl::{created_at as token_created_at, invalidated, token, tokens},
            users::dsl::{password, username, users},
        },
    },
    error::ApiError,
    response::{ApiResponse, Payload},
    state::SharedState,
};

const TOKEN_LENGTH: usize = 48;

/// Creates the admin account, or refreshes its password when it changed.
pub fn ensure_admin(
    conn: &mut SqliteConnection,
    admin_username: &str,
    admin_password: &str,
) -> Result<(), ApiError> {
    let existing = users
        .filter(username.eq(admin_username))
        .first::<User>(conn)
        .optional()?;

    match existing {
        Some(user) if user.password == admin_password => {}
        Some(user) => {
            diesel::update(users.find(user.id))
                .set(password.eq(admin_password))
                .execute(conn)?;
            info!("Updated password of admin account {admin_username}");
        }
        None => {
            diesel::insert_into(users)
                .values(NewUser {
                    username: admin_username,
                    password: admin_password,
                    created_at: Utc::now().naive_utc(),
                })
                .execute(conn)?;
            info!("Created admin account {admin_username}");
        }
    }

    Ok(())
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Deletes tokens that were signed out or have outlived the session TTL.
pub fn prune_tokens(conn: &mut SqliteConnection, ttl_hours: i64) -> QueryResult<usize> {
    let oldest_valid = Utc::now().naive_utc() - Duration::hours(ttl_hours);
    diesel::delete(tokens.filter(invalidated.eq(true).or(token_created_at.le(oldest_valid))))
        .execute(conn)
}

/// Resolves a bearer token to its user, if the token is still valid.
pub fn token_to_user(
    conn: &mut SqliteConnection,
    bearer: &str,
    ttl_hours: i64,
) -> Result<Option<(User, Token)>, ApiError> {
    let oldest_valid = Utc::now().naive_utc() - Duration::hours(ttl_hours);

    let Some(token_row) = tokens
        .filter(token.eq(bearer).and(invalidated.eq(false)))
        .filter(token_created_at.gt(oldest_valid))
        .first::<Token>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let user = users.find(token_row.user_id).first::<User>(conn).optional()?;
    Ok(user.map(|user| (user, token_row)))
}

#[derive(Clone, Debug)]
pub struct AdminSession {
    pub user_id: i32,
    pub username: String,
    pub token: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<SharedState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        let ttl = state.config.session_ttl_hours;

        let (user, token_row) =
            database::run(&state.pool, move |conn| token_to_user(conn, &bearer, ttl))
                .await?
                .ok_or(ApiError::Unauthorized)?;

        Ok(AdminSession {
            user_id: user.id,
            username: user.username,
            token: token_row.token,
        })
    }
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct SessionView {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[instrument(skip_all, fields(username = %payload.username))]
pub async fn login(
    State(state): State<SharedState>,
    Payload(payload): Payload<LoginPayload>,
) -> Result<ApiResponse<SessionView>, ApiError> {
    let LoginPayload {
        username: name,
        password: secret,
    } = payload;
    let ttl = state.config.session_ttl_hours;

    let session = database::run(&state.pool, move |conn| {
        let user = users
            .filter(username.eq(&name))
            .first::<User>(conn)
            .optional()?;

        let Some(user) = user.filter(|u| u.password == secret) else {
            return Ok(None);
        };

        let pruned = prune_tokens(conn, ttl)?;
        if pruned > 0 {
            debug!("Pruned {pruned} stale token(s)");
        }

        let new_token = NewToken {
            token: generate_token(),
            user_id: user.id,
            invalidated: false,
            created_at: Utc::now().naive_utc(),
        };
        diesel::insert_into(tokens).values(&new_token).execute(conn)?;

        Ok(Some(SessionView {
            username: user.username,
            token: Some(new_token.token),
        }))
    })
    .await?;

    match session {
        Some(session) => {
            info!("Admin signed in");
            Ok(ApiResponse::ok(session))
        }
        None => {
            warn!("Rejected sign-in attempt");
            Err(ApiError::Unauthorized)
        }
    }
}

#[instrument(skip_all, fields(user = %session.username))]
pub async fn logout(
    State(state): State<SharedState>,
    session: AdminSession,
) -> Result<ApiResponse<()>, ApiError> {
    database::run(&state.pool, move |conn| {
        diesel::update(tokens.filter(token.eq(&session.token)))
            .set(invalidated.eq(true))
            .execute(conn)?;
        Ok(())
    })
    .await?;

    Ok(ApiResponse::message("Signed out"))
}

pub async fn me(session: AdminSession) -> ApiResponse<SessionView> {
    ApiResponse::ok(SessionView {
        username: session.username,
        token: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::establish_pool;

    fn add_token(conn: &mut SqliteConnection, value: &str, hours_old: i64, signed_out: bool) {
        diesel::insert_into(tokens)
            .values(NewToken {
                token: value.to_string(),
                user_id: 1,
                invalidated: signed_out,
                created_at: Utc::now().naive_utc() - Duration::hours(hours_old),
            })
            .execute(conn)
            .unwrap();
    }

    #[test]
    fn stale_tokens_are_pruned() {
        let pool = establish_pool(":memory:").unwrap();
        let mut conn = pool.get().unwrap();
        add_token(&mut conn, "fresh", 1, false);
        add_token(&mut conn, "expired", 48, false);
        add_token(&mut conn, "signed-out", 1, true);

        assert_eq!(prune_tokens(&mut conn, 24).unwrap(), 2);
        let left: Vec<String> = tokens.select(token).load(&mut conn).unwrap();
        assert_eq!(left, ["fresh"]);
    }
}
