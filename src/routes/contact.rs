use axum::extract::{Path, Query, State};
use diesel::prelude::*;
use serde::Deserialize;
use tracing::{info, instrument};

use super::{now, parse_id, require};
use crate::{
    auth::AdminSession,
    database::{
        self,
        model::{ContactMessage, NewContactMessage},
        schema::contact_messages,
    },
    error::ApiError,
    response::{ApiResponse, Payload},
    state::SharedState,
};

const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Deserialize, Debug)]
pub struct ContactQuery {
    pub unread: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub struct CreateContactMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactMessage {
    pub is_read: bool,
}

impl CreateContactMessage {
    fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("message", &self.message)?;

        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(ApiError::validation("email is not a valid address"));
        }
        if self.message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ApiError::validation(format!(
                "message is longer than {MAX_MESSAGE_CHARS} characters"
            )));
        }
        Ok(())
    }
}

/// Public contact form.
#[instrument(skip_all)]
pub async fn create_message(
    State(state): State<SharedState>,
    Payload(payload): Payload<CreateContactMessage>,
) -> Result<ApiResponse<ContactMessage>, ApiError> {
    payload.validate()?;

    let new_message = NewContactMessage {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_string(),
        subject: payload.subject.filter(|s| !s.trim().is_empty()),
        message: payload.message,
        is_read: false,
        created_at: now(),
    };

    let message = database::run(&state.pool, move |conn| {
        Ok(conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(contact_messages::table)
                .values(&new_message)
                .execute(conn)?;
            contact_messages::table
                .order(contact_messages::id.desc())
                .first::<ContactMessage>(conn)
        })?)
    })
    .await?;

    info!("Contact message {} received", message.id);
    Ok(ApiResponse::created(message))
}

#[instrument(skip(state, _admin))]
pub async fn list_messages(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Query(query): Query<ContactQuery>,
) -> Result<ApiResponse<Vec<ContactMessage>>, ApiError> {
    let rows = database::run(&state.pool, move |conn| {
        let mut q = contact_messages::table.into_boxed();
        if query.unread == Some(true) {
            q = q.filter(contact_messages::is_read.eq(false));
        }
        Ok(q
            .order(contact_messages::created_at.desc())
            .load::<ContactMessage>(conn)?)
    })
    .await?;

    Ok(ApiResponse::ok(rows))
}

#[instrument(skip(state, _admin))]
pub async fn get_message(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<ApiResponse<ContactMessage>, ApiError> {
    let id = parse_id(&id)?;
    let message = database::run(&state.pool, move |conn| {
        contact_messages::table
            .find(id)
            .first::<ContactMessage>(conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Message"))
    })
    .await?;

    Ok(ApiResponse::ok(message))
}

#[instrument(skip(state, _admin))]
pub async fn update_message(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
    Payload(payload): Payload<UpdateContactMessage>,
) -> Result<ApiResponse<ContactMessage>, ApiError> {
    let id = parse_id(&id)?;
    let message = database::run(&state.pool, move |conn| {
        let updated = diesel::update(contact_messages::table.find(id))
            .set(contact_messages::is_read.eq(payload.is_read))
            .execute(conn)?;
        if updated == 0 {
            return Err(ApiError::not_found("Message"));
        }
        Ok(contact_messages::table
            .find(id)
            .first::<ContactMessage>(conn)?)
    })
    .await?;

    Ok(ApiResponse::ok(message))
}

#[instrument(skip(state, _admin))]
pub async fn delete_message(
    State(state): State<SharedState>,
    _admin: AdminSession,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id)?;
    let deleted = database::run(&state.pool, move |conn| {
        Ok(diesel::delete(contact_messages::table.find(id)).execute(conn)?)
    })
    .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("Message"));
    }
    Ok(ApiResponse::message("Message deleted"))
}
