//! Socket.IO push channel for the public display pages.

use serde::Serialize;
use socketioxide::{
    extract::{Data, SocketRef},
    layer::SocketIoLayer,
    SocketIo,
};
use tracing::{debug, info, warn};

use crate::{
    message::{
        MatchRemoved, Message, MATCH_DELETED, MATCH_LIVE, MATCH_UPDATED, STANDINGS_UPDATED,
        SUBSCRIBED, SUBSCRIBE_FAILED, SUBSCRIBE_MATCH,
    },
    r#match::MatchDetails,
    standings::StandingView,
};

const MATCH_ROOM_PREFIX: &str = "match-";

pub fn layer() -> (SocketIoLayer, SocketIo) {
    let (layer, io) = SocketIo::new_layer();

    io.ns("/", |s: SocketRef| {
        info!("Live client {} connected", s.id);
        s.on(SUBSCRIBE_MATCH, handle_subscribe_match);
    });

    (layer, io)
}

fn match_room(match_id: i32) -> String {
    format!("{MATCH_ROOM_PREFIX}{match_id}")
}

fn handle_subscribe_match(s: SocketRef, Data(match_id): Data<i32>) {
    // A client follows at most one match at a time.
    if let Ok(rooms) = s.rooms() {
        for room in rooms {
            if room.starts_with(MATCH_ROOM_PREFIX) {
                s.leave(room).ok();
            }
        }
    }

    if s.join(match_room(match_id)).is_ok() {
        debug!("Live client {} follows match {match_id}", s.id);
        s.emit(SUBSCRIBED, match_id).ok();
    } else {
        s.emit(SUBSCRIBE_FAILED, match_id).ok();
    }
}

fn broadcast<T: Serialize>(io: &SocketIo, event: &'static str, data: T) {
    if let Err(e) = io.emit(event, Message::now(data)) {
        warn!("Failed to broadcast {event}: {e}");
    }
}

pub fn standings_updated(io: &SocketIo, table: &[StandingView]) {
    broadcast(io, STANDINGS_UPDATED, table);
}

pub fn match_updated(io: &SocketIo, details: &MatchDetails) {
    broadcast(io, MATCH_UPDATED, details);
    if let Err(e) = io
        .to(match_room(details.id))
        .emit(MATCH_LIVE, Message::now(details))
    {
        warn!("Failed to notify room of match {}: {e}", details.id);
    }
}

pub fn match_deleted(io: &SocketIo, id: i32) {
    broadcast(io, MATCH_DELETED, MatchRemoved { id });
}
