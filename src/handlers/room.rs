//! Room commands: CREATE_ROOM, JOIN, LEAVE, LIST_ROOMS, WHO.

use crate::error::{HandlerError, HandlerResult};
use crate::handlers::{Context, Handler};
use async_trait::async_trait;
use std::sync::Arc;
use talk_proto::Message;
use tracing::info;

/// Room names are 3 to 20 word characters or hyphens.
fn is_valid_room_name(name: &str) -> bool {
    (3..=20).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

pub struct CreateRoomHandler;

#[async_trait]
impl Handler for CreateRoomHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let username = ctx.require_login()?.to_string();

        let name = ctx.payload.trim();
        if !is_valid_room_name(name) {
            return Err(HandlerError::InvalidRoomName);
        }

        let Some(room) = ctx.state.rooms.create_room(name) else {
            return Err(HandlerError::InvalidRoomName);
        };
        info!(room = room.id(), name, by = %username, "room created");
        ctx.reply(Message::ok(
            username,
            format!(
                "Room '{}' created with id {}. Use JOIN:{} to enter.",
                room.name(),
                room.id(),
                room.id()
            ),
        ));
        Ok(())
    }
}

pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let username = ctx.require_login()?.to_string();

        let payload = ctx.payload.trim();
        let id: u32 = payload
            .parse()
            .map_err(|_| HandlerError::Usage("JOIN:<room_id>"))?;

        // lookup happens before any membership change, so a bad id leaves
        // the current room untouched
        let room = ctx
            .state
            .rooms
            .get_room(id)
            .ok_or_else(|| HandlerError::NoSuchRoom(payload.to_string()))?;

        if let Some(current) = ctx.session.current_room() {
            if current.id() == room.id() {
                ctx.reply(Message::nok(
                    username,
                    format!("You are already in '{}'.", room.name()),
                ));
                return Ok(());
            }
            ctx.session.take_room();
            current.remove_member(ctx.session);
        }

        room.add_member(ctx.session);
        ctx.session.set_room(Arc::clone(&room));

        info!(session = ctx.session.id(), room = room.id(), "joined room");
        ctx.reply(Message::ok(
            username,
            format!("You joined [#{}] {}.", room.id(), room.name()),
        ));
        Ok(())
    }
}

pub struct LeaveHandler;

#[async_trait]
impl Handler for LeaveHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let username = ctx.require_login()?.to_string();

        let room = ctx.session.take_room().ok_or(HandlerError::NotInRoom)?;
        room.remove_member(ctx.session);

        info!(session = ctx.session.id(), room = room.id(), "left room");
        ctx.reply(Message::ok(
            username,
            format!("You left [#{}] {}.", room.id(), room.name()),
        ));
        Ok(())
    }
}

pub struct ListRoomsHandler;

#[async_trait]
impl Handler for ListRoomsHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let names = ctx.state.rooms.list_room_names();
        let content = if names.is_empty() {
            "No rooms available. Create one with CREATE_ROOM:<name>.".to_string()
        } else {
            format!("Rooms: {}", names.join(", "))
        };
        ctx.reply(Message::ok(ctx.session.username_or_star(), content));
        Ok(())
    }
}

pub struct WhoHandler;

#[async_trait]
impl Handler for WhoHandler {
    async fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let username = ctx.require_login()?.to_string();

        let room = ctx.session.current_room().ok_or(HandlerError::NotInRoom)?;
        let names = room.member_names();
        ctx.reply(Message::ok(
            username,
            format!(
                "Users in [#{}] {}: {}",
                room.id(),
                room.name(),
                names.join(", ")
            ),
        ));
        Ok(())
    }
}
