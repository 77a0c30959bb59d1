//! Rooms and the room directory.

use crate::state::{Session, SessionId};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use talk_proto::Message;
use tracing::debug;

/// Room ids start here; lower values are reserved.
const FIRST_ROOM_ID: u32 = 100;

/// A named, id-addressed broadcast group with a dynamic member set.
///
/// Membership mutation and the matching arrival/departure broadcast happen
/// under the member lock, so no reader can observe a notice about a member
/// that is not (or no longer) in the set. Delivery inside the lock is safe
/// because [`Session::send`] never blocks.
#[derive(Debug)]
pub struct Room {
    id: u32,
    name: String,
    members: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl Room {
    fn new(id: u32, name: &str) -> Arc<Self> {
        Arc::new(Self {
            id,
            name: name.to_string(),
            members: Mutex::new(HashMap::new()),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a session and notify every current member, the new one included.
    pub fn add_member(&self, session: &Arc<Session>) {
        let mut members = self.members.lock();
        members.insert(session.id(), Arc::clone(session));
        let notice = Arc::new(Message::system(format!(
            "'{}' has joined the room.",
            session.username_or_star()
        )));
        let delivered = deliver(members.values(), &notice);
        debug!(room = self.id, session = session.id(), delivered, "member joined");
    }

    /// Remove a session; the departure notice fires only if it was actually
    /// a member.
    pub fn remove_member(&self, session: &Arc<Session>) {
        let mut members = self.members.lock();
        if members.remove(&session.id()).is_none() {
            return;
        }
        let notice = Arc::new(Message::system(format!(
            "'{}' has left the room.",
            session.username_or_star()
        )));
        let delivered = deliver(members.values(), &notice);
        debug!(room = self.id, session = session.id(), delivered, "member left");
    }

    /// Deliver a message to every current member. Returns the number of
    /// members the message was queued for.
    pub fn broadcast(&self, message: Message) -> usize {
        let members = self.members.lock();
        deliver(members.values(), &Arc::new(message))
    }

    /// Usernames of members that have completed login, sorted for stable
    /// output.
    pub fn member_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .members
            .lock()
            .values()
            .filter_map(|s| s.username().map(str::to_string))
            .collect();
        names.sort();
        names
    }

    pub fn member_count(&self) -> usize {
        self.members.lock().len()
    }

    pub fn contains(&self, session: &Session) -> bool {
        self.members.lock().contains_key(&session.id())
    }
}

fn deliver<'a>(
    members: impl Iterator<Item = &'a Arc<Session>>,
    message: &Arc<Message>,
) -> usize {
    members
        .filter(|member| member.send(Arc::clone(message)))
        .count()
}

/// Owns every room on the server. Ids are assigned monotonically from 100
/// and never reused; rooms are never destroyed. Names need not be unique.
#[derive(Debug)]
pub struct RoomDirectory {
    rooms: DashMap<u32, Arc<Room>>,
    next_id: AtomicU32,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            next_id: AtomicU32::new(FIRST_ROOM_ID),
        }
    }

    /// Create a room with the next id. Returns `None` only for a blank name.
    pub fn create_room(&self, name: &str) -> Option<Arc<Room>> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let room = Room::new(id, name);
        self.rooms.insert(id, Arc::clone(&room));
        Some(room)
    }

    pub fn get_room(&self, id: u32) -> Option<Arc<Room>> {
        self.rooms.get(&id).map(|r| Arc::clone(&r))
    }

    /// Every room formatted `[#<id>] <name>`, sorted by id.
    pub fn list_room_names(&self) -> Vec<String> {
        let mut rooms: Vec<(u32, String)> = self
            .rooms
            .iter()
            .map(|r| (r.id(), r.name().to_string()))
            .collect();
        rooms.sort_by_key(|(id, _)| *id);
        rooms
            .into_iter()
            .map(|(id, name)| format!("[#{id}] {name}"))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}
