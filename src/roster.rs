//! Online roster and room directory
//!
//! [`Roster`] mirrors the server's view of who is online; the server sends
//! full replacements (`onlineUsers`) and incremental status patches
//! (`userStatusChange`). [`RosterFilter`] narrows the visible roster by
//! gender and age band without touching the underlying data.

use crate::connection::RosterEntry;
use crate::types::{Gender, Room, RoomVisibility, User};

/// Age bands offered by the roster filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeBand {
    /// No age restriction
    #[default]
    Any,
    /// Strictly under 30
    Under30,
    /// 30 to 50 inclusive
    From30To50,
    /// Strictly over 50
    Over50,
}

impl AgeBand {
    fn matches(&self, age: u8) -> bool {
        match self {
            AgeBand::Any => true,
            AgeBand::Under30 => age < 30,
            AgeBand::From30To50 => (30..=50).contains(&age),
            AgeBand::Over50 => age > 50,
        }
    }
}

/// A view specification over the roster
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RosterFilter {
    /// Only show users of this gender, when set
    pub gender: Option<Gender>,
    /// Only show users in this age band
    pub age_band: AgeBand,
}

impl RosterFilter {
    fn matches(&self, user: &User) -> bool {
        if let Some(gender) = self.gender {
            if user.gender != gender {
                return false;
            }
        }
        self.age_band.matches(user.age)
    }
}

/// The set of currently online users, as last reported by the server
#[derive(Debug, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the roster wholesale (an `onlineUsers` push)
    pub fn replace(&mut self, entries: Vec<RosterEntry>) {
        self.entries = entries;
    }

    /// Patch one user's presence status (a `userStatusChange` push)
    ///
    /// Unknown user ids are ignored; a later full replacement will
    /// reconcile.
    pub fn set_status(&mut self, user_id: &str, status: impl Into<String>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.user.id == user_id) {
            entry.status = status.into();
        }
    }

    /// All entries, unfiltered
    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    /// Entries matching a filter, in server order
    pub fn filtered(&self, filter: &RosterFilter) -> Vec<&RosterEntry> {
        self.entries
            .iter()
            .filter(|e| filter.matches(&e.user))
            .collect()
    }

    /// Look up an online user by nickname (exact, case-insensitive)
    pub fn find_by_nickname(&self, nickname: &str) -> Option<&User> {
        self.entries
            .iter()
            .map(|e| &e.user)
            .find(|u| u.nickname.eq_ignore_ascii_case(nickname))
    }

    /// Look up an online user by id
    pub fn find_by_id(&self, user_id: &str) -> Option<&User> {
        self.entries
            .iter()
            .map(|e| &e.user)
            .find(|u| u.id == user_id)
    }
}

/// Format a roster distance (meters on the wire) for display
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Shorten a label for narrow table columns, appending an ellipsis
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

/// The set of rooms known to exist, split by visibility on display
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: Vec<Room>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the directory wholesale (a `roomsList` push)
    pub fn replace(&mut self, rooms: Vec<Room>) {
        self.rooms = rooms;
    }

    /// Add a newly created room; replaces any room with the same id
    pub fn upsert(&mut self, room: Room) {
        if let Some(existing) = self.rooms.iter_mut().find(|r| r.id == room.id) {
            *existing = room;
        } else {
            self.rooms.push(room);
        }
    }

    /// Remove a deleted room; unknown ids are ignored
    pub fn remove(&mut self, room_id: &str) {
        self.rooms.retain(|r| r.id != room_id);
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn public_rooms(&self) -> Vec<&Room> {
        self.rooms
            .iter()
            .filter(|r| r.visibility == RoomVisibility::Public)
            .collect()
    }

    pub fn private_rooms(&self) -> Vec<&Room> {
        self.rooms
            .iter()
            .filter(|r| r.visibility == RoomVisibility::Private)
            .collect()
    }

    /// Look up a room by name (exact, case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, nickname: &str, gender: Gender, age: u8) -> RosterEntry {
        let mut user = User::new(id, nickname);
        user.gender = gender;
        user.age = age;
        RosterEntry {
            user,
            distance: 0.0,
            status: "online".to_string(),
        }
    }

    #[test]
    fn test_replace_overwrites_previous_roster() {
        let mut roster = Roster::new();
        roster.replace(vec![entry("u1", "ana", Gender::Woman, 27)]);
        roster.replace(vec![entry("u2", "bob", Gender::Man, 30)]);
        assert_eq!(roster.entries().len(), 1);
        assert_eq!(roster.entries()[0].user.id, "u2");
    }

    #[test]
    fn test_set_status_patches_matching_entry() {
        let mut roster = Roster::new();
        roster.replace(vec![
            entry("u1", "ana", Gender::Woman, 27),
            entry("u2", "bob", Gender::Man, 30),
        ]);
        roster.set_status("u2", "away");
        assert_eq!(roster.entries()[0].status, "online");
        assert_eq!(roster.entries()[1].status, "away");
    }

    #[test]
    fn test_set_status_unknown_id_is_noop() {
        let mut roster = Roster::new();
        roster.replace(vec![entry("u1", "ana", Gender::Woman, 27)]);
        roster.set_status("nope", "away");
        assert_eq!(roster.entries()[0].status, "online");
    }

    #[test]
    fn test_filter_by_gender() {
        let mut roster = Roster::new();
        roster.replace(vec![
            entry("u1", "ana", Gender::Woman, 27),
            entry("u2", "bob", Gender::Man, 30),
        ]);
        let filter = RosterFilter {
            gender: Some(Gender::Woman),
            age_band: AgeBand::Any,
        };
        let visible = roster.filtered(&filter);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].user.nickname, "ana");
    }

    #[test]
    fn test_filter_age_bands() {
        let mut roster = Roster::new();
        roster.replace(vec![
            entry("u1", "ana", Gender::Woman, 29),
            entry("u2", "bob", Gender::Man, 30),
            entry("u3", "cal", Gender::Man, 50),
            entry("u4", "dee", Gender::Woman, 51),
        ]);
        let band = |age_band| RosterFilter {
            gender: None,
            age_band,
        };
        assert_eq!(roster.filtered(&band(AgeBand::Under30)).len(), 1);
        assert_eq!(roster.filtered(&band(AgeBand::From30To50)).len(), 2);
        assert_eq!(roster.filtered(&band(AgeBand::Over50)).len(), 1);
        assert_eq!(roster.filtered(&band(AgeBand::Any)).len(), 4);
    }

    #[test]
    fn test_find_by_nickname_case_insensitive() {
        let mut roster = Roster::new();
        roster.replace(vec![entry("u1", "Ana", Gender::Woman, 27)]);
        assert!(roster.find_by_nickname("ana").is_some());
        assert!(roster.find_by_nickname("zoe").is_none());
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(250.0), "250 m");
        assert_eq!(format_distance(12345.0), "12.3 km");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short", 10), "short");
        assert_eq!(truncate_label("a rather long label", 8), "a rathe…");
    }

    #[test]
    fn test_room_directory_replace_and_split() {
        let mut directory = RoomDirectory::new();
        directory.replace(vec![
            Room::public("r1", "General"),
            Room {
                id: "r2".to_string(),
                name: "Secret".to_string(),
                visibility: RoomVisibility::Private,
            },
        ]);
        assert_eq!(directory.public_rooms().len(), 1);
        assert_eq!(directory.private_rooms().len(), 1);
    }

    #[test]
    fn test_room_directory_upsert_and_remove() {
        let mut directory = RoomDirectory::new();
        directory.upsert(Room::public("r1", "General"));
        directory.upsert(Room::public("r1", "Renamed"));
        assert_eq!(directory.rooms().len(), 1);
        assert_eq!(directory.get("r1").unwrap().name, "Renamed");

        directory.remove("r1");
        directory.remove("r1");
        assert!(directory.rooms().is_empty());
    }

    #[test]
    fn test_room_directory_find_by_name() {
        let mut directory = RoomDirectory::new();
        directory.upsert(Room::public("r1", "General"));
        assert!(directory.find_by_name("general").is_some());
        assert!(directory.find_by_name("other").is_none());
    }
}
