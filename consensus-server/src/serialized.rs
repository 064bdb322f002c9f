//! All schemas that are exposed from endpoints are defined here
//! along with the [ToSerialized] impls

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use consensus_core::{
    format_hour, IdType, ItineraryEntry, Lobby as CoreLobby, LobbyRoster, Member as CoreMember,
    OpeningHours, RoundCompletion, RoundStatus as CoreRoundStatus, UserData, VenueOption,
    WaitingStatus,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct User {
    user_id: IdType,
    username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Member {
    user_id: IdType,
    username: String,
    is_owner: bool,
    is_ready: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Location {
    lat: f64,
    lng: f64,
}

/// The full lobby view, returned on creation and joining
#[derive(Debug, Serialize, ToSchema)]
pub struct Lobby {
    lobby_id: IdType,
    code: String,
    status: String,
    host_id: IdType,
    location: Location,
    radius: f64,
    /// MM/DD/YYYY
    date: String,
    start_hour: u32,
    end_hour: u32,
    activity_counts: HashMap<String, u32>,
    max_members: usize,
    total_rounds: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Roster {
    code: String,
    members: Vec<Member>,
    all_ready: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Hours {
    open: u32,
    close: u32,
    days: Option<Vec<u32>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoundOption {
    id: String,
    name: String,
    category: String,
    location: Location,
    address: String,
    hours: Option<Hours>,
    image: Option<String>,
    duration: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoundOptions {
    pub round: u32,
    pub options: Vec<RoundOption>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StartResult {
    pub ok: bool,
    pub current_round: u32,
    pub total_rounds: u32,
}

/// Generic acknowledgement body for operations with no richer payload
#[derive(Debug, Serialize, ToSchema)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoundStatus {
    consensus_reached: bool,
    consensus_option_id: Option<String>,
    is_tie: bool,
    tied_options: Vec<String>,
    all_voted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Completion {
    all_rounds_completed: bool,
    next_round: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Waiting {
    current_round: u32,
    total_rounds: u32,
    users_waiting: Vec<String>,
    all_finished: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Activity {
    id: String,
    name: String,
    category: String,
    /// "HH:00", or "N/A" when the entry did not fit the window
    time: String,
    duration: u32,
    hours: Option<Hours>,
    location: Location,
    address: String,
    image: Option<String>,
    round_number: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItineraryBody {
    pub activities: Vec<Activity>,
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<User> for Arc<UserData> {
    fn to_serialized(&self) -> User {
        User {
            user_id: self.id.value(),
            username: self.username.clone(),
        }
    }
}

impl ToSerialized<Member> for CoreMember {
    fn to_serialized(&self) -> Member {
        Member {
            user_id: self.user.id.value(),
            username: self.user.username.clone(),
            is_owner: self.is_owner,
            is_ready: self.is_ready,
        }
    }
}

impl ToSerialized<Location> for (f64, f64) {
    fn to_serialized(&self) -> Location {
        Location {
            lat: self.0,
            lng: self.1,
        }
    }
}

impl ToSerialized<Lobby> for Arc<CoreLobby> {
    fn to_serialized(&self) -> Lobby {
        let settings = self.settings();

        let activity_counts = settings
            .activity_counts
            .iter()
            .map(|(category, count)| (category.name().to_string(), count))
            .collect();

        Lobby {
            lobby_id: self.id().value(),
            code: self.code().to_string(),
            status: self.status().name().to_string(),
            host_id: self.host_id().value(),
            location: settings.location.to_serialized(),
            radius: settings.radius,
            date: settings.date.format("%m/%d/%Y").to_string(),
            start_hour: settings.start_hour,
            end_hour: settings.end_hour,
            activity_counts,
            max_members: settings.max_members,
            total_rounds: self.total_rounds(),
        }
    }
}

impl ToSerialized<Roster> for LobbyRoster {
    fn to_serialized(&self) -> Roster {
        Roster {
            code: self.code.clone(),
            members: self.members.to_serialized(),
            all_ready: self.all_ready,
        }
    }
}

impl ToSerialized<Hours> for OpeningHours {
    fn to_serialized(&self) -> Hours {
        Hours {
            open: self.open,
            close: self.close,
            days: self.days.clone(),
        }
    }
}

impl ToSerialized<RoundOption> for VenueOption {
    fn to_serialized(&self) -> RoundOption {
        RoundOption {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.name().to_string(),
            location: self.location.to_serialized(),
            address: self.address.clone(),
            hours: self.hours.as_ref().map(|h| h.to_serialized()),
            image: self.image.clone(),
            duration: self.duration,
        }
    }
}

impl ToSerialized<RoundStatus> for CoreRoundStatus {
    fn to_serialized(&self) -> RoundStatus {
        RoundStatus {
            consensus_reached: self.consensus_reached,
            consensus_option_id: self.consensus_option_id.clone(),
            is_tie: self.is_tie,
            tied_options: self.tied_options.clone(),
            all_voted: self.all_voted,
        }
    }
}

impl ToSerialized<Completion> for RoundCompletion {
    fn to_serialized(&self) -> Completion {
        Completion {
            all_rounds_completed: self.all_rounds_completed,
            next_round: self.next_round,
        }
    }
}

impl ToSerialized<Waiting> for WaitingStatus {
    fn to_serialized(&self) -> Waiting {
        Waiting {
            current_round: self.current_round,
            total_rounds: self.total_rounds,
            users_waiting: self.users_waiting.clone(),
            all_finished: self.all_finished,
        }
    }
}

impl ToSerialized<Activity> for ItineraryEntry {
    fn to_serialized(&self) -> Activity {
        let time = self
            .start_hour
            .map(format_hour)
            .unwrap_or_else(|| "N/A".to_string());

        Activity {
            id: self.option.id.clone(),
            name: self.option.name.clone(),
            category: self.option.category.name().to_string(),
            time,
            duration: self.duration,
            hours: self.option.hours.as_ref().map(|h| h.to_serialized()),
            location: self.option.location.to_serialized(),
            address: self.option.address.clone(),
            image: self.option.image.clone(),
            round_number: self.round_number,
        }
    }
}
