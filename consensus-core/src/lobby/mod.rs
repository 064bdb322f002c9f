mod lobby;

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use log::info;
use thiserror::Error;

use crate::category::{ActivityCounts, Category};
use crate::itinerary::ItineraryError;
use crate::options::{OptionProvider, ProviderError, VenueOption};
use crate::users::UserId;
use crate::util::random_code;
use crate::voting::{VoteError, VoteOutcome};
use crate::ConsensusContext;

pub use lobby::*;

#[derive(Debug, Error)]
pub enum LobbyError {
    #[error("{0}")]
    Validation(String),
    #[error("no lobby with code {0} exists")]
    CodeNotFound(String),
    #[error("lobby doesn't exist")]
    NotFound,
    #[error("the lobby is full")]
    Full,
    #[error("user is not a member of this lobby")]
    NotAMember,
    #[error("only the host can {0}")]
    NotOwner(&'static str),
    #[error("not every member is ready")]
    NotReady,
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("the game has not started")]
    NotStarted,
    #[error("round {0} does not exist")]
    UnknownRound(u32),
    #[error("round {0} has not resolved yet")]
    RoundNotResolved(u32),
    #[error("selected option does not match the round's winner")]
    WinnerMismatch,
    #[error("no {0} options are open in this timeframe; change the lobby date or hours")]
    NoOptions(Category),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error(transparent)]
    Itinerary(#[from] ItineraryError),
}

/// Parameters for a new lobby, already parsed into domain types
#[derive(Debug, Clone)]
pub struct NewLobby {
    pub host_id: UserId,
    pub location: (f64, f64),
    pub radius: f64,
    pub date: NaiveDate,
    pub start_hour: u32,
    pub end_hour: u32,
    pub activity_counts: ActivityCounts,
    pub max_members: Option<usize>,
}

/// Creates lobbies and resolves them by id or join code.
pub struct LobbyManager<P> {
    context: ConsensusContext<P>,
}

impl<P> LobbyManager<P>
where
    P: OptionProvider,
{
    pub fn new(context: &ConsensusContext<P>) -> Self {
        Self {
            context: context.clone(),
        }
    }

    /// Creates a new lobby with the host as its first, always-ready member.
    /// Fails with the first violated constraint.
    pub fn create_lobby(&self, new_lobby: NewLobby) -> Result<Arc<Lobby>, LobbyError> {
        let config = &self.context.config;

        let host = self
            .context
            .users
            .user_by_id(new_lobby.host_id)
            .map_err(|e| LobbyError::Validation(e.to_string()))?;

        let settings = validate(&new_lobby, config)?;
        let code = self.unique_code();

        let lobby = Arc::new(Lobby::new(config.clone(), code, host, settings));

        self.context.lobbies.insert(lobby.id(), lobby.clone());
        self.context.codes.insert(lobby.code().to_string(), lobby.id());
        self.context.memberships.insert(new_lobby.host_id, lobby.id());

        info!("created lobby {} ({})", lobby.code(), lobby.id());

        Ok(lobby)
    }

    pub fn lobby_by_id(&self, lobby_id: LobbyId) -> Result<Arc<Lobby>, LobbyError> {
        self.context
            .lobbies
            .get(&lobby_id)
            .map(|l| l.clone())
            .ok_or(LobbyError::NotFound)
    }

    pub fn lobby_by_code(&self, code: &str) -> Result<Arc<Lobby>, LobbyError> {
        let code = code.trim().to_ascii_uppercase();

        let id = self
            .context
            .codes
            .get(&code)
            .map(|entry| *entry)
            .ok_or_else(|| LobbyError::CodeNotFound(code.clone()))?;

        self.lobby_by_id(id)
    }

    /// Adds the user to the lobby with the given code. Re-joining the same
    /// lobby is a no-op success.
    pub fn join_lobby(&self, code: &str, user_id: UserId) -> Result<Arc<Lobby>, LobbyError> {
        let lobby = self.lobby_by_code(code)?;

        let user = self
            .context
            .users
            .user_by_id(user_id)
            .map_err(|e| LobbyError::Validation(e.to_string()))?;

        lobby.join(user)?;
        self.context.memberships.insert(user_id, lobby.id());

        Ok(lobby)
    }

    /// Removes the user from their current lobby. A departing host closes
    /// the lobby and retires its join code.
    pub fn leave_lobby(&self, user_id: UserId) -> Result<(), LobbyError> {
        let lobby_id = self
            .context
            .memberships
            .get(&user_id)
            .map(|entry| *entry)
            .ok_or(LobbyError::NotAMember)?;

        let lobby = self.lobby_by_id(lobby_id)?;

        if lobby.leave(user_id)? == LeaveOutcome::Closed {
            self.context.codes.remove(lobby.code());
            self.context
                .memberships
                .retain(|_, l| *l != lobby_id);
        } else {
            self.context.memberships.remove(&user_id);
        }

        Ok(())
    }

    pub fn start_game(&self, lobby_id: LobbyId, user_id: UserId) -> Result<Arc<Lobby>, LobbyError> {
        let lobby = self.lobby_by_id(lobby_id)?;
        lobby.start(user_id, self.context.provider.as_ref())?;

        Ok(lobby)
    }

    pub fn round_options(
        &self,
        lobby_id: LobbyId,
        round_number: u32,
    ) -> Result<Vec<VenueOption>, LobbyError> {
        self.lobby_by_id(lobby_id)?
            .round_options(round_number, self.context.provider.as_ref())
    }

    pub fn submit_vote(
        &self,
        lobby_id: LobbyId,
        user_id: UserId,
        round_number: u32,
        option_id: &str,
        vote: bool,
    ) -> Result<VoteOutcome, LobbyError> {
        self.lobby_by_id(lobby_id)?.submit_vote(
            self.context.provider.as_ref(),
            user_id,
            round_number,
            option_id,
            vote,
        )
    }

    fn unique_code(&self) -> String {
        loop {
            let code = random_code(self.context.config.join_code_length);

            if !self.context.codes.contains_key(&code) {
                return code;
            }
        }
    }
}

/// Checks every creation constraint in order, reporting the first violation.
fn validate(new_lobby: &NewLobby, config: &crate::Config) -> Result<LobbySettings, LobbyError> {
    let err = |message: String| Err(LobbyError::Validation(message));

    if new_lobby.radius < config.min_radius || new_lobby.radius > config.max_radius {
        return err(format!(
            "radius must be between {} and {} miles",
            config.min_radius, config.max_radius
        ));
    }

    let today = Local::now().date_naive();

    if new_lobby.date < today {
        return err("date cannot be in the past".to_string());
    }

    if new_lobby.date > today + Duration::days(config.max_days_ahead) {
        return err(format!(
            "date cannot be more than {} days ahead",
            config.max_days_ahead
        ));
    }

    if new_lobby.start_hour > 23 || new_lobby.end_hour > 23 {
        return err("hours must be between 0 and 23".to_string());
    }

    if new_lobby.start_hour >= new_lobby.end_hour {
        return err("end hour must be after start hour".to_string());
    }

    let window = new_lobby.end_hour - new_lobby.start_hour;

    if window > config.max_window_hours {
        return err(format!(
            "the planning window cannot be longer than {} hours",
            config.max_window_hours
        ));
    }

    let total = new_lobby.activity_counts.total();

    if total == 0 {
        return err("at least one activity must be requested".to_string());
    }

    if total > config.max_total_activities {
        return err(format!(
            "no more than {} activities can be requested",
            config.max_total_activities
        ));
    }

    // One round needs at least one hour
    if total > window {
        return err(format!(
            "{total} activities do not fit in a {window} hour window"
        ));
    }

    let max_members = new_lobby.max_members.unwrap_or(config.max_members);

    if max_members == 0 || max_members > config.max_members {
        return err(format!(
            "max members must be between 1 and {}",
            config.max_members
        ));
    }

    Ok(LobbySettings {
        location: new_lobby.location,
        radius: new_lobby.radius,
        date: new_lobby.date,
        start_hour: new_lobby.start_hour,
        end_hour: new_lobby.end_hour,
        activity_counts: new_lobby.activity_counts.clone(),
        max_members,
    })
}
