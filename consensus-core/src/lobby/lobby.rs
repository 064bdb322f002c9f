use std::sync::Arc;

use chrono::NaiveDate;
use log::info;
use parking_lot::Mutex;

use crate::category::ActivityCounts;
use crate::config::Config;
use crate::itinerary::{Itinerary, ItineraryError};
use crate::options::{day_of_week, OptionProvider, VenueOption};
use crate::rounds::sequence_rounds;
use crate::users::{UserData, UserId};
use crate::util::Id;
use crate::voting::{Round, RoundStatus, VoteError, VoteOutcome};

use super::LobbyError;

pub type LobbyId = Id<Lobby>;

/// The immutable planning parameters a lobby is created with
#[derive(Debug, Clone)]
pub struct LobbySettings {
    /// (latitude, longitude) of the search center
    pub location: (f64, f64),
    /// Search radius in miles
    pub radius: f64,
    pub date: NaiveDate,
    /// Start of the planning window, 0-23
    pub start_hour: u32,
    /// End of the planning window, 0-23, after `start_hour`
    pub end_hour: u32,
    pub activity_counts: ActivityCounts,
    pub max_members: usize,
}

/// A member of a lobby, in joined-at order
#[derive(Debug, Clone)]
pub struct Member {
    pub user: Arc<UserData>,
    pub is_owner: bool,
    /// The owner is implicitly always ready
    pub is_ready: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyStatus {
    /// Members are joining and readying up
    Waiting,
    /// Rounds are running
    InProgress,
    /// Every round resolved; the itinerary has not been built yet
    AwaitingItinerary,
    /// The itinerary has been delivered
    Completed,
    /// The host left before the session finished
    Closed,
}

impl LobbyStatus {
    pub fn name(&self) -> &'static str {
        match self {
            LobbyStatus::Waiting => "waiting",
            LobbyStatus::InProgress => "in_progress",
            LobbyStatus::AwaitingItinerary => "awaiting_itinerary",
            LobbyStatus::Completed => "completed",
            LobbyStatus::Closed => "closed",
        }
    }
}

/// What happened when a member left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    Left,
    /// The host left, which closes the lobby
    Closed,
}

/// A point-in-time roster view
#[derive(Debug, Clone)]
pub struct LobbyRoster {
    pub code: String,
    pub members: Vec<Member>,
    pub all_ready: bool,
}

/// Progress data for the waiting screen
#[derive(Debug, Clone)]
pub struct WaitingStatus {
    pub current_round: u32,
    pub total_rounds: u32,
    /// Usernames of members who have not finished the active pass
    pub users_waiting: Vec<String>,
    pub all_finished: bool,
}

/// The acknowledgement for a round-complete request
#[derive(Debug, Clone)]
pub struct RoundCompletion {
    pub all_rounds_completed: bool,
    pub next_round: Option<u32>,
}

/// A group session bound to one planning day.
///
/// All mutable state lives behind a single mutex, so a vote write and the
/// evaluation it triggers always happen in one critical section, and two
/// concurrent submissions cannot both observe "pending".
pub struct Lobby {
    id: LobbyId,
    code: String,
    host_id: UserId,
    settings: LobbySettings,
    config: Config,
    state: Mutex<LobbyState>,
}

struct LobbyState {
    status: LobbyStatus,
    members: Vec<Member>,
    /// One entry per planned round, created at start in sequence order
    rounds: Vec<Round>,
    /// Index of the active round while in progress
    current: usize,
    itinerary: Option<Itinerary>,
}

impl Lobby {
    pub fn new(config: Config, code: String, host: Arc<UserData>, settings: LobbySettings) -> Self {
        let host_id = host.id;

        let host_member = Member {
            user: host,
            is_owner: true,
            is_ready: true,
        };

        Self {
            id: LobbyId::new(),
            code,
            host_id,
            settings,
            config,
            state: Mutex::new(LobbyState {
                status: LobbyStatus::Waiting,
                members: vec![host_member],
                rounds: Vec::new(),
                current: 0,
                itinerary: None,
            }),
        }
    }

    pub fn id(&self) -> LobbyId {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn host_id(&self) -> UserId {
        self.host_id
    }

    pub fn settings(&self) -> &LobbySettings {
        &self.settings
    }

    pub fn status(&self) -> LobbyStatus {
        self.state.lock().status
    }

    pub fn total_rounds(&self) -> u32 {
        self.settings.activity_counts.total()
    }

    /// Adds the user as a member. Re-joining is a no-op success.
    pub fn join(&self, user: Arc<UserData>) -> Result<(), LobbyError> {
        let mut state = self.state.lock();

        if state.members.iter().any(|m| m.user.id == user.id) {
            return Ok(());
        }

        match state.status {
            LobbyStatus::Waiting => {}
            LobbyStatus::Closed => return Err(LobbyError::NotFound),
            _ => return Err(LobbyError::AlreadyStarted),
        }

        if state.members.len() >= self.settings.max_members {
            return Err(LobbyError::Full);
        }

        info!("{} joined lobby {}", user.username, self.code);

        state.members.push(Member {
            user,
            is_owner: false,
            is_ready: false,
        });

        Ok(())
    }

    /// Removes the member. A departing host closes the lobby, since every
    /// owner-gated operation would otherwise be stranded.
    pub fn leave(&self, user_id: UserId) -> Result<LeaveOutcome, LobbyError> {
        let mut state = self.state.lock();

        let member = state
            .members
            .iter()
            .find(|m| m.user.id == user_id)
            .cloned()
            .ok_or(LobbyError::NotAMember)?;

        if member.is_owner {
            info!("host left, closing lobby {}", self.code);
            state.status = LobbyStatus::Closed;
            return Ok(LeaveOutcome::Closed);
        }

        info!("{} left lobby {}", member.user.username, self.code);
        state.members.retain(|m| m.user.id != user_id);

        // The departure may have been the last thing holding up the round
        if state.status == LobbyStatus::InProgress {
            self.evaluate_current(&mut state);
        }

        Ok(LeaveOutcome::Left)
    }

    /// Sets a member's ready flag. A no-op success for the owner, who is
    /// always ready.
    pub fn set_ready(&self, user_id: UserId, ready: bool) -> Result<(), LobbyError> {
        let mut state = self.state.lock();

        let member = state
            .members
            .iter_mut()
            .find(|m| m.user.id == user_id)
            .ok_or(LobbyError::NotAMember)?;

        if !member.is_owner {
            member.is_ready = ready;
        }

        Ok(())
    }

    pub fn roster(&self) -> LobbyRoster {
        let state = self.state.lock();

        LobbyRoster {
            code: self.code.clone(),
            members: state.members.clone(),
            all_ready: state.members.iter().all(|m| m.is_ready),
        }
    }

    /// Starts the game: builds the round sequence and loads the first
    /// round's candidates so a `NoOptions` condition surfaces to the host
    /// immediately.
    pub fn start<P>(&self, user_id: UserId, provider: &P) -> Result<(), LobbyError>
    where
        P: OptionProvider,
    {
        let mut state = self.state.lock();

        if user_id != self.host_id {
            return Err(LobbyError::NotOwner("start the game"));
        }

        if state.status != LobbyStatus::Waiting {
            return Err(LobbyError::AlreadyStarted);
        }

        if !state.members.iter().all(|m| m.is_ready) {
            return Err(LobbyError::NotReady);
        }

        state.rounds = sequence_rounds(&self.settings.activity_counts)
            .into_iter()
            .map(|plan| Round::new(plan.round_number, plan.category))
            .collect();
        state.current = 0;

        self.load_round(&mut state, 0, provider)?;

        state.status = LobbyStatus::InProgress;

        info!(
            "lobby {} started with {} rounds",
            self.code,
            self.total_rounds()
        );

        Ok(())
    }

    /// The candidate set the given round is currently voting over
    pub fn round_options<P>(
        &self,
        round_number: u32,
        provider: &P,
    ) -> Result<Vec<VenueOption>, LobbyError>
    where
        P: OptionProvider,
    {
        let mut state = self.state.lock();

        let index = self.round_index(&state, round_number)?;
        self.load_round(&mut state, index, provider)?;

        Ok(state.rounds[index]
            .active_options()
            .into_iter()
            .cloned()
            .collect())
    }

    /// Records a vote and evaluates the round in the same critical section.
    pub fn submit_vote<P>(
        &self,
        provider: &P,
        user_id: UserId,
        round_number: u32,
        option_id: &str,
        vote: bool,
    ) -> Result<VoteOutcome, LobbyError>
    where
        P: OptionProvider,
    {
        let mut state = self.state.lock();

        if !state.members.iter().any(|m| m.user.id == user_id) {
            return Err(LobbyError::NotAMember);
        }

        if state.status != LobbyStatus::InProgress {
            return Err(LobbyError::NotStarted);
        }

        let index = self.round_index(&state, round_number)?;

        if index != state.current {
            // Late votes for settled rounds are rejected, never applied
            return Err(VoteError::RoundClosed(round_number).into());
        }

        self.load_round(&mut state, index, provider)?;

        state.rounds[index].record_vote(user_id, option_id, vote)?;

        Ok(self.evaluate_current(&mut state))
    }

    pub fn round_status(&self, round_number: u32) -> Result<RoundStatus, LobbyError> {
        let state = self.state.lock();

        let index = self.round_index(&state, round_number)?;
        let members = Self::member_ids(&state);

        Ok(state.rounds[index].status(&members))
    }

    /// Acknowledges a resolved round. Idempotent; validates the client's
    /// selection against the recorded winner.
    pub fn complete_round(
        &self,
        round_number: u32,
        user_id: UserId,
        selected_option_id: &str,
    ) -> Result<RoundCompletion, LobbyError> {
        let state = self.state.lock();

        if !state.members.iter().any(|m| m.user.id == user_id) {
            return Err(LobbyError::NotAMember);
        }

        let index = self.round_index(&state, round_number)?;
        let round = &state.rounds[index];

        if !round.is_resolved() {
            return Err(LobbyError::RoundNotResolved(round_number));
        }

        if round.winner().is_some_and(|w| w != selected_option_id) {
            return Err(LobbyError::WinnerMismatch);
        }

        let all_done = state.rounds.iter().all(|r| r.is_resolved());

        Ok(RoundCompletion {
            all_rounds_completed: all_done,
            next_round: (!all_done).then(|| state.rounds[state.current].number()),
        })
    }

    pub fn waiting_status(&self) -> WaitingStatus {
        let state = self.state.lock();

        let all_finished = matches!(
            state.status,
            LobbyStatus::AwaitingItinerary | LobbyStatus::Completed
        );

        let (current_round, users_waiting) = match state.status {
            LobbyStatus::InProgress => {
                let round = &state.rounds[state.current];
                let waiting = state
                    .members
                    .iter()
                    .filter(|m| !round.user_finished(m.user.id))
                    .map(|m| m.user.username.clone())
                    .collect();

                (round.number(), waiting)
            }
            _ => (self.total_rounds(), Vec::new()),
        };

        WaitingStatus {
            current_round,
            total_rounds: self.total_rounds(),
            users_waiting,
            all_finished,
        }
    }

    /// Returns the itinerary, building it on first access once every round
    /// has resolved.
    pub fn itinerary(&self) -> Result<Itinerary, LobbyError> {
        let mut state = self.state.lock();

        if let Some(itinerary) = &state.itinerary {
            return Ok(itinerary.clone());
        }

        if state.status != LobbyStatus::AwaitingItinerary {
            return Err(ItineraryError::NotReady.into());
        }

        let winners: Vec<(u32, VenueOption)> = state
            .rounds
            .iter()
            .filter_map(|r| r.winning_option().map(|o| (r.number(), o.clone())))
            .collect();

        let itinerary = Itinerary::build(
            winners,
            &self.config,
            self.settings.start_hour,
            self.settings.end_hour,
        );

        info!(
            "built itinerary with {} entries for lobby {}",
            itinerary.len(),
            self.code
        );

        state.status = LobbyStatus::Completed;
        state.itinerary = Some(itinerary.clone());

        Ok(itinerary)
    }

    /// Owner-only reorder of the delivered itinerary. Rejections leave the
    /// stored itinerary exactly as it was.
    pub fn move_activity(
        &self,
        user_id: UserId,
        from: usize,
        to: usize,
    ) -> Result<Itinerary, LobbyError> {
        let mut state = self.state.lock();

        if user_id != self.host_id {
            return Err(ItineraryError::NotOwner.into());
        }

        let itinerary = state
            .itinerary
            .as_ref()
            .ok_or(ItineraryError::NotReady)?;

        let moved = itinerary.moved(
            from,
            to,
            day_of_week(self.settings.date),
            self.settings.start_hour,
            self.settings.end_hour,
        )?;

        state.itinerary = Some(moved.clone());

        Ok(moved)
    }

    fn member_ids(state: &LobbyState) -> Vec<UserId> {
        state.members.iter().map(|m| m.user.id).collect()
    }

    fn round_index(&self, state: &LobbyState, round_number: u32) -> Result<usize, LobbyError> {
        if state.rounds.is_empty() {
            return Err(LobbyError::NotStarted);
        }

        state
            .rounds
            .iter()
            .position(|r| r.number() == round_number)
            .ok_or(LobbyError::UnknownRound(round_number))
    }

    /// Fetches the round's candidates on first access. Runs inside the
    /// lobby lock; the provider is synchronous so this stays cheap.
    fn load_round<P>(
        &self,
        state: &mut LobbyState,
        index: usize,
        provider: &P,
    ) -> Result<(), LobbyError>
    where
        P: OptionProvider,
    {
        if state.rounds[index].is_loaded() {
            return Ok(());
        }

        let category = state.rounds[index].category();

        let options = provider.options_for(
            category,
            self.settings.date,
            self.settings.start_hour,
            self.settings.end_hour,
        )?;

        if options.is_empty() {
            return Err(LobbyError::NoOptions(category));
        }

        state.rounds[index].set_options(options);

        Ok(())
    }

    /// Evaluates the active round and advances the sequence if it resolved.
    fn evaluate_current(&self, state: &mut LobbyState) -> VoteOutcome {
        let members = Self::member_ids(state);
        let current = state.current;
        let outcome = state.rounds[current].evaluate(&members, self.config.rerun_limit);

        if matches!(
            outcome,
            VoteOutcome::Consensus { .. } | VoteOutcome::NoWinner
        ) {
            if state.current + 1 < state.rounds.len() {
                state.current += 1;
            } else {
                info!("all rounds resolved in lobby {}", self.code);
                state.status = LobbyStatus::AwaitingItinerary;
            }
        }

        outcome
    }
}
