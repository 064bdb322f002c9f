use std::sync::Arc;

use dashmap::DashMap;

mod category;
mod config;
mod itinerary;
mod lobby;
mod options;
mod rounds;
mod users;
mod util;
mod voting;

pub use category::*;
pub use config::*;
pub use itinerary::*;
pub use lobby::*;
pub use options::*;
pub use rounds::*;
pub use users::*;
pub use util::*;
pub use voting::*;

// Reduces verbosity
pub type Store<Id, T> = Arc<DashMap<Id, Arc<T>>>;

/// The consensus engine, facilitating identity, lobbies, voting, and
/// itinerary generation.
pub struct Consensus<P> {
    context: ConsensusContext<P>,

    pub users: Arc<UserRegistry>,
    pub lobbies: LobbyManager<P>,
}

/// A type passed to various components of the engine, to access shared
/// state and configuration.
pub struct ConsensusContext<P> {
    pub config: Config,
    pub provider: Arc<P>,
    pub users: Arc<UserRegistry>,

    pub lobbies: Store<LobbyId, Lobby>,
    /// Active join codes
    pub codes: Arc<DashMap<String, LobbyId>>,
    /// Each user's most recent lobby, used by the leave operation
    pub memberships: Arc<DashMap<UserId, LobbyId>>,
}

impl<P> Consensus<P>
where
    P: OptionProvider,
{
    pub fn new(config: Config, provider: P) -> Self {
        let users = Arc::new(UserRegistry::new());

        let context = ConsensusContext {
            config,
            provider: Arc::new(provider),
            users: users.clone(),

            lobbies: Default::default(),
            codes: Default::default(),
            memberships: Default::default(),
        };

        let lobbies = LobbyManager::new(&context);

        Self {
            context,
            users,
            lobbies,
        }
    }

    pub fn config(&self) -> &Config {
        &self.context.config
    }
}

impl<P> Clone for ConsensusContext<P> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            provider: self.provider.clone(),
            users: self.users.clone(),
            lobbies: self.lobbies.clone(),
            codes: self.codes.clone(),
            memberships: self.memberships.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, Local, NaiveDate};

    /// Deterministic provider: three options per category, ids like "food-1"
    struct FixedProvider;

    impl OptionProvider for FixedProvider {
        fn options_for(
            &self,
            category: Category,
            _date: NaiveDate,
            _start_hour: u32,
            _end_hour: u32,
        ) -> Result<Vec<VenueOption>, ProviderError> {
            let prefix = category.name().to_lowercase();

            Ok((1..=3)
                .map(|n| VenueOption {
                    id: format!("{prefix}-{n}"),
                    name: format!("{prefix} option {n}"),
                    category,
                    location: (37.77, -122.42),
                    address: format!("{n} Example St"),
                    hours: None,
                    image: None,
                    duration: None,
                })
                .collect())
        }
    }

    /// Provider that never has anything
    struct EmptyProvider;

    impl OptionProvider for EmptyProvider {
        fn options_for(
            &self,
            _category: Category,
            _date: NaiveDate,
            _start_hour: u32,
            _end_hour: u32,
        ) -> Result<Vec<VenueOption>, ProviderError> {
            Ok(Vec::new())
        }
    }

    fn engine() -> Consensus<FixedProvider> {
        Consensus::new(Config::default(), FixedProvider)
    }

    fn new_lobby(host_id: UserId) -> NewLobby {
        NewLobby {
            host_id,
            location: (37.77, -122.42),
            radius: 2.5,
            date: Local::now().date_naive() + Duration::days(2),
            start_hour: 10,
            end_hour: 14,
            activity_counts: [(Category::Food, 1), (Category::Nature, 1)]
                .into_iter()
                .collect(),
            max_members: None,
        }
    }

    fn vote_pass<P: OptionProvider>(
        engine: &Consensus<P>,
        lobby: &Lobby,
        user_id: UserId,
        round: u32,
        yes: &str,
    ) -> VoteOutcome {
        let options = engine.lobbies.round_options(lobby.id(), round).unwrap();
        let mut outcome = VoteOutcome::Pending;

        for option in options {
            outcome = engine
                .lobbies
                .submit_vote(lobby.id(), user_id, round, &option.id, option.id == yes)
                .unwrap();
        }

        outcome
    }

    #[test]
    fn test_full_session() {
        let engine = engine();

        let host = engine.users.signup("host").unwrap();
        let guest = engine.users.signup("guest").unwrap();

        let lobby = engine.lobbies.create_lobby(new_lobby(host.id)).unwrap();

        assert_eq!(lobby.total_rounds(), 2);
        assert_eq!(lobby.status(), LobbyStatus::Waiting);

        engine.lobbies.join_lobby(lobby.code(), guest.id).unwrap();

        // The guest has not readied up yet
        assert!(matches!(
            engine.lobbies.start_game(lobby.id(), host.id),
            Err(LobbyError::NotReady)
        ));

        lobby.set_ready(guest.id, true).unwrap();
        assert!(lobby.roster().all_ready);

        engine.lobbies.start_game(lobby.id(), host.id).unwrap();
        assert_eq!(lobby.status(), LobbyStatus::InProgress);

        // Round 1 is FOOD, round 2 is NATURE
        let round_one = engine.lobbies.round_options(lobby.id(), 1).unwrap();
        assert!(round_one.iter().all(|o| o.category == Category::Food));

        vote_pass(&engine, &lobby, host.id, 1, "food-2");
        let outcome = vote_pass(&engine, &lobby, guest.id, 1, "food-2");

        assert_eq!(
            outcome,
            VoteOutcome::Consensus {
                option_id: "food-2".to_string(),
                forced: false,
            }
        );

        let round_two = engine.lobbies.round_options(lobby.id(), 2).unwrap();
        assert!(round_two.iter().all(|o| o.category == Category::Nature));

        vote_pass(&engine, &lobby, host.id, 2, "nature-1");
        vote_pass(&engine, &lobby, guest.id, 2, "nature-1");

        assert_eq!(lobby.status(), LobbyStatus::AwaitingItinerary);

        let waiting = lobby.waiting_status();
        assert!(waiting.all_finished);
        assert!(waiting.users_waiting.is_empty());

        let itinerary = lobby.itinerary().unwrap();
        let times: Vec<_> = itinerary.entries().iter().map(|e| e.start_hour).collect();

        assert_eq!(times, vec![Some(10), Some(11)]);
        assert_eq!(itinerary.entries()[0].option.id, "food-2");
        assert_eq!(itinerary.entries()[1].option.id, "nature-1");
        assert_eq!(lobby.status(), LobbyStatus::Completed);
    }

    #[test]
    fn test_late_votes_for_settled_rounds() {
        let engine = engine();

        let host = engine.users.signup("solo").unwrap();
        let lobby = engine.lobbies.create_lobby(new_lobby(host.id)).unwrap();

        engine.lobbies.start_game(lobby.id(), host.id).unwrap();
        vote_pass(&engine, &lobby, host.id, 1, "food-1");

        assert!(
            matches!(
                engine
                    .lobbies
                    .submit_vote(lobby.id(), host.id, 1, "food-1", true),
                Err(LobbyError::Vote(VoteError::RoundClosed(1)))
            ),
            "votes for resolved rounds are rejected, not applied"
        );
    }

    #[test]
    fn test_start_is_host_only() {
        let engine = engine();

        let host = engine.users.signup("owner").unwrap();
        let guest = engine.users.signup("member").unwrap();

        let lobby = engine.lobbies.create_lobby(new_lobby(host.id)).unwrap();
        engine.lobbies.join_lobby(lobby.code(), guest.id).unwrap();
        lobby.set_ready(guest.id, true).unwrap();

        assert!(matches!(
            engine.lobbies.start_game(lobby.id(), guest.id),
            Err(LobbyError::NotOwner(_))
        ));
    }

    #[test]
    fn test_join_is_idempotent() {
        let engine = engine();

        let host = engine.users.signup("h").unwrap();
        let guest = engine.users.signup("g").unwrap();

        let lobby = engine.lobbies.create_lobby(new_lobby(host.id)).unwrap();

        engine.lobbies.join_lobby(lobby.code(), guest.id).unwrap();
        engine.lobbies.join_lobby(lobby.code(), guest.id).unwrap();

        assert_eq!(lobby.roster().members.len(), 2, "re-joining adds nothing");
    }

    #[test]
    fn test_lobby_capacity() {
        let engine = engine();

        let host = engine.users.signup("cap-host").unwrap();

        let mut request = new_lobby(host.id);
        request.max_members = Some(2);

        let lobby = engine.lobbies.create_lobby(request).unwrap();

        let second = engine.users.signup("cap-second").unwrap();
        engine.lobbies.join_lobby(lobby.code(), second.id).unwrap();

        let third = engine.users.signup("cap-third").unwrap();

        assert!(matches!(
            engine.lobbies.join_lobby(lobby.code(), third.id),
            Err(LobbyError::Full)
        ));
    }

    #[test]
    fn test_unknown_code() {
        let engine = engine();
        let user = engine.users.signup("lost").unwrap();

        assert!(matches!(
            engine.lobbies.join_lobby("ZZZZZ", user.id),
            Err(LobbyError::CodeNotFound(_))
        ));
    }

    #[test]
    fn test_ready_is_idempotent_and_owner_exempt() {
        let engine = engine();

        let host = engine.users.signup("ready-host").unwrap();
        let guest = engine.users.signup("ready-guest").unwrap();

        let lobby = engine.lobbies.create_lobby(new_lobby(host.id)).unwrap();
        engine.lobbies.join_lobby(lobby.code(), guest.id).unwrap();

        lobby.set_ready(guest.id, true).unwrap();
        lobby.set_ready(guest.id, true).unwrap();
        assert!(lobby.roster().all_ready);

        // The owner is always ready; unreadying them is informational
        lobby.set_ready(host.id, false).unwrap();
        assert!(lobby.roster().all_ready);
    }

    #[test]
    fn test_validation_reports_first_violation() {
        let engine = engine();
        let host = engine.users.signup("validator").unwrap();

        let mut request = new_lobby(host.id);
        request.radius = 50.0;

        match engine.lobbies.create_lobby(request).map(|_| ()) {
            Err(LobbyError::Validation(message)) => {
                assert!(message.contains("radius"), "got: {message}")
            }
            other => panic!("expected a validation error, got {other:?}"),
        }

        let mut request = new_lobby(host.id);
        request.start_hour = 8;
        request.end_hour = 8;

        assert!(matches!(
            engine.lobbies.create_lobby(request),
            Err(LobbyError::Validation(_))
        ));

        let mut request = new_lobby(host.id);
        request.date = Local::now().date_naive() - Duration::days(1);

        assert!(matches!(
            engine.lobbies.create_lobby(request),
            Err(LobbyError::Validation(_))
        ));

        // 5 activities in a 4 hour window
        let mut request = new_lobby(host.id);
        request.activity_counts = [(Category::Food, 5)].into_iter().collect();

        assert!(matches!(
            engine.lobbies.create_lobby(request),
            Err(LobbyError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_option_rounds_fail_at_start() {
        let engine = Consensus::new(Config::default(), EmptyProvider);
        let host = engine.users.signup("empty-host").unwrap();

        let lobby = engine.lobbies.create_lobby(new_lobby(host.id)).unwrap();

        assert!(matches!(
            engine.lobbies.start_game(lobby.id(), host.id),
            Err(LobbyError::NoOptions(Category::Food))
        ));
        assert_eq!(
            lobby.status(),
            LobbyStatus::Waiting,
            "a failed start leaves the lobby waiting"
        );
    }

    #[test]
    fn test_host_leaving_closes_the_lobby() {
        let engine = engine();

        let host = engine.users.signup("leaving-host").unwrap();
        let guest = engine.users.signup("staying-guest").unwrap();

        let lobby = engine.lobbies.create_lobby(new_lobby(host.id)).unwrap();
        let code = lobby.code().to_string();

        engine.lobbies.join_lobby(&code, guest.id).unwrap();
        engine.lobbies.leave_lobby(host.id).unwrap();

        assert_eq!(lobby.status(), LobbyStatus::Closed);
        assert!(
            matches!(
                engine.lobbies.lobby_by_code(&code),
                Err(LobbyError::CodeNotFound(_))
            ),
            "a closed lobby's code is retired"
        );
    }
}
