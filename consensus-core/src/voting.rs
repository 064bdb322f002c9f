use std::collections::HashMap;

use log::info;
use thiserror::Error;

use crate::category::Category;
use crate::options::VenueOption;
use crate::users::UserId;

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("round {0} is already resolved")]
    RoundClosed(u32),
    #[error("round {0} has no candidate options yet")]
    RoundNotOpen(u32),
    #[error("option {0} is not in the active set")]
    UnknownOption(String),
}

/// Where a round is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundPhase {
    /// Votes are being collected over the full candidate set
    Collecting,
    /// Votes are being re-collected over a tied subset
    Tiebreak,
    /// The round has a final outcome. `winner` is `None` only when a round
    /// completed without any selection after exhausting its re-runs.
    Resolved { winner: Option<String> },
}

/// The result of evaluating a round after a vote write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Not every member has finished the active pass yet
    Pending,
    /// The round resolved to a single option
    Consensus { option_id: String, forced: bool },
    /// The round re-entered collection over the tied subset
    Tiebreak { tied: Vec<String> },
    /// An all-no pass was discarded and the same set re-runs
    Retry,
    /// The round completed with no selection
    NoWinner,
}

/// A single category-scoped voting round.
///
/// All mutation happens through the owning lobby's lock, so evaluation
/// always observes a consistent vote set.
#[derive(Debug)]
pub struct Round {
    number: u32,
    category: Category,
    /// Full candidate set. Empty until the provider has been consulted.
    options: Vec<VenueOption>,
    loaded: bool,
    /// Ids of the options votes are currently collected over. This is the
    /// full set while Collecting, or the tied subset during a Tiebreak.
    active: Vec<String>,
    votes: HashMap<UserId, HashMap<String, bool>>,
    reruns: u32,
    phase: RoundPhase,
}

impl Round {
    pub fn new(number: u32, category: Category) -> Self {
        Self {
            number,
            category,
            options: Vec::new(),
            loaded: false,
            active: Vec::new(),
            votes: HashMap::new(),
            reruns: 0,
            phase: RoundPhase::Collecting,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.phase, RoundPhase::Resolved { .. })
    }

    pub fn winner(&self) -> Option<&str> {
        match &self.phase {
            RoundPhase::Resolved { winner } => winner.as_deref(),
            _ => None,
        }
    }

    /// The full candidate set of the round
    pub fn options(&self) -> &[VenueOption] {
        &self.options
    }

    /// The options votes are currently collected over
    pub fn active_options(&self) -> Vec<&VenueOption> {
        self.active
            .iter()
            .filter_map(|id| self.options.iter().find(|o| &o.id == id))
            .collect()
    }

    pub fn winning_option(&self) -> Option<&VenueOption> {
        self.winner()
            .and_then(|id| self.options.iter().find(|o| o.id == id))
    }

    /// Installs the candidate set once the provider has been consulted
    pub fn set_options(&mut self, options: Vec<VenueOption>) {
        self.active = options.iter().map(|o| o.id.clone()).collect();
        self.options = options;
        self.loaded = true;
    }

    /// Upserts a vote. Last write wins per (user, option).
    pub fn record_vote(
        &mut self,
        user_id: UserId,
        option_id: &str,
        vote: bool,
    ) -> Result<(), VoteError> {
        if self.is_resolved() {
            return Err(VoteError::RoundClosed(self.number));
        }

        if !self.loaded {
            return Err(VoteError::RoundNotOpen(self.number));
        }

        if !self.active.iter().any(|id| id == option_id) {
            return Err(VoteError::UnknownOption(option_id.to_string()));
        }

        self.votes
            .entry(user_id)
            .or_default()
            .insert(option_id.to_string(), vote);

        Ok(())
    }

    /// Whether the user has voted on every option in the active set
    pub fn user_finished(&self, user_id: UserId) -> bool {
        let Some(votes) = self.votes.get(&user_id) else {
            return false;
        };

        self.active.iter().all(|id| votes.contains_key(id))
    }

    fn yes_count(&self, option_id: &str, members: &[UserId]) -> usize {
        members
            .iter()
            .filter(|m| {
                self.votes
                    .get(m)
                    .and_then(|v| v.get(option_id))
                    .copied()
                    .unwrap_or(false)
            })
            .count()
    }

    /// Clears recorded votes for the active set, resetting per-member
    /// completion for the next pass
    fn reset_active_votes(&mut self) {
        for votes in self.votes.values_mut() {
            votes.retain(|id, _| !self.active.iter().any(|a| a == id));
        }
    }

    /// Evaluates the round against the current member roster and applies the
    /// resulting transition. Must run in the same critical section as the
    /// vote write that triggered it.
    pub fn evaluate(&mut self, members: &[UserId], rerun_limit: u32) -> VoteOutcome {
        if self.is_resolved() {
            return match self.winner() {
                Some(id) => VoteOutcome::Consensus {
                    option_id: id.to_string(),
                    forced: false,
                },
                None => VoteOutcome::NoWinner,
            };
        }

        let all_finished = !members.is_empty()
            && members.iter().all(|m| self.user_finished(*m));

        if !all_finished {
            return VoteOutcome::Pending;
        }

        let tally: Vec<(String, usize)> = self
            .active
            .iter()
            .map(|id| (id.clone(), self.yes_count(id, members)))
            .collect();

        let max = tally.iter().map(|(_, count)| *count).max().unwrap_or(0);

        if max == 0 {
            // Nobody liked anything in this pass
            if self.reruns >= rerun_limit {
                info!(
                    "round {} completed with no selection after {} re-runs",
                    self.number, self.reruns
                );
                self.phase = RoundPhase::Resolved { winner: None };
                return VoteOutcome::NoWinner;
            }

            self.reruns += 1;
            self.reset_active_votes();
            return VoteOutcome::Retry;
        }

        let top: Vec<String> = tally
            .iter()
            .filter(|(_, count)| *count == max)
            .map(|(id, _)| id.clone())
            .collect();

        // Unanimity among finishers: one option on top, yes from everyone
        if top.len() == 1 && max == members.len() {
            let winner = top.into_iter().next().unwrap_or_default();

            self.phase = RoundPhase::Resolved {
                winner: Some(winner.clone()),
            };

            return VoteOutcome::Consensus {
                option_id: winner,
                forced: false,
            };
        }

        if self.reruns >= rerun_limit {
            // Deterministic forced resolution: highest yes-count, earliest
            // presentation order on equal counts
            let winner = top.into_iter().next().unwrap_or_default();

            info!(
                "round {} force-resolved to {} after {} re-runs",
                self.number, winner, self.reruns
            );

            self.phase = RoundPhase::Resolved {
                winner: Some(winner.clone()),
            };

            return VoteOutcome::Consensus {
                option_id: winner,
                forced: true,
            };
        }

        // Disagreement: re-collect over the contested subset, reusing the
        // same round number
        let tied = if top.len() >= 2 {
            top
        } else {
            tally
                .iter()
                .filter(|(_, count)| *count >= 1)
                .map(|(id, _)| id.clone())
                .collect()
        };

        self.reruns += 1;
        self.active = tied.clone();
        self.reset_active_votes();
        self.phase = RoundPhase::Tiebreak;

        VoteOutcome::Tiebreak { tied }
    }

    /// A point-in-time view of the round for polling clients
    pub fn status(&self, members: &[UserId]) -> RoundStatus {
        let all_voted = !members.is_empty()
            && members.iter().all(|m| self.user_finished(*m));

        match &self.phase {
            RoundPhase::Resolved { winner } => RoundStatus {
                consensus_reached: true,
                consensus_option_id: winner.clone(),
                is_tie: false,
                tied_options: Vec::new(),
                all_voted: true,
            },
            RoundPhase::Tiebreak => RoundStatus {
                consensus_reached: false,
                consensus_option_id: None,
                is_tie: true,
                tied_options: self.active.clone(),
                all_voted,
            },
            RoundPhase::Collecting => RoundStatus {
                consensus_reached: false,
                consensus_option_id: None,
                is_tie: false,
                tied_options: Vec::new(),
                all_voted,
            },
        }
    }
}

/// What a polling client sees for a round
#[derive(Debug, Clone)]
pub struct RoundStatus {
    pub consensus_reached: bool,
    pub consensus_option_id: Option<String>,
    pub is_tie: bool,
    pub tied_options: Vec<String>,
    pub all_voted: bool,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::options::VenueOption;

    const RERUN_LIMIT: u32 = 2;

    fn option(id: &str) -> VenueOption {
        VenueOption {
            id: id.to_string(),
            name: id.to_string(),
            category: Category::Food,
            location: (0.0, 0.0),
            address: String::new(),
            hours: None,
            image: None,
            duration: None,
        }
    }

    fn round_with(ids: &[&str]) -> Round {
        let mut round = Round::new(1, Category::Food);
        round.set_options(ids.iter().map(|id| option(id)).collect());
        round
    }

    fn users(n: usize) -> Vec<UserId> {
        (0..n).map(|_| UserId::new()).collect()
    }

    fn finish_pass(round: &mut Round, user: UserId, yes: &[&str]) {
        let ids: Vec<String> = round.active_options().iter().map(|o| o.id.clone()).collect();

        for id in ids {
            round
                .record_vote(user, &id, yes.contains(&id.as_str()))
                .unwrap();
        }
    }

    #[test]
    fn test_vote_upsert() {
        let mut round = round_with(&["a", "b"]);
        let user = UserId::new();

        round.record_vote(user, "a", true).unwrap();
        round.record_vote(user, "a", false).unwrap();

        assert_eq!(
            round.yes_count("a", &[user]),
            0,
            "later vote overwrites the earlier one"
        );
    }

    #[test]
    fn test_pending_until_everyone_finishes() {
        let mut round = round_with(&["a", "b"]);
        let members = users(2);

        finish_pass(&mut round, members[0], &["a"]);

        assert_eq!(
            round.evaluate(&members, RERUN_LIMIT),
            VoteOutcome::Pending,
            "one member has not voted yet"
        );
        assert!(!round.status(&members).all_voted);
    }

    #[test]
    fn test_unanimous_consensus() {
        let mut round = round_with(&["a", "b", "c"]);
        let members = users(3);

        for member in &members {
            finish_pass(&mut round, *member, &["a"]);
        }

        let outcome = round.evaluate(&members, RERUN_LIMIT);

        assert_eq!(
            outcome,
            VoteOutcome::Consensus {
                option_id: "a".to_string(),
                forced: false,
            }
        );

        let status = round.status(&members);
        assert!(status.consensus_reached);
        assert_eq!(status.consensus_option_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_tie_enters_tiebreak_with_same_round_number() {
        let mut round = round_with(&["a", "b", "c"]);
        let members = users(2);

        finish_pass(&mut round, members[0], &["a"]);
        finish_pass(&mut round, members[1], &["b"]);

        let outcome = round.evaluate(&members, RERUN_LIMIT);

        assert_eq!(
            outcome,
            VoteOutcome::Tiebreak {
                tied: vec!["a".to_string(), "b".to_string()],
            }
        );
        assert_eq!(round.number(), 1, "tiebreak does not consume a round number");

        let status = round.status(&members);
        assert!(status.is_tie);
        assert_eq!(status.tied_options, vec!["a", "b"]);
        assert!(
            !status.all_voted,
            "completion resets for the tiebreak subset"
        );
    }

    #[test]
    fn test_tiebreak_restricts_active_set() {
        let mut round = round_with(&["a", "b", "c"]);
        let members = users(2);

        finish_pass(&mut round, members[0], &["a"]);
        finish_pass(&mut round, members[1], &["b"]);
        round.evaluate(&members, RERUN_LIMIT);

        assert!(
            matches!(
                round.record_vote(members[0], "c", true),
                Err(VoteError::UnknownOption(_))
            ),
            "options outside the tied subset are rejected"
        );

        // Unanimity within the subset resolves the round
        finish_pass(&mut round, members[0], &["a"]);
        finish_pass(&mut round, members[1], &["a"]);

        assert_eq!(
            round.evaluate(&members, RERUN_LIMIT),
            VoteOutcome::Consensus {
                option_id: "a".to_string(),
                forced: false,
            }
        );
    }

    #[test]
    fn test_unique_max_without_unanimity_recontests_liked_options() {
        let mut round = round_with(&["a", "b", "c"]);
        let members = users(3);

        finish_pass(&mut round, members[0], &["a", "b"]);
        finish_pass(&mut round, members[1], &["a"]);
        finish_pass(&mut round, members[2], &["c"]);

        // "a" leads with 2 yes votes but member 3 never approved it
        let outcome = round.evaluate(&members, RERUN_LIMIT);

        assert_eq!(
            outcome,
            VoteOutcome::Tiebreak {
                tied: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            },
            "every option with a yes vote is re-contested"
        );
    }

    #[test]
    fn test_all_no_pass_retries_then_completes_without_winner() {
        let mut round = round_with(&["a", "b"]);
        let members = users(2);

        for _ in 0..RERUN_LIMIT {
            for member in &members {
                finish_pass(&mut round, *member, &[]);
            }
            assert_eq!(round.evaluate(&members, RERUN_LIMIT), VoteOutcome::Retry);
        }

        for member in &members {
            finish_pass(&mut round, *member, &[]);
        }

        assert_eq!(
            round.evaluate(&members, RERUN_LIMIT),
            VoteOutcome::NoWinner
        );
        assert!(round.is_resolved());
        assert_eq!(round.winner(), None);
    }

    #[test]
    fn test_forced_resolution_after_rerun_cap() {
        let mut round = round_with(&["a", "b"]);
        let members = users(2);

        // Two deadlocked passes consume the re-run budget
        for _ in 0..RERUN_LIMIT {
            finish_pass(&mut round, members[0], &["a"]);
            finish_pass(&mut round, members[1], &["b"]);

            assert!(matches!(
                round.evaluate(&members, RERUN_LIMIT),
                VoteOutcome::Tiebreak { .. }
            ));
        }

        finish_pass(&mut round, members[0], &["a"]);
        finish_pass(&mut round, members[1], &["b"]);

        let outcome = round.evaluate(&members, RERUN_LIMIT);

        assert_eq!(
            outcome,
            VoteOutcome::Consensus {
                option_id: "a".to_string(),
                forced: true,
            },
            "earliest presentation order breaks the deadlock"
        );
    }

    #[test]
    fn test_late_votes_are_rejected() {
        let mut round = round_with(&["a"]);
        let members = users(1);

        finish_pass(&mut round, members[0], &["a"]);
        round.evaluate(&members, RERUN_LIMIT);

        assert!(round.is_resolved());
        assert!(matches!(
            round.record_vote(members[0], "a", false),
            Err(VoteError::RoundClosed(1))
        ));
    }

    #[test]
    fn test_votes_before_options_load() {
        let mut round = Round::new(2, Category::Arts);

        assert!(matches!(
            round.record_vote(UserId::new(), "a", true),
            Err(VoteError::RoundNotOpen(2))
        ));
    }
}
