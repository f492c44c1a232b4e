use chrono::{DateTime, Utc};
use race_types::{ConnectionId, RoundScore, SubmitOutcome, SubmitResult};

use crate::GameState;

/// Points for answering first are this many times the loser's points.
pub const WINNER_MULTIPLIER: u32 = 10;

pub fn loser_score(word: &str) -> u32 {
    word.chars().count() as u32
}

pub fn winner_score(word: &str) -> u32 {
    loser_score(word) * WINNER_MULTIPLIER
}

/// Change to apply to a [`GameState`] after a judgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundDelta {
    None,
    /// First correct answer: the round now waits for the other player.
    RecordWinner { player: ConnectionId, elapsed_ms: i64 },
    /// Second correct answer: the round is scored and a new one must start.
    CloseRound,
}

/// Both sides of a scored round. `opponent` is always `player.for_opponent()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePair {
    /// The player who answered second.
    pub player: RoundScore,
    /// The round's winner.
    pub opponent: RoundScore,
}

impl ScorePair {
    pub fn from_loser(loser: RoundScore) -> Self {
        let opponent = loser.for_opponent();
        Self {
            player: loser,
            opponent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgement {
    pub result: SubmitResult,
    pub delta: RoundDelta,
    pub scores: Option<ScorePair>,
}

impl Judgement {
    fn unchanged(outcome: SubmitOutcome) -> Self {
        Self {
            result: SubmitResult::without_score(outcome),
            delta: RoundDelta::None,
            scores: None,
        }
    }

    pub fn outcome(&self) -> SubmitOutcome {
        self.result.outcome
    }

    pub fn closes_round(&self) -> bool {
        self.delta == RoundDelta::CloseRound
    }
}

/// Decides what a submitted word means for the round. Has no side effects;
/// the caller applies [`Judgement::delta`] and stores [`Judgement::scores`].
pub struct RoundReferee;

impl RoundReferee {
    pub fn judge(
        state: &GameState,
        player: ConnectionId,
        word: &str,
        now: DateTime<Utc>,
    ) -> Judgement {
        let Some(opponent) = state.opponent_of(player) else {
            return Judgement::unchanged(SubmitOutcome::NoGameFound);
        };

        if word != state.current_word() {
            return Judgement::unchanged(SubmitOutcome::WordMismatch);
        }

        if state.recorded_time_for(player).is_some() {
            return Judgement::unchanged(SubmitOutcome::AlreadyAnswered);
        }

        let elapsed_ms = (now - state.round_started_at()).num_milliseconds().max(0);

        if !state.has_winner() {
            return Judgement {
                result: SubmitResult {
                    outcome: SubmitOutcome::RoundWon,
                    player_score: Some(winner_score(word)),
                    player_time_millis: Some(elapsed_ms),
                },
                delta: RoundDelta::RecordWinner { player, elapsed_ms },
                scores: None,
            };
        }

        let loser = RoundScore {
            // Assigned by the ledger
            index: 0,
            word: word.to_string(),
            player_time_millis: elapsed_ms,
            opponent_time_millis: state.recorded_time_for(opponent).unwrap_or_default(),
            player_score: loser_score(word),
            opponent_score: winner_score(word),
            did_win: false,
        };

        Judgement {
            result: SubmitResult {
                outcome: SubmitOutcome::RoundLost,
                player_score: Some(loser.player_score),
                player_time_millis: Some(elapsed_ms),
            },
            delta: RoundDelta::CloseRound,
            scores: Some(ScorePair::from_loser(loser)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WordSource;
    use chrono::Duration;

    struct Fixed(&'static str);

    impl WordSource for Fixed {
        fn random_word(&self) -> String {
            self.0.to_string()
        }
    }

    fn game_with_word(word: &'static str) -> (GameState, ConnectionId, ConnectionId, DateTime<Utc>) {
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        let start = Utc::now();
        let mut state = GameState::new(a, b, start);
        state.start_round(&Fixed(word), start, 1).unwrap();
        (state, a, b, start)
    }

    #[test]
    fn test_scores_follow_word_length() {
        assert_eq!(loser_score("apple"), 5);
        assert_eq!(winner_score("apple"), 50);
        assert_eq!(loser_score(""), 0);
    }

    #[test]
    fn test_mismatch_changes_nothing() {
        let (state, a, _, start) = game_with_word("apple");

        let judgement = RoundReferee::judge(&state, a, "banana", start + Duration::milliseconds(10));
        assert_eq!(judgement.outcome(), SubmitOutcome::WordMismatch);
        assert_eq!(judgement.delta, RoundDelta::None);
        assert!(judgement.scores.is_none());
        assert_eq!(judgement.result.player_score, None);
    }

    #[test]
    fn test_comparison_is_exact() {
        let (state, a, _, start) = game_with_word("apple");

        for typed in ["Apple", "apple ", " apple", "appl"] {
            let judgement = RoundReferee::judge(&state, a, typed, start);
            assert_eq!(judgement.outcome(), SubmitOutcome::WordMismatch, "{typed:?}");
        }
    }

    #[test]
    fn test_first_correct_answer_wins() {
        let (state, a, _, start) = game_with_word("apple");

        let judgement = RoundReferee::judge(&state, a, "apple", start + Duration::milliseconds(500));
        assert_eq!(judgement.outcome(), SubmitOutcome::RoundWon);
        assert_eq!(judgement.result.player_score, Some(50));
        assert_eq!(judgement.result.player_time_millis, Some(500));
        assert_eq!(
            judgement.delta,
            RoundDelta::RecordWinner {
                player: a,
                elapsed_ms: 500
            }
        );
        assert!(judgement.scores.is_none());
    }

    #[test]
    fn test_second_correct_answer_scores_the_pair() {
        let (mut state, a, b, start) = game_with_word("apple");

        let first = RoundReferee::judge(&state, a, "apple", start + Duration::milliseconds(500));
        state.apply(&first.delta);

        let second = RoundReferee::judge(&state, b, "apple", start + Duration::milliseconds(800));
        assert_eq!(second.outcome(), SubmitOutcome::RoundLost);
        assert_eq!(second.result.player_score, Some(5));
        assert_eq!(second.result.player_time_millis, Some(800));
        assert!(second.closes_round());

        let pair = second.scores.expect("second answer must produce scores");
        assert_eq!(
            pair.player,
            RoundScore {
                index: 0,
                word: "apple".to_string(),
                player_time_millis: 800,
                opponent_time_millis: 500,
                player_score: 5,
                opponent_score: 50,
                did_win: false,
            }
        );
        assert_eq!(pair.opponent, pair.player.for_opponent());
        assert!(pair.opponent.did_win);
        assert_eq!(pair.opponent.player_score, 50);
    }

    #[test]
    fn test_winner_cannot_answer_twice() {
        let (mut state, a, _, start) = game_with_word("apple");

        let first = RoundReferee::judge(&state, a, "apple", start + Duration::milliseconds(300));
        state.apply(&first.delta);

        let again = RoundReferee::judge(&state, a, "apple", start + Duration::milliseconds(400));
        assert_eq!(again.outcome(), SubmitOutcome::AlreadyAnswered);
        assert_eq!(again.delta, RoundDelta::None);
        assert!(again.scores.is_none());
    }

    #[test]
    fn test_outsider_has_no_game() {
        let (state, _, _, start) = game_with_word("apple");

        let judgement = RoundReferee::judge(&state, ConnectionId::new(), "apple", start);
        assert_eq!(judgement.outcome(), SubmitOutcome::NoGameFound);
    }

    #[test]
    fn test_clock_skew_never_yields_negative_time() {
        let (state, a, _, start) = game_with_word("apple");

        let judgement = RoundReferee::judge(&state, a, "apple", start - Duration::milliseconds(50));
        assert_eq!(judgement.result.player_time_millis, Some(0));
    }
}
