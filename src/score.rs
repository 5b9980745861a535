use crate::session::{GamePhase, SessionState};

pub const PER_CHAR_POINTS: u32 = 10;
pub const COMBO_CAP: u32 = 10;

/// How a session ends: classic lives, or the block-stack container filling up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverRule {
    LivesDepleted,
    ContainerFull { capacity: u32 },
}

/// Combo and score bookkeeping over the session state. Score only ever goes
/// up; the combo resets on any miss or escape.
#[derive(Debug, Clone, Copy)]
pub struct ScoreEngine {
    rule: GameOverRule,
}

impl ScoreEngine {
    pub fn new(rule: GameOverRule) -> Self {
        Self { rule }
    }

    /// Returns the points awarded. The multiplier is taken from the combo
    /// before this match, capped at COMBO_CAP.
    pub fn on_match(&self, state: &mut SessionState, word: &str) -> u32 {
        let multiplier = (state.combo + 1).min(COMBO_CAP);
        let chars = word.chars().count() as u32;
        let points = chars * PER_CHAR_POINTS * multiplier;

        state.score += points;
        state.combo += 1;
        state.max_combo = state.max_combo.max(state.combo);
        state.words_typed += 1;
        state.correct_chars += chars;

        points
    }

    pub fn on_miss(&self, state: &mut SessionState) {
        state.combo = 0;
    }

    /// Apply `count` simultaneous escapes. Returns true exactly once, on the
    /// call that crosses the game-over threshold; later calls are no-ops.
    pub fn on_escape(&self, state: &mut SessionState, count: u32) -> bool {
        if state.phase == GamePhase::GameOver {
            return false;
        }

        state.combo = 0;

        match self.rule {
            GameOverRule::LivesDepleted => {
                let before = state.lives;
                state.lives = before.saturating_sub(count);
                before > 0 && state.lives == 0
            }
            GameOverRule::ContainerFull { capacity } => {
                let before = state.escaped_blocks;
                state.escaped_blocks += count;
                before < capacity && state.escaped_blocks >= capacity
            }
        }
    }

    /// Container fill in percent; always 0 under the lives rule
    pub fn fill_percent(&self, state: &SessionState) -> u32 {
        match self.rule {
            GameOverRule::LivesDepleted => 0,
            GameOverRule::ContainerFull { capacity } => {
                (state.escaped_blocks * 100 / capacity).min(100)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    fn state() -> SessionState {
        let mut s = SessionState::new(4);
        s.phase = GamePhase::Playing;
        s
    }

    fn engine() -> ScoreEngine {
        ScoreEngine::new(GameOverRule::LivesDepleted)
    }

    #[test]
    fn first_match_scores_at_multiplier_one() {
        let mut s = state();
        let points = engine().on_match(&mut s, "cat");

        assert_eq!(points, 3 * PER_CHAR_POINTS);
        assert_eq!(s.score, points);
        assert_eq!(s.combo, 1);
        assert_eq!(s.words_typed, 1);
        assert_eq!(s.correct_chars, 3);
    }

    #[test]
    fn combo_raises_the_multiplier() {
        let mut s = state();
        let e = engine();

        e.on_match(&mut s, "cat"); // combo 0 -> multiplier 1
        let points = e.on_match(&mut s, "cat"); // combo 1 -> multiplier 2

        assert_eq!(points, 3 * PER_CHAR_POINTS * 2);
        assert_eq!(s.max_combo, 2);
    }

    #[test]
    fn multiplier_caps_at_ten() {
        let mut s = state();
        let e = engine();

        for _ in 0..10 {
            e.on_match(&mut s, "cat");
        }
        // eleventh consecutive match: multiplier stays at the cap
        let points = e.on_match(&mut s, "cat");

        assert_eq!(points, 3 * PER_CHAR_POINTS * COMBO_CAP);
        assert_eq!(s.combo, 11);
        assert_eq!(s.max_combo, 11);
    }

    #[test]
    fn miss_resets_combo_but_not_score() {
        let mut s = state();
        let e = engine();

        e.on_match(&mut s, "house");
        e.on_match(&mut s, "house");
        let score_before = s.score;

        e.on_miss(&mut s);

        assert_eq!(s.combo, 0);
        assert_eq!(s.score, score_before);
        assert_eq!(s.max_combo, 2);
    }

    #[test]
    fn escape_resets_combo_and_costs_lives() {
        let mut s = state();
        let e = engine();

        e.on_match(&mut s, "cat");
        let over = e.on_escape(&mut s, 1);

        assert!(!over);
        assert_eq!(s.combo, 0);
        assert_eq!(s.lives, 3);
    }

    #[test]
    fn lives_never_go_below_zero() {
        let mut s = state();
        let over = engine().on_escape(&mut s, 99);

        assert!(over);
        assert_eq!(s.lives, 0);
    }

    #[test]
    fn game_over_signalled_exactly_once() {
        let mut s = state();
        let e = engine();

        assert!(!e.on_escape(&mut s, 3));
        assert!(e.on_escape(&mut s, 1));
        // phase not yet flipped by the caller, still only one signal
        assert!(!e.on_escape(&mut s, 1));

        s.phase = GamePhase::GameOver;
        assert!(!e.on_escape(&mut s, 1));
    }

    #[test]
    fn container_rule_fills_instead_of_costing_lives() {
        let e = ScoreEngine::new(GameOverRule::ContainerFull { capacity: 4 });
        let mut s = state();

        assert!(!e.on_escape(&mut s, 2));
        assert_eq!(s.lives, 4, "lives untouched under the container rule");
        assert_eq!(e.fill_percent(&s), 50);

        assert!(e.on_escape(&mut s, 2));
        assert_eq!(e.fill_percent(&s), 100);
        assert!(!e.on_escape(&mut s, 1));
        assert_eq!(e.fill_percent(&s), 100, "fill display clamps at 100");
    }

    #[test]
    fn accuracy_is_bounded_and_defaults_to_perfect() {
        let mut s = state();
        assert_eq!(s.accuracy(), 100);

        s.total_chars = 8;
        s.correct_chars = 3;
        assert_eq!(s.accuracy(), 38);

        s.correct_chars = 8;
        assert_eq!(s.accuracy(), 100);
    }
}
