use crate::curve::{curve, GameVariant, Tier};
use crate::field::{MatchResult, Target, TargetField};
use crate::rng::RandomSource;
use crate::score::{GameOverRule, ScoreEngine};
use crate::spawner::TargetSpawner;
use serde::Serialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Idle,
    Playing,
    Paused,
    GameOver,
}

/// Mutable per-session bookkeeping. Owned and written by GameSession only;
/// the UI sees it through a read-only borrow.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub elapsed_ms: f64,
    pub score: u32,
    pub lives: u32,
    pub max_lives: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub words_typed: u32,
    pub total_chars: u32,
    pub correct_chars: u32,
    pub escaped_blocks: u32,
    pub phase: GamePhase,
}

impl SessionState {
    pub fn new(lives: u32) -> Self {
        Self {
            elapsed_ms: 0.0,
            score: 0,
            lives,
            max_lives: lives,
            combo: 0,
            max_combo: 0,
            words_typed: 0,
            total_chars: 0,
            correct_chars: 0,
            escaped_blocks: 0,
            phase: GamePhase::Idle,
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_ms / 1000.0
    }

    /// Rounded percentage in [0,100]; an untouched session counts as perfect
    pub fn accuracy(&self) -> u32 {
        if self.total_chars == 0 {
            100
        } else {
            ((self.correct_chars as f64 / self.total_chars as f64) * 100.0).round() as u32
        }
    }
}

/// Immutable result of a completed session, handed to the persistence
/// collaborator exactly once on entering game over
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub score: u32,
    pub words_typed: u32,
    pub accuracy: u32,
    pub max_combo: u32,
    pub difficulty: String,
    pub time_spent: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
}

/// Where completed sessions go. The core never touches ambient storage;
/// the binary passes a HistoryDb, tests pass a MemorySink.
pub trait ResultSink {
    fn record(&mut self, result: &SessionRecord);
}

/// In-memory sink for tests; clones share the same record list
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<SessionRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl ResultSink for MemorySink {
    fn record(&mut self, result: &SessionRecord) {
        self.records.lock().unwrap().push(result.clone());
    }
}

/// Orchestrates one mini-game run: the per-tick pipeline (time advance,
/// spawn check, movement, escape handling, game-over check) and the input
/// path. The render loop holds a handle and calls tick/on_input; teardown
/// calls dispose so nothing fires afterwards.
pub struct GameSession {
    variant: GameVariant,
    tier: Tier,
    field: TargetField,
    spawner: TargetSpawner,
    engine: ScoreEngine,
    sink: Box<dyn ResultSink>,
    state: SessionState,
    input_buffer: String,
    last_tick_ms: Option<u64>,
    spawn_accum_ms: f64,
    emitted: bool,
}

impl GameSession {
    pub fn new(
        variant: GameVariant,
        tier: Tier,
        rng: Box<dyn RandomSource>,
        sink: Box<dyn ResultSink>,
    ) -> Self {
        let rule = match variant.container_capacity() {
            Some(capacity) => GameOverRule::ContainerFull { capacity },
            None => GameOverRule::LivesDepleted,
        };

        Self {
            variant,
            tier,
            field: TargetField::new(),
            spawner: TargetSpawner::new(variant.constants().jitter_fraction, rng),
            engine: ScoreEngine::new(rule),
            sink,
            state: SessionState::new(tier.lives_base()),
            input_buffer: String::new(),
            last_tick_ms: None,
            spawn_accum_ms: 0.0,
            emitted: false,
        }
    }

    pub fn variant(&self) -> GameVariant {
        self.variant
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn targets(&self) -> &[Target] {
        self.field.targets()
    }

    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    pub fn fill_percent(&self) -> u32 {
        self.engine.fill_percent(&self.state)
    }

    /// idle -> playing; resets all per-session state and re-seeds the clock
    pub fn start(&mut self) {
        self.field.clear();
        self.state = SessionState::new(self.tier.lives_base());
        self.state.phase = GamePhase::Playing;
        self.input_buffer.clear();
        self.last_tick_ms = None;
        self.spawn_accum_ms = 0.0;
        self.emitted = false;
    }

    /// any state -> playing, equivalent to start()
    pub fn restart(&mut self) {
        self.start();
    }

    pub fn pause(&mut self) {
        if self.state.phase == GamePhase::Playing {
            self.state.phase = GamePhase::Paused;
            // dropping the tick origin freezes the clock; paused wall-time
            // never reaches the difficulty ramp
            self.last_tick_ms = None;
        }
    }

    pub fn resume(&mut self) {
        if self.state.phase == GamePhase::Paused {
            self.state.phase = GamePhase::Playing;
        }
    }

    /// Teardown: cancels the pending presentation-delay removals along with
    /// everything else in flight. Safe to call from any phase.
    pub fn dispose(&mut self) {
        self.field.clear();
        self.input_buffer.clear();
        self.last_tick_ms = None;
        self.state.phase = GamePhase::Idle;
    }

    /// One frame. The first tick after start/resume establishes the time
    /// origin and performs no movement.
    pub fn tick(&mut self, now_ms: u64) {
        match self.state.phase {
            GamePhase::Playing => {}
            GamePhase::Paused => return,
            GamePhase::Idle | GamePhase::GameOver => {
                debug_assert!(false, "tick outside playing is a caller bug");
                return;
            }
        }

        let last = match self.last_tick_ms {
            Some(last) => last,
            None => {
                self.last_tick_ms = Some(now_ms);
                return;
            }
        };

        let delta_ms = now_ms.saturating_sub(last) as f64;
        self.last_tick_ms = Some(now_ms);
        self.state.elapsed_ms += delta_ms;

        let config = curve(self.state.elapsed_seconds(), self.tier, self.variant);

        self.spawn_accum_ms += delta_ms;
        while self.spawn_accum_ms >= config.spawn_interval_ms {
            self.spawn_accum_ms -= config.spawn_interval_ms;
            let target = self.spawner.spawn(&config);
            self.field.insert(target);
        }

        let escaped = self.field.advance(delta_ms);
        if !escaped.is_empty() && self.engine.on_escape(&mut self.state, escaped.len() as u32) {
            self.enter_game_over();
        }
    }

    /// Current value of the input line, forwarded verbatim from the UI
    pub fn on_input(&mut self, text: &str) {
        if self.state.phase != GamePhase::Playing {
            debug_assert!(
                self.state.phase == GamePhase::Paused,
                "on_input outside playing is a caller bug"
            );
            return;
        }

        let typed = text.chars().count();
        let previous = self.input_buffer.chars().count();
        if typed > previous {
            self.state.total_chars += (typed - previous) as u32;
        }
        self.input_buffer = text.to_string();

        if self.input_buffer.is_empty() {
            return;
        }

        match self.field.resolve_input(&self.input_buffer) {
            MatchResult::Matched { word, .. } => {
                self.engine.on_match(&mut self.state, &word);
                self.input_buffer.clear();
            }
            MatchResult::Candidates(_) => {}
            MatchResult::NoMatch => {
                if self.variant.tracks_misses() {
                    self.engine.on_miss(&mut self.state);
                }
                self.input_buffer.clear();
            }
        }
    }

    fn enter_game_over(&mut self) {
        self.state.phase = GamePhase::GameOver;
        if self.emitted {
            return;
        }
        self.emitted = true;

        let record = SessionRecord {
            score: self.state.score,
            words_typed: self.state.words_typed,
            accuracy: self.state.accuracy(),
            max_combo: self.state.max_combo,
            difficulty: self.tier.to_string().to_lowercase(),
            time_spent: self.state.elapsed_seconds().round() as u64,
            kind: self.variant.to_string().to_lowercase(),
            title: self.variant.title().to_string(),
        };
        self.sink.record(&record);
    }
}
