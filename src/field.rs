/// Movement is normalized against a 60fps reference frame so target speeds
/// are stable regardless of the actual tick cadence
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// How long a matched/expired target stays on screen before removal
pub const LINGER_MS: f64 = 300.0;

/// Progress value at which a target leaves the playable area
pub const EXIT_THRESHOLD: f64 = 1.0;

pub type TargetId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Falling,
    Matched,
    Expired,
}

/// A single typable object in flight. `word` is immutable once spawned;
/// `position` runs from 0 at the spawn edge to 1 at the exit edge.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: TargetId,
    pub word: String,
    pub position: f64,
    pub speed: f64,
    /// Lateral coordinate in [0,1], assigned at spawn
    pub lane: f64,
    pub state: TargetState,
    linger_ms: f64,
}

impl Target {
    pub fn new(id: TargetId, word: String, speed: f64, lane: f64) -> Self {
        Self {
            id,
            word,
            position: 0.0,
            speed,
            lane,
            state: TargetState::Falling,
            linger_ms: LINGER_MS,
        }
    }
}

/// Outcome of resolving the current input buffer against the live set
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// The buffer exactly equals a falling target's word
    Matched { id: TargetId, word: String },
    /// The buffer is a prefix of at least this many falling targets
    Candidates(usize),
    /// No falling target starts with the buffer
    NoMatch,
}

/// The live set of on-screen targets. Insertion order is preserved and is
/// the tie-break order when duplicate words are in flight. The set has no
/// capacity cap; falling behind is the game-over signal, not an error.
#[derive(Debug, Default)]
pub struct TargetField {
    targets: Vec<Target>,
}

impl TargetField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: Target) {
        self.targets.push(target);
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn falling_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.state == TargetState::Falling)
            .count()
    }

    /// Advance all falling targets by `delta_ms`, expire the ones that cross
    /// the exit edge, and drop non-falling targets whose linger has run out.
    /// Returns one escape event per newly expired target.
    pub fn advance(&mut self, delta_ms: f64) -> Vec<TargetId> {
        let frames = delta_ms / REFERENCE_FRAME_MS;
        let mut escaped = Vec::new();

        for target in &mut self.targets {
            match target.state {
                TargetState::Falling => {
                    target.position += target.speed * frames;
                    if target.position >= EXIT_THRESHOLD {
                        target.state = TargetState::Expired;
                        escaped.push(target.id);
                    }
                }
                TargetState::Matched | TargetState::Expired => {
                    target.linger_ms -= delta_ms;
                }
            }
        }

        self.targets
            .retain(|t| t.state == TargetState::Falling || t.linger_ms > 0.0);

        escaped
    }

    /// Scan falling targets in insertion order. An exact (case-insensitive)
    /// equality wins over any number of prefix candidates; with duplicate
    /// in-flight words the first-inserted target is the one matched.
    pub fn resolve_input(&mut self, current_input: &str) -> MatchResult {
        let needle = current_input.to_lowercase();
        let mut candidates = 0;
        let mut matched: Option<(TargetId, String)> = None;

        for target in &self.targets {
            if target.state != TargetState::Falling {
                continue;
            }
            let word = target.word.to_lowercase();
            if word.starts_with(&needle) {
                candidates += 1;
                if matched.is_none() && word == needle {
                    matched = Some((target.id, target.word.clone()));
                }
            }
        }

        if let Some((id, word)) = matched {
            let target = self
                .targets
                .iter_mut()
                .find(|t| t.id == id)
                .expect("matched target is in the live set");
            target.state = TargetState::Matched;
            return MatchResult::Matched { id, word };
        }

        if candidates > 0 {
            MatchResult::Candidates(candidates)
        } else {
            MatchResult::NoMatch
        }
    }
}
