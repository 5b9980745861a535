use crate::curve::DifficultyConfig;
use crate::field::Target;
use crate::rng::RandomSource;
use crate::words::PoolSet;

const LEFT_LANE: (f64, f64) = (0.05, 0.45);
const RIGHT_LANE: (f64, f64) = (0.55, 0.95);

/// Creates new targets from the current difficulty settings. Owns the id
/// counter and the left/right alternation so consecutive spawns never land
/// on top of each other.
pub struct TargetSpawner {
    pools: PoolSet,
    rng: Box<dyn RandomSource>,
    jitter_fraction: f64,
    next_id: u64,
    spawn_left: bool,
}

impl TargetSpawner {
    pub fn new(jitter_fraction: f64, rng: Box<dyn RandomSource>) -> Self {
        Self {
            pools: PoolSet::load(),
            rng,
            jitter_fraction,
            next_id: 0,
            spawn_left: true,
        }
    }

    pub fn spawn(&mut self, config: &DifficultyConfig) -> Target {
        let pool_id = config.word_pools[self.rng.pick_index(config.word_pools.len())];
        let word = self.pools.pick_word(pool_id, self.rng.as_mut());

        let speed = config.base_speed * (1.0 + self.rng.next_f64() * self.jitter_fraction);

        let (lo, hi) = if self.spawn_left { LEFT_LANE } else { RIGHT_LANE };
        self.spawn_left = !self.spawn_left;
        let lane = lo + self.rng.next_f64() * (hi - lo);

        let id = self.next_id;
        self.next_id += 1;

        Target::new(id, word, speed, lane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{curve, GameVariant, Tier};
    use crate::field::TargetState;
    use crate::rng::SeededRandom;
    use crate::words::{PoolId, PoolSet};

    fn spawner() -> TargetSpawner {
        TargetSpawner::new(0.25, Box::new(SeededRandom::new(99)))
    }

    #[test]
    fn spawned_target_starts_at_the_entry_edge() {
        let cfg = curve(0.0, Tier::Medium, GameVariant::Wordfall);
        let target = spawner().spawn(&cfg);

        assert_eq!(target.position, 0.0);
        assert_eq!(target.state, TargetState::Falling);
        assert!(!target.word.is_empty());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let cfg = curve(0.0, Tier::Medium, GameVariant::Wordfall);
        let mut spawner = spawner();

        let mut prev = None;
        for _ in 0..50 {
            let id = spawner.spawn(&cfg).id;
            if let Some(p) = prev {
                assert!(id > p);
            }
            prev = Some(id);
        }
    }

    #[test]
    fn speed_jitter_stays_within_bounds() {
        let cfg = curve(45.0, Tier::Hard, GameVariant::Wordfall);
        let mut spawner = spawner();

        for _ in 0..200 {
            let t = spawner.spawn(&cfg);
            assert!(t.speed >= cfg.base_speed);
            assert!(t.speed < cfg.base_speed * 1.25);
        }
    }

    #[test]
    fn lanes_alternate_halves() {
        let cfg = curve(0.0, Tier::Medium, GameVariant::Wordfall);
        let mut spawner = spawner();

        for i in 0..20 {
            let lane = spawner.spawn(&cfg).lane;
            if i % 2 == 0 {
                assert!(lane < 0.5, "even spawns land in the left half");
            } else {
                assert!(lane > 0.5, "odd spawns land in the right half");
            }
        }
    }

    #[test]
    fn words_come_from_the_configured_pools() {
        let cfg = curve(0.0, Tier::Medium, GameVariant::Wordfall);
        assert_eq!(cfg.word_pools, &[PoolId::Short]);

        let pools = PoolSet::load();
        let short = pools.get(PoolId::Short);
        let mut spawner = spawner();

        for _ in 0..100 {
            let t = spawner.spawn(&cfg);
            assert!(short.words.contains(&t.word));
        }
    }
}
