use crate::words::PoolId;

/// Difficulty level selected before a session starts
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub fn speed_multiplier(&self) -> f64 {
        match self {
            Tier::Easy => 0.75,
            Tier::Medium => 1.0,
            Tier::Hard => 1.3,
        }
    }

    pub fn lives_base(&self) -> u32 {
        match self {
            Tier::Easy => 5,
            Tier::Medium => 4,
            Tier::Hard => 3,
        }
    }
}

/// The three mini-games sharing the ramp/spawn/score core
#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum, strum_macros::Display)]
pub enum GameVariant {
    /// Words fall from the top; each one that reaches the ground costs a life
    Wordfall,
    /// Balloons rise from the bottom; stray keystrokes are free
    Balloons,
    /// Escaped blocks pile up; the session ends when the container is full
    Blockstack,
}

/// Per-variant ramp constants; thresholds partition [0,1] into contiguous
/// bins evaluated in ascending order, last matching entry wins
pub struct RampConstants {
    pub ramp_duration_secs: f64,
    pub spawn_base_ms: f64,
    pub spawn_floor_ms: f64,
    pub speed_floor: f64,
    pub speed_range: f64,
    pub jitter_fraction: f64,
    pub pool_table: &'static [(f64, &'static [PoolId])],
}

const WORDFALL: RampConstants = RampConstants {
    ramp_duration_secs: 90.0,
    spawn_base_ms: 2400.0,
    spawn_floor_ms: 700.0,
    speed_floor: 0.0028,
    speed_range: 0.0042,
    jitter_fraction: 0.25,
    pool_table: &[
        (0.0, &[PoolId::Short]),
        (0.25, &[PoolId::Short, PoolId::Medium]),
        (0.55, &[PoolId::Medium, PoolId::Long]),
        (0.85, &[PoolId::Long, PoolId::Expert]),
    ],
};

const BALLOONS: RampConstants = RampConstants {
    ramp_duration_secs: 75.0,
    spawn_base_ms: 2000.0,
    spawn_floor_ms: 650.0,
    speed_floor: 0.0024,
    speed_range: 0.0036,
    jitter_fraction: 0.2,
    pool_table: &[
        (0.0, &[PoolId::Short]),
        (0.3, &[PoolId::Short, PoolId::Medium]),
        (0.7, &[PoolId::Medium, PoolId::Long]),
    ],
};

const BLOCKSTACK: RampConstants = RampConstants {
    ramp_duration_secs: 80.0,
    spawn_base_ms: 2600.0,
    spawn_floor_ms: 800.0,
    speed_floor: 0.0022,
    speed_range: 0.0030,
    jitter_fraction: 0.15,
    pool_table: &[
        (0.0, &[PoolId::Short]),
        (0.2, &[PoolId::Short, PoolId::Medium]),
        (0.5, &[PoolId::Medium]),
        (0.8, &[PoolId::Medium, PoolId::Long]),
    ],
};

impl GameVariant {
    pub fn constants(&self) -> &'static RampConstants {
        match self {
            GameVariant::Wordfall => &WORDFALL,
            GameVariant::Balloons => &BALLOONS,
            GameVariant::Blockstack => &BLOCKSTACK,
        }
    }

    /// Whether a keystroke that prefixes no live target resets the combo
    pub fn tracks_misses(&self) -> bool {
        !matches!(self, GameVariant::Balloons)
    }

    /// Container capacity in blocks for the fill variant
    pub fn container_capacity(&self) -> Option<u32> {
        match self {
            GameVariant::Blockstack => Some(12),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameVariant::Wordfall => "Word Fall",
            GameVariant::Balloons => "Balloon Pop",
            GameVariant::Blockstack => "Block Stack",
        }
    }
}

/// Difficulty settings at a point in time; derived, never stored
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyConfig {
    pub word_pools: &'static [PoolId],
    pub base_speed: f64,
    pub spawn_interval_ms: f64,
    pub lives_base: u32,
}

/// Pure ramp evaluation. Randomness (word picks, speed jitter) is applied by
/// the caller so this stays deterministic.
pub fn curve(elapsed_seconds: f64, tier: Tier, variant: GameVariant) -> DifficultyConfig {
    let c = variant.constants();
    let progress = (elapsed_seconds / c.ramp_duration_secs).clamp(0.0, 1.0);

    let mut word_pools = c.pool_table[0].1;
    for (threshold, pools) in c.pool_table {
        if progress >= *threshold {
            word_pools = pools;
        }
    }

    let base_speed = (c.speed_floor + progress * c.speed_range) * tier.speed_multiplier();
    let spawn_interval_ms =
        (c.spawn_base_ms - progress * (c.spawn_base_ms - c.spawn_floor_ms)).max(c.spawn_floor_ms);

    DifficultyConfig {
        word_pools,
        base_speed,
        spawn_interval_ms,
        lives_base: tier.lives_base(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TIERS: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];
    const ALL_VARIANTS: [GameVariant; 3] = [
        GameVariant::Wordfall,
        GameVariant::Balloons,
        GameVariant::Blockstack,
    ];

    #[test]
    fn spawn_interval_is_monotonically_non_increasing() {
        for variant in ALL_VARIANTS {
            for tier in ALL_TIERS {
                let mut prev = f64::MAX;
                for step in 0..200 {
                    let elapsed = step as f64 * 0.75;
                    let cfg = curve(elapsed, tier, variant);
                    assert!(
                        cfg.spawn_interval_ms <= prev,
                        "spawn interval rose at {elapsed}s ({variant}/{tier})"
                    );
                    prev = cfg.spawn_interval_ms;
                }
            }
        }
    }

    #[test]
    fn base_speed_is_monotonically_non_decreasing() {
        for variant in ALL_VARIANTS {
            for tier in ALL_TIERS {
                let mut prev = 0.0;
                for step in 0..200 {
                    let elapsed = step as f64 * 0.75;
                    let cfg = curve(elapsed, tier, variant);
                    assert!(cfg.base_speed >= prev);
                    prev = cfg.base_speed;
                }
            }
        }
    }

    #[test]
    fn spawn_interval_bottoms_out_at_floor() {
        for variant in ALL_VARIANTS {
            let c = variant.constants();
            let cfg = curve(10_000.0, Tier::Medium, variant);
            assert_eq!(cfg.spawn_interval_ms, c.spawn_floor_ms);
        }
    }

    #[test]
    fn session_opens_with_first_pool_bin() {
        for variant in ALL_VARIANTS {
            let cfg = curve(0.0, Tier::Medium, variant);
            assert_eq!(cfg.word_pools, &[PoolId::Short]);
        }
    }

    #[test]
    fn full_ramp_reaches_last_pool_bin() {
        for variant in ALL_VARIANTS {
            let c = variant.constants();
            let cfg = curve(c.ramp_duration_secs, Tier::Medium, variant);
            assert_eq!(cfg.word_pools, c.pool_table.last().unwrap().1);
        }
    }

    #[test]
    fn pool_bins_partition_the_ramp() {
        // a mid-ramp point in wordfall should sit in the second bin
        let cfg = curve(0.3 * 90.0, Tier::Medium, GameVariant::Wordfall);
        assert_eq!(cfg.word_pools, &[PoolId::Short, PoolId::Medium]);
    }

    #[test]
    fn tier_multiplier_orders_speeds() {
        let easy = curve(30.0, Tier::Easy, GameVariant::Wordfall);
        let medium = curve(30.0, Tier::Medium, GameVariant::Wordfall);
        let hard = curve(30.0, Tier::Hard, GameVariant::Wordfall);

        assert!(easy.base_speed < medium.base_speed);
        assert!(medium.base_speed < hard.base_speed);
    }

    #[test]
    fn lives_base_follows_tier() {
        assert_eq!(curve(0.0, Tier::Easy, GameVariant::Wordfall).lives_base, 5);
        assert_eq!(curve(0.0, Tier::Medium, GameVariant::Wordfall).lives_base, 4);
        assert_eq!(curve(0.0, Tier::Hard, GameVariant::Wordfall).lives_base, 3);
    }

    #[test]
    fn negative_elapsed_clamps_to_session_start() {
        let cfg = curve(-5.0, Tier::Medium, GameVariant::Balloons);
        assert_eq!(cfg, curve(0.0, Tier::Medium, GameVariant::Balloons));
    }

    #[test]
    fn only_balloons_forgives_misses() {
        assert!(GameVariant::Wordfall.tracks_misses());
        assert!(GameVariant::Blockstack.tracks_misses());
        assert!(!GameVariant::Balloons.tracks_misses());
    }
}
