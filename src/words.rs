use crate::rng::RandomSource;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

static POOL_DIR: Dir = include_dir!("src/pools");

/// Word pools bucketed by length, unlocked progressively by the ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum PoolId {
    Short,
    Medium,
    Long,
    Expert,
}

impl PoolId {
    pub const ALL: [PoolId; 4] = [PoolId::Short, PoolId::Medium, PoolId::Long, PoolId::Expert];

    fn file_name(&self) -> &'static str {
        match self {
            PoolId::Short => "short.json",
            PoolId::Medium => "medium.json",
            PoolId::Long => "long.json",
            PoolId::Expert => "expert.json",
        }
    }
}

#[allow(dead_code)]
#[derive(Deserialize, Clone, Debug)]
pub struct Pool {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Pool {
    pub fn load(id: PoolId) -> Self {
        read_pool_from_file(id.file_name()).unwrap()
    }
}

/// All pools, loaded once per session
#[derive(Debug, Clone)]
pub struct PoolSet {
    short: Pool,
    medium: Pool,
    long: Pool,
    expert: Pool,
}

impl PoolSet {
    pub fn load() -> Self {
        Self {
            short: Pool::load(PoolId::Short),
            medium: Pool::load(PoolId::Medium),
            long: Pool::load(PoolId::Long),
            expert: Pool::load(PoolId::Expert),
        }
    }

    pub fn get(&self, id: PoolId) -> &Pool {
        match id {
            PoolId::Short => &self.short,
            PoolId::Medium => &self.medium,
            PoolId::Long => &self.long,
            PoolId::Expert => &self.expert,
        }
    }

    /// Uniform pick of one word from the given pool
    pub fn pick_word(&self, id: PoolId, rng: &mut dyn RandomSource) -> String {
        let pool = self.get(id);
        pool.words[rng.pick_index(pool.words.len())].clone()
    }
}

fn read_pool_from_file(file_name: &str) -> Result<Pool, Box<dyn Error>> {
    let file = POOL_DIR.get_file(file_name).expect("Pool file not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret file as a string");

    let pool = from_str(file_as_str).expect("Unable to deserialize pool json");

    Ok(pool)
}
