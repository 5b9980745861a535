// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod curve;
pub mod field;
pub mod history;
pub mod rng;
pub mod runtime;
pub mod score;
pub mod session;
pub mod spawner;
pub mod words;
