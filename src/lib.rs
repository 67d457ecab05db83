pub mod constants;
pub mod engine;
pub mod grid;
pub mod rng;
pub mod score;
pub mod store;
pub mod types;
