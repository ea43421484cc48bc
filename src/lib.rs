pub mod adversary;
pub mod collision;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod engine;
pub mod error;
pub mod levels;
pub mod maze;
pub mod modifiers;
pub mod player;
pub mod rng;
pub mod route;
pub mod types;
