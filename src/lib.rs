// Library interface for the recipe binary and its tests

pub mod cli;
pub mod error;
pub mod executor;
pub mod project;
pub mod task;
pub mod utils;
