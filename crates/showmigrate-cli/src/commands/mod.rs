pub mod clear;
pub mod config;
pub mod migrate;
pub mod progress;
pub mod prompts;
