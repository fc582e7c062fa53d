// Core modules
pub mod ai;
pub mod cli;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod remote;
pub mod review;
