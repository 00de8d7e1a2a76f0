//! Command handlers

pub mod config;
pub mod movie;
pub mod provision;
