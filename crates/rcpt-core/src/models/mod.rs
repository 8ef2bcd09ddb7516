//! Data models for extracted receipt fields and configuration.

pub mod config;
pub mod receipt;
