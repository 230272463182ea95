//! Command router between a telegram-cli subprocess and pluggable
//! command handlers.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
