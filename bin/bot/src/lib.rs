//! meetup-concierge Telegram bot.
//!
//! This crate wires the conversation engine to its outer surfaces:
//! configuration, the PostgreSQL content store, the session store and the
//! Telegram transport.

pub mod config;
pub mod db;
pub mod error;
pub mod service;
pub mod telegram;
