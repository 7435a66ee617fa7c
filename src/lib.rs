//! Universal Bot Library
//!
//! A command-driven WhatsApp responder bot.
//!
//! This crate provides the core functionality for:
//! - Talking to a WhatsApp Web bridge over REST and an event stream
//! - Greeting unknown senders once with an away-message
//! - Routing slash commands to their handlers
//! - Scheduling reminders and message bursts
//! - Kicking and promoting group participants

pub mod bot;
pub mod commands;
pub mod config;
pub mod group;
pub mod health;
pub mod messaging;
pub mod pairing;
pub mod scheduler;
pub mod session;
pub mod shutdown;
