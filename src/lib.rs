//! Greets recruiters on BOSS Zhipin job postings from a Chrome session.
//!
//! A run logs in interactively, searches one keyword and sends the configured
//! greeting to each posting not yet contacted today, up to a daily limit.

pub mod app;
pub mod browser;
pub mod campaign;
pub mod config;
pub mod deliver;
mod error;
pub mod listing;
pub mod login;
pub mod pacing;
pub mod record;
pub mod selectors;

pub use campaign::{Outcome, RunSummary, StopReason};
pub use config::Config;
pub use error::{Error, Result};
pub use record::DeliveredSet;
