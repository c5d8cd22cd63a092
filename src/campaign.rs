//! Outer delivery loop.
//!
//! Walks the listing by index until the daily quota is met, too many attempts
//! in a row fail, or no further postings can be listed.

use crate::config::Config;
use crate::pacing::{random_delay, Pacer};
use std::fmt;
use std::time::Duration;

/// Result of one delivery attempt. Only [`Outcome::Sent`] counts as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    /// Id already in today's delivered-set.
    AlreadyDelivered,
    /// The site shows the recruiter as already contacted.
    AlreadyContacted,
    Failed(String),
    /// The operator interrupted the run mid-attempt; nothing was sent.
    Interrupted,
}

impl Outcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Outcome::Sent)
    }
}

/// What the loop drives: the live result page, or a fake in tests.
pub trait Postings {
    /// Count the postings currently listed; zero if none can be found.
    fn discover(&mut self) -> usize;

    /// Ask the page for more postings (scroll) before the next `discover`.
    fn load_more(&mut self);

    fn attempt(&mut self, index: usize) -> Outcome;
}

#[derive(Debug, Clone)]
pub struct CampaignPlan {
    pub daily_limit: u32,
    pub max_failures: u32,
    pub min_delay: f64,
    pub max_delay: f64,
    pub extra_delay: Duration,
}

impl From<&Config> for CampaignPlan {
    fn from(config: &Config) -> Self {
        Self {
            daily_limit: config.delivery.daily_limit,
            max_failures: config.timing.max_failures,
            min_delay: config.delivery.min_delay,
            max_delay: config.delivery.max_delay,
            extra_delay: Duration::from_secs(config.timing.extra_delay),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuotaReached,
    TooManyFailures,
    NoListing,
    ListingExhausted,
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StopReason::QuotaReached => "daily limit reached",
            StopReason::TooManyFailures => "too many consecutive failures",
            StopReason::NoListing => "no postings found",
            StopReason::ListingExhausted => "no more postings to load",
            StopReason::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub sent: u32,
    pub attempts: u32,
    pub stop: StopReason,
}

pub fn run<S: Postings, P: Pacer>(site: &mut S, pacer: &mut P, plan: &CampaignPlan) -> RunSummary {
    let mut sent = 0;
    let mut attempts = 0;
    let mut streak = 0;
    let mut index = 0;
    let mut listed: Option<usize> = None;

    let stop = loop {
        if sent >= plan.daily_limit {
            break StopReason::QuotaReached;
        }
        if pacer.interrupted() {
            break StopReason::Interrupted;
        }

        let total = match listed {
            Some(total) if index < total => total,
            previous => {
                if previous.is_some() {
                    site.load_more();
                }
                let total = site.discover();
                if pacer.interrupted() {
                    break StopReason::Interrupted;
                }
                if total == 0 {
                    break StopReason::NoListing;
                }
                // New cards are appended, so continue from the current index.
                if previous.is_some_and(|prev| total <= prev) {
                    break StopReason::ListingExhausted;
                }
                listed = Some(total);
                total
            }
        };

        tracing::info!("Visible postings: {}, processing #{}", total, index + 1);
        let outcome = site.attempt(index);
        attempts += 1;
        index += 1;

        if outcome == Outcome::Interrupted {
            break StopReason::Interrupted;
        }
        if outcome.is_sent() {
            sent += 1;
            streak = 0;
            tracing::info!("  ✓ Greeting sent ({} today)", sent);
        } else {
            streak += 1;
            tracing::debug!("  Outcome: {:?} ({} in a row)", outcome, streak);
        }

        if streak >= plan.max_failures {
            tracing::warn!("{} attempts failed in a row, stopping", streak);
            break StopReason::TooManyFailures;
        }

        if sent < plan.daily_limit && index < total {
            let delay = random_delay(plan.min_delay, plan.max_delay);
            pacer.pause(delay.saturating_add(plan.extra_delay));
        }
    };

    RunSummary {
        sent,
        attempts,
        stop,
    }
}
