//! Keyword search and job-card discovery.
//!
//! Cards are addressed by index and re-resolved for every attempt, since the
//! result list re-renders after each click.

use crate::browser::Session;
use crate::config::Config;
use crate::pacing::Pacer;
use crate::selectors::JOB_CARDS;
use crate::Result;
use headless_chrome::Element;
use std::time::Duration;

const SCROLL_STEP: i64 = 800;

pub fn search_url(base_url: &str, keyword: &str) -> String {
    format!(
        "{}/web/geek/job?query={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(keyword)
    )
}

pub fn search<P: Pacer>(session: &Session, config: &Config, pacer: &mut P) -> Result<()> {
    let keyword = &config.search.keyword;
    tracing::info!("Searching for postings: {}", keyword);

    session.navigate(&search_url(&config.site.base_url, keyword))?;
    tracing::info!("Waiting for results to load...");
    pacer.pause(Duration::from_secs(config.timing.search_settle));

    tracing::info!("Search page loaded");
    Ok(())
}

/// Number of job cards under the first selector that yields any.
///
/// Zero means no selector matched within its wait.
pub fn discover<P: Pacer + ?Sized>(session: &Session, config: &Config, pacer: &mut P) -> usize {
    let timing = &config.timing;
    tracing::info!("Looking for job cards...");
    pacer.pause(Duration::from_secs(timing.listing_settle));

    for selector in JOB_CARDS {
        if pacer.interrupted() {
            return 0;
        }
        if session
            .wait_for(selector, Duration::from_secs(timing.listing_wait))
            .is_err()
        {
            tracing::debug!("No cards for '{}'", selector);
            continue;
        }
        pacer.pause(Duration::from_secs(timing.match_settle));

        let count = session.find_all(selector).len();
        if count > 0 {
            tracing::info!("Found {} postings", count);
            return count;
        }
    }

    tracing::warn!("No job cards found");
    0
}

/// Scroll the result list so the site appends more cards.
pub fn load_more<P: Pacer + ?Sized>(session: &Session, config: &Config, pacer: &mut P) {
    tracing::info!("Reached the end of visible postings, scrolling down...");
    if let Err(e) = session.scroll_by(SCROLL_STEP) {
        tracing::warn!("Could not scroll: {}", e);
    }
    pacer.pause(Duration::from_secs(config.timing.scroll_settle));
}

/// The card at `index`, looked up afresh.
pub fn resolve_card(session: &Session, index: usize) -> Option<Element<'_>> {
    JOB_CARDS.iter().find_map(|selector| {
        let mut cards = session.find_all(selector);
        (cards.len() > index).then(|| cards.swap_remove(index))
    })
}
