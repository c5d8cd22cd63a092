//! One greeting attempt against a posting.
//!
//! [`Courier`] owns the bookkeeping (dedup, record, counters, interrupt
//! checks); the page actions sit behind [`JobPage`] so the live Chrome page
//! ([`ChromePage`]) can be swapped for a fake.

use crate::browser::{self, Session};
use crate::campaign::{Outcome, Postings};
use crate::config::Config;
use crate::listing;
use crate::pacing::Pacer;
use crate::record::DeliveredSet;
use crate::selectors::{
    self, ChatLabel, CHAT_CONTROL_TAGS, COMPANY_NAME, COMPANY_NAME_LOOSE, GREETING_INPUTS,
    JOB_LINK, JOB_TITLE, JOB_TITLE_LOOSE, SEND_BUTTONS, UNKNOWN_COMPANY, UNKNOWN_TITLE,
};
use crate::{Error, Result};
use headless_chrome::Element;
use std::time::Duration;

const CHAT_PAGE_MARKER: &str = "/chat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInfo {
    pub title: String,
    pub company: String,
    pub link: Option<String>,
}

/// Actions on the search result page. Waits inside an action go through the
/// given pacer; an action that notices an interrupt returns
/// [`Error::Interrupted`] before doing anything visible to the recruiter.
pub trait JobPage {
    fn discover(&self, pacer: &mut dyn Pacer) -> usize;

    fn load_more(&self, pacer: &mut dyn Pacer);

    fn card(&self, index: usize) -> Option<CardInfo>;

    /// Scroll the card at `index` into view and click it.
    fn open_card(&self, index: usize, pacer: &mut dyn Pacer) -> Result<()>;

    /// Label of the chat control in the detail pane, if any.
    fn chat_control(&self) -> Option<ChatLabel>;

    fn open_chat(&self, pacer: &mut dyn Pacer) -> Result<()>;

    /// Type and send `greeting`. Typing and sending failures are logged, not
    /// returned.
    fn send_greeting(&self, greeting: &str, pacer: &mut dyn Pacer) -> Result<()>;

    fn in_chat(&self) -> bool;

    fn go_back(&self) -> Result<()>;

    fn dismiss_dialog(&self) -> Result<()>;
}

/// Drives delivery attempts for the campaign loop.
pub struct Courier<'a, W: JobPage, P: Pacer> {
    page: W,
    greeting: &'a str,
    delivered: &'a mut DeliveredSet,
    pacer: P,
    sent: u32,
}

impl<'a, W: JobPage, P: Pacer> Courier<'a, W, P> {
    pub fn new(page: W, greeting: &'a str, delivered: &'a mut DeliveredSet, pacer: P) -> Self {
        Self {
            page,
            greeting,
            delivered,
            pacer,
            sent: 0,
        }
    }

    fn checkpoint(&self) -> Result<()> {
        if self.pacer.interrupted() {
            return Err(Error::Interrupted);
        }
        Ok(())
    }

    fn wait(&mut self, secs: f64) -> Result<()> {
        self.pacer.pause(Duration::from_secs_f64(secs));
        self.checkpoint()
    }

    fn deliver(&mut self, index: usize) -> Result<Outcome> {
        let Some(card) = self.page.card(index) else {
            tracing::warn!("  - Posting #{} is out of range", index + 1);
            return Ok(Outcome::Failed("index out of range".into()));
        };
        let id = selectors::posting_id(card.link.as_deref());

        tracing::info!("[{}] {} - {}", self.sent + 1, card.company, card.title);

        if self.delivered.contains(&id) {
            tracing::info!("  - Already delivered today, skipping");
            return Ok(Outcome::AlreadyDelivered);
        }

        tracing::info!("  - Opening posting...");
        self.page.open_card(index, &mut self.pacer)?;
        self.checkpoint()?;
        tracing::debug!("  - Waiting for details...");
        self.wait(3.0)?;

        tracing::info!("  - Looking for the chat button...");
        match self.page.chat_control() {
            Some(ChatLabel::Start) => {}
            Some(ChatLabel::Contacted) => {
                tracing::info!("  - Already contacted, skipping");
                self.delivered.record(id)?;
                return Ok(Outcome::AlreadyContacted);
            }
            None => {
                tracing::warn!("  - Chat button not found");
                return Ok(Outcome::Failed("chat button not found".into()));
            }
        }

        tracing::info!("  - Clicking chat button...");
        self.page.open_chat(&mut self.pacer)?;
        self.checkpoint()?;
        self.wait(3.0)?;

        self.page.send_greeting(self.greeting, &mut self.pacer)?;

        // The greeting is out: record it even if an interrupt arrives now.
        self.sent += 1;
        if let Err(e) = self.delivered.record(id) {
            tracing::warn!("  - Could not save delivered record: {}", e);
        }

        if !self.pacer.interrupted() {
            self.return_to_listing();
        }
        Ok(Outcome::Sent)
    }

    fn return_to_listing(&mut self) {
        self.pacer.pause(Duration::from_secs(2));

        if self.page.in_chat() {
            tracing::info!("  - Opened the chat page, going back to the listing...");
            match self.page.go_back() {
                Ok(()) => self.pacer.pause(Duration::from_secs(3)),
                Err(e) => tracing::warn!("  - Could not go back: {}", e),
            }
        } else if let Err(e) = self.page.dismiss_dialog() {
            tracing::debug!("  - Could not dismiss dialog: {}", e);
        } else {
            self.pacer.pause(Duration::from_millis(500));
        }
    }
}

impl<W: JobPage, P: Pacer> Postings for Courier<'_, W, P> {
    fn discover(&mut self) -> usize {
        self.page.discover(&mut self.pacer)
    }

    fn load_more(&mut self) {
        self.page.load_more(&mut self.pacer)
    }

    fn attempt(&mut self, index: usize) -> Outcome {
        match self.deliver(index) {
            Ok(outcome) => outcome,
            Err(Error::Interrupted) => {
                tracing::info!("  - Interrupted, leaving this posting");
                Outcome::Interrupted
            }
            Err(e) => {
                tracing::warn!("  - Attempt failed: {}", e);
                Outcome::Failed(e.to_string())
            }
        }
    }
}

/// The logged-in zhipin.com result page in Chrome.
pub struct ChromePage<'a> {
    session: &'a Session,
    config: &'a Config,
}

impl<'a> ChromePage<'a> {
    pub fn new(session: &'a Session, config: &'a Config) -> Self {
        Self { session, config }
    }

    fn card_element(&self, index: usize) -> Result<Element<'a>> {
        listing::resolve_card(self.session, index)
            .ok_or_else(|| Error::Browser(format!("posting #{} is no longer listed", index + 1)))
    }
}

impl JobPage for ChromePage<'_> {
    fn discover(&self, pacer: &mut dyn Pacer) -> usize {
        listing::discover(self.session, self.config, pacer)
    }

    fn load_more(&self, pacer: &mut dyn Pacer) {
        listing::load_more(self.session, self.config, pacer)
    }

    fn card(&self, index: usize) -> Option<CardInfo> {
        let card = listing::resolve_card(self.session, index)?;
        let (title, company) = describe(&card);
        let link = card
            .find_element(JOB_LINK)
            .ok()
            .and_then(|a| a.get_attribute_value("href").ok().flatten());

        Some(CardInfo {
            title,
            company,
            link,
        })
    }

    fn open_card(&self, index: usize, pacer: &mut dyn Pacer) -> Result<()> {
        let card = self.card_element(index)?;
        browser::scroll_to_center(&card)?;
        pacer.pause(Duration::from_secs(1));
        if pacer.interrupted() {
            return Err(Error::Interrupted);
        }
        browser::click(&card)
    }

    fn chat_control(&self) -> Option<ChatLabel> {
        find_chat_control(self.session).map(|(_, label)| label)
    }

    fn open_chat(&self, pacer: &mut dyn Pacer) -> Result<()> {
        let control = match find_chat_control(self.session) {
            Some((control, ChatLabel::Start)) => control,
            _ => return Err(Error::Browser("chat button disappeared".into())),
        };
        browser::scroll_to_center(&control)?;
        pacer.pause(Duration::from_secs(1));
        if pacer.interrupted() {
            return Err(Error::Interrupted);
        }
        browser::click(&control)
    }

    fn send_greeting(&self, greeting: &str, pacer: &mut dyn Pacer) -> Result<()> {
        let session = self.session;

        tracing::debug!("  - Looking for the greeting input...");
        let Some(input) = find_first_interactable(session, GREETING_INPUTS, true) else {
            tracing::info!("  - No greeting input, assuming it was sent automatically");
            return Ok(());
        };

        let preview: String = greeting.chars().take(20).collect();
        tracing::info!("  - Typing greeting: {}...", preview);

        if browser::clear_value(&input).is_ok() {
            pacer.pause(Duration::from_millis(500));
        }
        if input.click().is_ok() {
            pacer.pause(Duration::from_millis(500));
        }

        match input.type_into(greeting) {
            Ok(_) => pacer.pause(Duration::from_millis(1500)),
            Err(e) => {
                tracing::warn!("  - Typing failed ({}), setting value directly", e);
                if let Err(e) = browser::set_value(&input, greeting) {
                    tracing::warn!("  - Could not enter greeting, skipping it: {}", e);
                    return Ok(());
                }
            }
        }

        if pacer.interrupted() {
            return Err(Error::Interrupted);
        }

        match find_first_interactable(session, SEND_BUTTONS, false) {
            Some(button) => {
                tracing::debug!("  - Clicking send...");
                match browser::click(&button) {
                    Ok(()) => {
                        pacer.pause(Duration::from_secs(2));
                        tracing::info!("  - Greeting sent");
                    }
                    Err(e) => tracing::warn!("  - Send click failed: {}", e),
                }
            }
            None => {
                tracing::debug!("  - No send button, pressing Enter...");
                match session.press_key("Enter") {
                    Ok(()) => {
                        pacer.pause(Duration::from_secs(2));
                        tracing::info!("  - Greeting sent (Enter)");
                    }
                    Err(e) => tracing::warn!("  - Enter failed: {}", e),
                }
            }
        }
        Ok(())
    }

    fn in_chat(&self) -> bool {
        let url = self.session.current_url();
        tracing::debug!("  - Current URL: {}", url);
        url.contains(CHAT_PAGE_MARKER)
    }

    fn go_back(&self) -> Result<()> {
        self.session.go_back()
    }

    fn dismiss_dialog(&self) -> Result<()> {
        self.session.press_key("Escape")
    }
}

fn describe(card: &Element<'_>) -> (String, String) {
    let pick = |strict: &str, loose: &str| {
        card.find_element(strict)
            .or_else(|_| card.find_element(loose))
            .ok()
            .and_then(|el| browser::text(&el))
            .filter(|t| !t.is_empty())
    };

    (
        pick(JOB_TITLE, JOB_TITLE_LOOSE).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        pick(COMPANY_NAME, COMPANY_NAME_LOOSE).unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
    )
}

/// First visible button or link whose text is a known chat label.
fn find_chat_control(session: &Session) -> Option<(Element<'_>, ChatLabel)> {
    for tag in CHAT_CONTROL_TAGS {
        for element in session.find_all(tag) {
            if !browser::is_interactable(&element) {
                continue;
            }
            let Some(text) = browser::text(&element) else {
                continue;
            };
            if let Some(label) = ChatLabel::classify(&text) {
                tracing::debug!("  - Found control '{}'", text);
                return Some((element, label));
            }
        }
    }
    None
}

fn find_first_interactable<'s>(
    session: &'s Session,
    selectors: &[&str],
    text_entry: bool,
) -> Option<Element<'s>> {
    for selector in selectors {
        for element in session.find_all(selector) {
            if text_entry && !browser::is_text_entry(&element) {
                continue;
            }
            if browser::is_interactable(&element) {
                tracing::debug!("  - Matched '{}'", selector);
                return Some(element);
            }
        }
    }
    None
}
