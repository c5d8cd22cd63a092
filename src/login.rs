//! Interactive QR-code login.
//!
//! The operator scans the code in the opened browser; we only poll for an
//! element that exists once the session is authenticated.

use crate::browser::{self, Session};
use crate::config::{Config, Timing};
use crate::pacing::Pacer;
use crate::selectors::{LOGIN_BUTTON, USER_NAV};
use crate::{Error, Result};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct LoginPolicy {
    pub poll: Duration,
    pub timeout: Duration,
    pub reminder: Duration,
}

impl From<&Timing> for LoginPolicy {
    fn from(timing: &Timing) -> Self {
        Self {
            poll: timing.login_poll(),
            timeout: timing.login_timeout(),
            reminder: timing.login_reminder(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginReport {
    pub elapsed: Duration,
    pub reminders: u32,
}

/// Poll `logged_in` every `policy.poll` until it returns true.
///
/// Returns [`Error::LoginTimeout`] once `policy.timeout` of polling has
/// elapsed, or [`Error::Interrupted`] if the pacer was interrupted.
pub fn wait_for_login<P: Pacer>(
    mut logged_in: impl FnMut() -> bool,
    policy: &LoginPolicy,
    pacer: &mut P,
) -> Result<LoginReport> {
    let mut elapsed = Duration::ZERO;
    let mut last_reminder = Duration::ZERO;
    let mut reminders = 0;

    while elapsed < policy.timeout {
        if pacer.interrupted() {
            return Err(Error::Interrupted);
        }
        if logged_in() {
            return Ok(LoginReport { elapsed, reminders });
        }

        if elapsed - last_reminder >= policy.reminder {
            tracing::info!("Waiting for login... ({}s elapsed)", elapsed.as_secs());
            last_reminder = elapsed;
            reminders += 1;
        }

        pacer.pause(policy.poll);
        elapsed = elapsed.saturating_add(policy.poll);
    }

    Err(Error::LoginTimeout(policy.timeout))
}

/// Open the site, bring up the login dialog and wait for the operator.
pub fn login<P: Pacer>(session: &Session, config: &Config, pacer: &mut P) -> Result<()> {
    tracing::info!("Opening {}", config.site.base_url);
    session.navigate(&config.site.base_url)?;
    pacer.pause(Duration::from_secs(2));

    match session.wait_for(LOGIN_BUTTON, Duration::from_secs(10)) {
        Ok(button) => match browser::click(&button) {
            Ok(()) => tracing::info!("Login dialog opened"),
            Err(e) => tracing::warn!("Could not open login dialog: {}", e),
        },
        Err(_) => {
            tracing::info!("No login button found; already logged in or the layout changed");
        }
    }

    // QR code render
    pacer.pause(Duration::from_secs(5));

    println!();
    println!("{}", "=".repeat(50));
    println!("Scan the QR code in the browser to log in.");
    println!("The run continues automatically once you are logged in.");
    println!("{}", "=".repeat(50));
    println!();

    let policy = LoginPolicy::from(&config.timing);
    let report = wait_for_login(|| !session.find_all(USER_NAV).is_empty(), &policy, pacer)
        .inspect_err(|e| {
            if let Error::LoginTimeout(_) = e {
                tracing::error!("Login timed out, run the program again");
            }
        })?;

    tracing::info!("Logged in after {}s", report.elapsed.as_secs());
    pacer.pause(Duration::from_secs(2));
    Ok(())
}
