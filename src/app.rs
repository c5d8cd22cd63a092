use crate::browser::Session;
use crate::campaign::{self, CampaignPlan, RunSummary};
use crate::config::Config;
use crate::deliver::{ChromePage, Courier};
use crate::pacing::{Pacer, ThreadPacer};
use crate::record::DeliveredSet;
use crate::{listing, login, Result};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Full run: launch Chrome, wait for login, search, then greet postings.
///
/// Blocks the calling thread. Setting `interrupt` cuts every pending wait
/// short and ends the run at the next step; Chrome is closed on return.
pub fn run(
    config: &Config,
    mut delivered: DeliveredSet,
    interrupt: Arc<AtomicBool>,
) -> Result<RunSummary> {
    let mut pacer = ThreadPacer::new(interrupt);

    tracing::info!("Starting browser...");
    let session = Session::launch(config)?;
    tracing::info!("Browser started");

    login::login(&session, config, &mut pacer)?;
    listing::search(&session, config, &mut pacer)?;

    let plan = CampaignPlan::from(config);
    tracing::info!(
        "Sending greetings (daily limit: {}, already sent today: {})",
        plan.daily_limit,
        delivered.len()
    );

    let summary = {
        let page = ChromePage::new(&session, config);
        let mut courier = Courier::new(
            page,
            &config.delivery.greeting,
            &mut delivered,
            pacer.clone(),
        );
        campaign::run(&mut courier, &mut pacer, &plan)
    };

    println!();
    println!("Run finished: {}", summary.stop);
    println!("Greetings sent: {} ({} attempts)", summary.sent, summary.attempts);

    if !pacer.interrupted() {
        let close_delay = config.timing.close_delay;
        println!("Browser closes in {} seconds...", close_delay);
        pacer.pause(Duration::from_secs(close_delay));
    }
    session.close();

    Ok(summary)
}
