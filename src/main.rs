use clap::Parser;
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use zhipin_greeter::record::DEFAULT_RECORD_PATH;
use zhipin_greeter::{app, Config, DeliveredSet, Error};

#[derive(Parser)]
#[command(name = "zhipin_greeter")]
#[command(version, about = "Send a greeting to BOSS Zhipin job postings matching a keyword")]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,

    /// Path to the delivered-postings record
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_RECORD_PATH)]
    record: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    println!("{}", "=".repeat(50));
    println!("BOSS Zhipin greeter");
    println!("{}", "=".repeat(50));

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let delivered = DeliveredSet::load(&cli.record, DeliveredSet::today());

    // headless_chrome is blocking; keep it off the async workers.
    let interrupt = Arc::new(AtomicBool::new(false));
    let worker = tokio::task::spawn_blocking({
        let interrupt = interrupt.clone();
        move || app::run(&config, delivered, interrupt)
    });

    let joined = match supervise(worker, &interrupt, ctrl_c).await {
        Supervised::Finished(joined) => joined,
        // the blocking worker would hold up runtime shutdown
        Supervised::Abandoned => std::process::exit(0),
    };

    match joined {
        Ok(Ok(_)) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            if !matches!(e, Error::Interrupted) {
                tracing::error!("Run aborted: {}", e);
            }
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            tracing::error!("Run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

enum Supervised<T> {
    Finished(Result<T, JoinError>),
    /// Interrupted twice before the worker wound down.
    Abandoned,
}

/// Wait for `worker`, raising `interrupt` on the first signal.
///
/// A second signal gives up on the worker instead of waiting for it.
async fn supervise<T, F>(
    mut worker: JoinHandle<T>,
    interrupt: &AtomicBool,
    mut signal: impl FnMut() -> F,
) -> Supervised<T>
where
    F: Future<Output = ()>,
{
    tokio::select! {
        joined = &mut worker => return Supervised::Finished(joined),
        () = signal() => {
            tracing::warn!("Interrupted, closing browser... (Ctrl-C again to quit now)");
            interrupt.store(true, Ordering::Relaxed);
        }
    }

    tokio::select! {
        joined = &mut worker => Supervised::Finished(joined),
        () = signal() => {
            tracing::warn!("Interrupted again, quitting without cleanup");
            Supervised::Abandoned
        }
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("zhipin_greeter=debug")
    } else {
        EnvFilter::new("zhipin_greeter=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
