//! Bitcoin Vanity Address Hunter CLI
//!
//! Usage:
//!   btc_vanity                                  # defaults: 9 / 14 / 10, 16 workers
//!   btc_vanity --sequentrepeats 7 --workers 8
//!   btc_vanity --token 123:abc --chat 42        # also send matches to Telegram

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use btc_vanity::notify::NotifyError;
use btc_vanity::{
    AddressScheme, Bitcoin, Config, Dispatcher, Notifier, TelegramSink, VanityResult,
};

/// Used as the receive timeout when periodic reports are disabled.
const IDLE_POLL: Duration = Duration::from_secs(3600);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let pattern = config.pattern();
    if pattern.sequential_run() <= 1 || pattern.total_repeats() <= 1 {
        warn!("a threshold of 1 or less matches every address");
    }

    let notifier = match config.telegram() {
        Some((token, chat_id)) => match start_notifier(token, chat_id, &config) {
            Ok(notifier) => {
                info!(chat_id, "telegram bot connected");
                Some(notifier)
            }
            Err(e) => {
                eprintln!("Telegram initialization failed: {}", e);
                process::exit(1);
            }
        },
        None => {
            if config.telegram_incomplete() {
                warn!("telegram needs both --token and --chat; notifications disabled");
            } else {
                info!("telegram not configured (pass --token and --chat)");
            }
            None
        }
    };

    let scheme = Arc::new(Bitcoin::new(config.network));
    let pool_config = config.pool_config();

    println!("Bitcoin Vanity Address Hunter");
    println!("=============================");
    println!("Scheme:         {}", scheme.name());
    println!(
        "Thresholds:     sequentrepeats={}, repeats={}, unique={}",
        pattern.sequential_run(),
        pattern.total_repeats(),
        pattern.unique_cap()
    );
    println!("Workers:        {}", pool_config.workers);
    println!("Channel:        {}", pool_config.channel_capacity);
    println!(
        "Telegram:       {}",
        if notifier.is_some() { "on" } else { "off" }
    );
    if config.count > 0 {
        println!("Target:         {} address(es)", config.count);
    }
    println!();

    let pool = match Dispatcher::spawn(
        scheme,
        pattern,
        pool_config,
        notifier.as_ref().map(Notifier::handle),
    ) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to start workers: {}", e);
            process::exit(1);
        }
    };

    ctrlc_handler(pool.stop_flag_clone());
    info!(workers = pool.num_workers(), "workers started");

    println!("Searching... (Press Ctrl+C to stop)\n");

    let mut progress = ProgressClock::new(config.report_interval, Instant::now());
    let mut found = 0;

    // Drain until the coordinator closes the channel, even after a stop,
    // so matches already produced are still printed.
    loop {
        match pool.wait_for_result(progress.timeout(Instant::now())) {
            Ok(result) => {
                found += 1;
                print_result(&result);

                if config.count > 0 && found == config.count && !pool.is_stopped() {
                    println!("\nTarget reached! Found {} address(es).", found);
                    pool.stop();
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        // Checked on every wakeup so a steady stream of matches cannot starve it.
        if progress.due(Instant::now()) && !pool.is_stopped() {
            print_progress(&pool);
        }
    }

    if pool.is_stopped() && (config.count == 0 || found < config.count) {
        println!("\nStopped by user.");
    }

    let total_keys = pool.total_keys();
    let elapsed = pool.elapsed();
    let rate = pool.keys_per_second();
    let report = pool.join();

    let failed = report.failed().count();
    if failed > 0 {
        error!(failed, "some workers stopped on errors");
    }

    println!("\n--- Final Statistics ---");
    println!("Total keys generated: {}", format_number(total_keys));
    println!("Total matches found:  {}", found);
    println!("Time elapsed:         {:.2}s", elapsed.as_secs_f64());
    println!("Average speed:        {}/s", format_number(rate as u64));

    if let Some(notifier) = notifier {
        info!("waiting for pending notifications");
        notifier.shutdown();
    }
}

fn start_notifier(token: &str, chat_id: i64, config: &Config) -> Result<Notifier, NotifyError> {
    let sink = TelegramSink::connect(token, chat_id)?;
    Notifier::spawn(Arc::new(sink), config.notify_workers, config.notify_queue)
}

/// Schedules the periodic progress line.
struct ProgressClock {
    interval: Option<Duration>,
    last: Instant,
}

impl ProgressClock {
    /// `secs == 0` disables reporting.
    fn new(secs: u64, now: Instant) -> Self {
        Self {
            interval: (secs > 0).then(|| Duration::from_secs(secs)),
            last: now,
        }
    }

    /// How long to wait for a result before the next report is due.
    fn timeout(&self, now: Instant) -> Duration {
        match self.interval {
            Some(interval) => interval.saturating_sub(now.saturating_duration_since(self.last)),
            None => IDLE_POLL,
        }
    }

    /// True once per elapsed interval.
    fn due(&mut self, now: Instant) -> bool {
        match self.interval {
            Some(interval) if now.saturating_duration_since(self.last) >= interval => {
                self.last = now;
                true
            }
            _ => false,
        }
    }
}

fn print_result(result: &VanityResult) {
    println!("{}", result);
}

fn print_progress(pool: &Dispatcher) {
    let keys = pool.total_keys();
    let rate = pool.keys_per_second();
    let elapsed = pool.elapsed().as_secs();

    println!(
        "[{:>6}s] Generated {} keys ({}/s), {} match(es)",
        elapsed,
        format_number(keys),
        format_number(rate as u64),
        pool.total_matches()
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler");
    }
}
