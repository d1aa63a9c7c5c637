//! Runtime configuration for the vanity address hunter.

use clap::Parser;

use crate::crypto::Network;
use crate::matcher::Pattern;
use crate::worker::{PoolConfig, DEFAULT_REPORT_EVERY};

/// Bitcoin vanity address hunter
///
/// Reports addresses with a long run of one character, one very frequent
/// character, or very few distinct characters.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Minimum run of one character repeated back to back
    #[arg(long = "sequentrepeats", default_value = "9")]
    pub sequent_repeats: usize,

    /// Minimum occurrences of one character anywhere in the address
    #[arg(long, default_value = "14")]
    pub repeats: usize,

    /// Maximum number of distinct characters
    #[arg(long, default_value = "10")]
    pub unique: usize,

    /// Number of worker threads (0 = number of CPU cores)
    #[arg(short = 'w', long, default_value = "16")]
    pub workers: usize,

    /// Result channel capacity (default: worker count)
    #[arg(long)]
    pub channel_capacity: Option<usize>,

    /// Telegram bot token
    #[arg(long, default_value = "")]
    pub token: String,

    /// Telegram chat ID to send matches to
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub chat: i64,

    /// Network: mainnet or testnet
    #[arg(long, default_value = "mainnet")]
    pub network: Network,

    /// Stop after finding N addresses (0 = run forever)
    #[arg(short = 'n', long, default_value = "0")]
    pub count: usize,

    /// Progress report interval in seconds (0 = disabled)
    #[arg(short = 'r', long, default_value = "60")]
    pub report_interval: u64,

    /// Attempts between progress checkpoints in the log
    #[arg(long, default_value_t = DEFAULT_REPORT_EVERY)]
    pub report_every: u64,

    /// Threads delivering notifications
    #[arg(long, default_value = "2")]
    pub notify_workers: usize,

    /// Notifications queued before new ones are dropped
    #[arg(long, default_value = "64")]
    pub notify_queue: usize,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }

    /// Returns the result channel capacity, defaulting to the worker count
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity.unwrap_or_else(|| self.worker_count())
    }

    pub fn pattern(&self) -> Pattern {
        Pattern::new(self.sequent_repeats, self.repeats, self.unique)
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            workers: self.worker_count(),
            channel_capacity: self.channel_capacity(),
            report_every: self.report_every,
        }
    }

    /// Telegram credentials, present only when both token and chat are set.
    pub fn telegram(&self) -> Option<(&str, i64)> {
        if !self.token.is_empty() && self.chat != 0 {
            Some((self.token.as_str(), self.chat))
        } else {
            None
        }
    }

    /// True if exactly one of token and chat was given.
    pub fn telegram_incomplete(&self) -> bool {
        self.token.is_empty() != (self.chat == 0)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_every == 0 {
            return Err(ConfigError::InvalidValue(
                "--report-every must be greater than zero".into(),
            ));
        }

        if self.telegram().is_some() {
            if self.notify_workers == 0 {
                return Err(ConfigError::InvalidValue(
                    "--notify-workers must be greater than zero when telegram is enabled".into(),
                ));
            }
            if self.notify_queue == 0 {
                return Err(ConfigError::InvalidValue(
                    "--notify-queue must be greater than zero when telegram is enabled".into(),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
