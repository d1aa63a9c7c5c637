//! # btc_vanity
//!
//! Bitcoin vanity address hunter. Generates random keys and keeps the
//! addresses that look repetitive.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation, address derivation and WIF export
//! - `matcher`: Address classification rules
//! - `worker`: Parallel workers and the dispatcher owning the result channel
//! - `notify`: Best-effort delivery of matches (Telegram)
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod notify;
pub mod worker;

pub use config::Config;
pub use crypto::{Address, AddressScheme, Bitcoin, Keypair, Network};
pub use matcher::{MarkerKind, Pattern};
pub use notify::{Notifier, NotifySink, TelegramSink};
pub use worker::{Dispatcher, PoolConfig, PoolReport, VanityResult};
