//! Cryptographic capabilities consumed by the search pipeline.
//!
//! This module provides:
//! - The [`AddressScheme`] seam: key generation, address derivation, secret export
//! - Bitcoin P2PKH addresses and WIF secrets over secp256k1
//! - Keypair management

mod address;
mod keypair;
mod scheme;

pub use address::{hash160, Address, Network};
pub use keypair::Keypair;
pub use scheme::Bitcoin;

/// Errors raised by an [`AddressScheme`].
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    #[error("address derivation failed: {0}")]
    AddressDerivation(String),
    #[error("secret encoding failed: {0}")]
    SecretEncoding(String),
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(#[from] secp256k1::Error),
}

/// The three external capabilities a worker needs.
///
/// Implementations must be shareable across worker threads. Every call is
/// synchronous and is expected to be CPU-bound.
pub trait AddressScheme: Send + Sync {
    /// Keypair produced by [`generate`](AddressScheme::generate).
    type Keypair: Send;

    /// Human readable name shown in the startup banner.
    fn name(&self) -> &str;

    /// Produces a fresh, uniformly random keypair.
    fn generate(&self) -> Result<Self::Keypair, CryptoError>;

    /// Maps the keypair's public key to its canonical address.
    fn derive_address(&self, keypair: &Self::Keypair) -> Result<Address, CryptoError>;

    /// Serializes the private key into its importable string form.
    fn encode_secret(&self, keypair: &Self::Keypair) -> Result<String, CryptoError>;
}
