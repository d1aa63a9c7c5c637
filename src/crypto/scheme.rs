//! Bitcoin implementation of [`AddressScheme`].

use secp256k1::{All, Secp256k1};

use super::{Address, AddressScheme, CryptoError, Keypair, Network};

/// Compressed P2PKH addresses with WIF secrets.
///
/// Holds one secp256k1 context shared by every worker.
pub struct Bitcoin {
    secp: Secp256k1<All>,
    network: Network,
}

impl Bitcoin {
    pub fn new(network: Network) -> Self {
        Self {
            secp: Secp256k1::new(),
            network,
        }
    }
}

impl Default for Bitcoin {
    fn default() -> Self {
        Self::new(Network::Mainnet)
    }
}

impl AddressScheme for Bitcoin {
    type Keypair = Keypair;

    fn name(&self) -> &str {
        match self.network {
            Network::Mainnet => "bitcoin p2pkh",
            Network::Testnet => "bitcoin p2pkh (testnet)",
        }
    }

    #[inline]
    fn generate(&self) -> Result<Keypair, CryptoError> {
        Ok(Keypair::generate(&self.secp))
    }

    #[inline]
    fn derive_address(&self, keypair: &Keypair) -> Result<Address, CryptoError> {
        Ok(keypair.p2pkh_address(self.network))
    }

    fn encode_secret(&self, keypair: &Keypair) -> Result<String, CryptoError> {
        Ok(keypair.to_wif(self.network))
    }
}
