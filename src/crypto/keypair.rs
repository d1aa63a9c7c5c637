//! secp256k1 keypair generation.

use secp256k1::{PublicKey, Secp256k1, SecretKey, Signing};

use super::address::{base58check, hash160, Address, Network};
use super::CryptoError;

/// A secp256k1 keypair. Owned by the worker iteration that created it.
#[derive(Debug, Clone)]
pub struct Keypair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Keypair {
    /// Generates a new random keypair.
    ///
    /// Uses the thread-local cryptographically secure RNG.
    #[inline]
    pub fn generate<C: Signing>(secp: &Secp256k1<C>) -> Self {
        let (secret_key, public_key) = secp.generate_keypair(&mut rand::thread_rng());
        Self {
            secret_key,
            public_key,
        }
    }

    /// Rebuilds a keypair from raw secret bytes.
    pub fn from_secret_bytes<C: Signing>(
        secp: &Secp256k1<C>,
        secret_bytes: &[u8; 32],
    ) -> Result<Self, CryptoError> {
        let secret_key = SecretKey::from_slice(secret_bytes)?;
        let public_key = PublicKey::from_secret_key(secp, &secret_key);
        Ok(Self {
            secret_key,
            public_key,
        })
    }

    /// HASH160 of the compressed (33 byte) public key.
    #[inline]
    pub fn pubkey_hash(&self) -> [u8; 20] {
        hash160(&self.public_key.serialize())
    }

    /// Compressed P2PKH address for this key.
    pub fn p2pkh_address(&self, network: Network) -> Address {
        Address::p2pkh(&self.pubkey_hash(), network)
    }

    /// Wallet Import Format with the compressed-key flag set.
    pub fn to_wif(&self, network: Network) -> String {
        let mut payload = [0u8; 33];
        payload[..32].copy_from_slice(&self.secret_key.secret_bytes());
        payload[32] = 0x01;
        base58check(network.wif_version(), &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_one() -> Keypair {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        Keypair::from_secret_bytes(&Secp256k1::new(), &secret).unwrap()
    }

    #[test]
    fn test_keypair_generation() {
        let secp = Secp256k1::new();
        let a = Keypair::generate(&secp);
        let b = Keypair::generate(&secp);
        assert_eq!(a.to_wif(Network::Mainnet).len(), 52);
        assert_ne!(a.to_wif(Network::Mainnet), b.to_wif(Network::Mainnet));
    }

    #[test]
    fn test_known_vector() {
        // Private key = 1
        let keypair = key_one();
        assert_eq!(
            hex::encode(keypair.pubkey_hash()),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
        assert_eq!(
            keypair.p2pkh_address(Network::Mainnet).as_str(),
            "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"
        );
        assert_eq!(
            keypair.to_wif(Network::Mainnet),
            "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
        );
    }

    #[test]
    fn test_testnet_prefixes() {
        let keypair = key_one();
        let addr = keypair.p2pkh_address(Network::Testnet);
        assert!(addr.as_str().starts_with('m') || addr.as_str().starts_with('n'));
        assert!(keypair.to_wif(Network::Testnet).starts_with('c'));
    }

    #[test]
    fn test_zero_secret_rejected() {
        let secp = Secp256k1::new();
        assert!(Keypair::from_secret_bytes(&secp, &[0u8; 32]).is_err());
    }
}
