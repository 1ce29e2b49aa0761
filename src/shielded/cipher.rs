//! Payload encryption for shielded calls.
//!
//! The query pipeline only sees [`ShieldCipher`]. [`NodeKeyCipher`] is the
//! shipped scheme:
//!
//! ```text
//! client                                   node
//!   │── eth_getNodePublicKey ───────────────▶│
//!   │◀─────────────────────── node_pk (32) ──│
//!   │ eph_sk = random x25519
//!   │ k = HKDF-SHA256(x25519(eph_sk, node_pk), "IOEncryptionKeyV1")
//!   │── eth_call data = eph_pk ‖ nonce ‖ ChaCha20-Poly1305(k, calldata) ─▶│
//!   │◀──────────── result = nonce ‖ ChaCha20-Poly1305(k, returndata) ──────│
//! ```
//!
//! [`NodeKeyPair`] implements the node's half and backs the mock nodes in
//! the test suite.

use std::future::Future;
use std::time::Duration;

use alloy::primitives::Bytes;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::blockchain::client::NodeClient;
use crate::blockchain::types::Endpoint;
use crate::shielded::types::{DecryptionError, EncryptedEnvelope, EncryptionError, EphemeralKey};

/// HKDF info string binding derived keys to this envelope format.
pub const KEY_DERIVATION_INFO: &[u8] = b"IOEncryptionKeyV1";

/// Length of an x25519 public key on the wire.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of the AEAD nonce prefix.
pub const NONCE_LEN: usize = 12;

/// Length of the Poly1305 tag.
pub const TAG_LEN: usize = 16;

/// Encrypt/decrypt capability the query pipeline depends on.
///
/// Each `encrypt` yields a fresh key; `decrypt` takes it by value, which
/// makes reusing a key across queries a compile error.
pub trait ShieldCipher {
    /// Key material kept between `encrypt` and `decrypt`.
    type Key;

    fn encrypt(
        &self,
        endpoint: &Endpoint,
        plaintext: &[u8],
    ) -> impl Future<Output = Result<EncryptedEnvelope<Self::Key>, EncryptionError>>;

    fn decrypt(
        &self,
        endpoint: &Endpoint,
        response: &[u8],
        key: Self::Key,
    ) -> impl Future<Output = Result<Vec<u8>, DecryptionError>>;
}

/// x25519 + ChaCha20-Poly1305 against the node's published key.
#[derive(Debug, Clone)]
pub struct NodeKeyCipher {
    rpc_timeout: Duration,
}

impl NodeKeyCipher {
    pub fn new(rpc_timeout: Duration) -> Self {
        Self { rpc_timeout }
    }

    /// Encrypt for an already-known node key. No network access.
    pub fn seal_for_node(
        endpoint: &Endpoint,
        node_public_key: PublicKey,
        plaintext: &[u8],
    ) -> Result<EncryptedEnvelope, EncryptionError> {
        let secret = StaticSecret::random_from_rng(OsRng);
        let client_public = PublicKey::from(&secret);

        let key = derive_aead_key(&secret, &node_public_key).ok_or_else(|| {
            EncryptionError::MalformedNodeKey("key exchange produced a low-order point".into())
        })?;
        let sealed = seal(&key, plaintext).map_err(|_| EncryptionError::Seal)?;

        let mut data = Vec::with_capacity(PUBLIC_KEY_LEN + sealed.len());
        data.extend_from_slice(client_public.as_bytes());
        data.extend_from_slice(&sealed);

        Ok(EncryptedEnvelope::new(
            Bytes::from(data),
            EphemeralKey::new(secret, node_public_key, endpoint.clone()),
        ))
    }

    /// Open a node response with the key from the matching `seal_for_node`.
    pub fn open_response(
        endpoint: &Endpoint,
        response: &[u8],
        key: EphemeralKey,
    ) -> Result<Vec<u8>, DecryptionError> {
        if key.endpoint() != endpoint {
            return Err(DecryptionError::EndpointMismatch {
                expected: key.endpoint().to_string(),
                actual: endpoint.to_string(),
            });
        }

        let aead_key = derive_aead_key(key.secret(), key.node_public_key())
            .ok_or(DecryptionError::Authentication)?;
        open(&aead_key, response)
    }
}

impl ShieldCipher for NodeKeyCipher {
    type Key = EphemeralKey;

    async fn encrypt(
        &self,
        endpoint: &Endpoint,
        plaintext: &[u8],
    ) -> Result<EncryptedEnvelope, EncryptionError> {
        let client = NodeClient::connect(endpoint.clone(), self.rpc_timeout);
        let raw = client.node_public_key().await?;
        let node_public_key = parse_node_public_key(&raw)?;

        tracing::debug!(endpoint = %endpoint, "Fetched node public key");
        Self::seal_for_node(endpoint, node_public_key, plaintext)
    }

    async fn decrypt(
        &self,
        endpoint: &Endpoint,
        response: &[u8],
        key: EphemeralKey,
    ) -> Result<Vec<u8>, DecryptionError> {
        Self::open_response(endpoint, response, key)
    }
}

/// Node side of the envelope: opens requests and seals responses.
pub struct NodeKeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl NodeKeyPair {
    pub fn generate() -> Self {
        Self::from_secret(StaticSecret::random_from_rng(OsRng))
    }

    pub fn from_secret(secret: StaticSecret) -> Self {
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Split an encrypted data field into the client key and plaintext.
    pub fn open_request(&self, data: &[u8]) -> Result<(PublicKey, Vec<u8>), DecryptionError> {
        if data.len() < PUBLIC_KEY_LEN + NONCE_LEN + TAG_LEN {
            return Err(DecryptionError::Malformed(format!(
                "request of {} bytes is shorter than the envelope header",
                data.len()
            )));
        }
        let (client_key, sealed) = data.split_at(PUBLIC_KEY_LEN);
        let client_public = PublicKey::from(to_key_bytes(client_key));

        let key = derive_aead_key(&self.secret, &client_public)
            .ok_or(DecryptionError::Authentication)?;
        Ok((client_public, open(&key, sealed)?))
    }

    /// Encrypt return data for the client that sent `client_public`.
    pub fn seal_response(
        &self,
        client_public: &PublicKey,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, EncryptionError> {
        let key = derive_aead_key(&self.secret, client_public).ok_or_else(|| {
            EncryptionError::MalformedNodeKey("client key is a low-order point".into())
        })?;
        seal(&key, plaintext).map_err(|_| EncryptionError::Seal)
    }
}

/// Validate the bytes served by `eth_getNodePublicKey`.
pub fn parse_node_public_key(raw: &[u8]) -> Result<PublicKey, EncryptionError> {
    if raw.len() != PUBLIC_KEY_LEN {
        return Err(EncryptionError::MalformedNodeKey(format!(
            "expected {} bytes, got {}",
            PUBLIC_KEY_LEN,
            raw.len()
        )));
    }
    if raw.iter().all(|b| *b == 0) {
        return Err(EncryptionError::MalformedNodeKey("all-zero key".into()));
    }
    Ok(PublicKey::from(to_key_bytes(raw)))
}

fn to_key_bytes(raw: &[u8]) -> [u8; PUBLIC_KEY_LEN] {
    let mut out = [0u8; PUBLIC_KEY_LEN];
    out.copy_from_slice(&raw[..PUBLIC_KEY_LEN]);
    out
}

/// `None` when the exchange is non-contributory (low-order peer key).
fn derive_aead_key(secret: &StaticSecret, their_public: &PublicKey) -> Option<[u8; 32]> {
    let shared = secret.diffie_hellman(their_public);
    if !shared.was_contributory() {
        return None;
    }

    let hk = Hkdf::<Sha256>::new(None, shared.as_bytes());
    let mut key = [0u8; 32];
    hk.expand(KEY_DERIVATION_INFO, &mut key).ok()?;
    Some(key)
}

/// Returns `nonce ‖ ciphertext ‖ tag`.
fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>, chacha20poly1305::aead::Error> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let ciphertext = cipher.encrypt(Nonce::from_slice(&nonce), plaintext)?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

fn open(key: &[u8; 32], data: &[u8]) -> Result<Vec<u8>, DecryptionError> {
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(DecryptionError::Malformed(format!(
            "{} bytes is shorter than nonce and tag",
            data.len()
        )));
    }
    let (nonce, ciphertext) = data.split_at(NONCE_LEN);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| DecryptionError::Authentication)
}
