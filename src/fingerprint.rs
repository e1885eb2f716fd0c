//! Payload fingerprinting.
//!
//! Every payload is reduced to a fixed 64-bit digest before embedding: the
//! high-order eight bytes of SHA-256 over the payload with a baked-in salt
//! appended. Both ends of a watermark exchange must share the salt, since it
//! also seeds the block scheduler through the digest.

use sha2::{Digest, Sha256};

/// Salt appended to every payload before hashing. Fixed at build time.
pub const MODULE_SALT: &str = "veilmark-fingerprint-salt-v1";

/// Number of fingerprint bits carried by an image.
pub const PAYLOAD_BITS: usize = 64;

/// Fingerprint length in bytes.
pub const DIGEST_BYTES: usize = PAYLOAD_BITS / 8;

/// Derive the 64-bit fingerprint of a payload.
///
/// Computes SHA-256 over `payload || MODULE_SALT` and keeps the first eight
/// bytes. The empty payload hashes like any other.
pub fn derive_digest(payload: &str) -> [u8; DIGEST_BYTES] {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(MODULE_SALT.as_bytes());
    let full = hasher.finalize();

    let mut digest = [0u8; DIGEST_BYTES];
    digest.copy_from_slice(&full[..DIGEST_BYTES]);
    digest
}

/// Expand a digest into individual bits, MSB first within each byte.
pub fn digest_to_bits(digest: &[u8; DIGEST_BYTES]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(PAYLOAD_BITS);
    for i in 0..PAYLOAD_BITS {
        bits.push((digest[i / 8] >> (7 - (i % 8))) & 1);
    }
    bits
}

/// Pack bits (MSB first within each byte) back into digest bytes.
///
/// Bits beyond [`PAYLOAD_BITS`] are ignored; missing bits read as zero.
pub fn bits_to_digest(bits: &[u8]) -> [u8; DIGEST_BYTES] {
    let mut digest = [0u8; DIGEST_BYTES];
    for (i, &bit) in bits.iter().take(PAYLOAD_BITS).enumerate() {
        if bit != 0 {
            digest[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    digest
}
