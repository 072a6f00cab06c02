//! Random nonces for time-stamp requests

use rand::Rng;

/// Default nonce length in bytes, before sign padding
pub const DEFAULT_NONCE_LEN: usize = 8;

/// Fill `len` bytes from the thread-local CSPRNG
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(bytes.as_mut_slice());
    bytes
}

/// Generate a nonce suitable for a DER INTEGER
///
/// A 0x00 octet is prepended when the high bit of the first random octet is
/// set, so the value is never negative.
pub fn generate_nonce(len: usize) -> Vec<u8> {
    let random = random_bytes(len.max(1));
    if random[0] & 0x80 != 0 {
        let mut padded = Vec::with_capacity(random.len() + 1);
        padded.push(0x00);
        padded.extend_from_slice(&random);
        padded
    } else {
        random
    }
}
