use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt::Write;

/// Source of randomness for relay IPs, ESMTP ids and Message-IDs.
///
/// Implementations must be safe to share between threads; the builders only
/// ever hold a shared reference.
pub trait RandomSource: Send + Sync {
    fn next_u32(&self) -> u32;
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_u32(&self) -> u32 {
        OsRng.next_u32()
    }

    fn fill_bytes(&self, dest: &mut [u8]) {
        OsRng.fill_bytes(dest)
    }
}

/// Lowercase hex string of `len` random bytes (so `2 * len` digits).
pub fn random_hex(source: &dyn RandomSource, len: usize) -> String {
    let mut bytes = vec![0u8; len];
    source.fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(len * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
