//! Hash primitives: a cheap concurrent checksum and an expensive exclusive digest.

use md5::{Digest, Md5};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::HashLatency;
use crate::pipeline::HashError;

/// The two primitives the signing stages are built on.
///
/// `cheap` may be called from any number of threads at once. `expensive` must be
/// serialized by the caller through an [`ExclusiveToken`](crate::engine::ExclusiveToken);
/// implementations may report a violation as [`HashError::Overheated`].
pub trait HashPrimitives: Send + Sync {
    fn cheap(&self, text: &str) -> String;
    fn expensive(&self, text: &str) -> Result<String, HashError>;
}

/// CRC-32 (IEEE) of `text`, as an unsigned decimal string.
pub fn crc32_decimal(text: &str) -> String {
    crc32fast::hash(text.as_bytes()).to_string()
}

/// MD5 of `text`, as lowercase hex.
pub fn md5_hex(text: &str) -> String {
    hex::encode(Md5::digest(text.as_bytes()))
}

/// Default primitives: CRC-32 checksum and MD5 digest, with optional simulated latency.
/// The digest side refuses overlapping calls, like the rate-limited service it stands in for.
#[derive(Debug, Default)]
pub struct Signers {
    latency: HashLatency,
    digest_busy: AtomicBool,
}

impl Signers {
    pub fn new(latency: HashLatency) -> Self {
        Self {
            latency,
            digest_busy: AtomicBool::new(false),
        }
    }
}

/// Clears the busy flag when the digest call returns.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl HashPrimitives for Signers {
    fn cheap(&self, text: &str) -> String {
        if !self.latency.cheap.is_zero() {
            thread::sleep(self.latency.cheap);
        }
        crc32_decimal(text)
    }

    fn expensive(&self, text: &str) -> Result<String, HashError> {
        if self.digest_busy.swap(true, Ordering::AcqRel) {
            return Err(HashError::Overheated);
        }
        let _busy = BusyGuard(&self.digest_busy);
        if !self.latency.expensive.is_zero() {
            thread::sleep(self.latency.expensive);
        }
        Ok(md5_hex(text))
    }
}
