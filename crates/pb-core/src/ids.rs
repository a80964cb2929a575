//! Paste identifier generation.

use crate::traits::IdGenerator;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use uuid::Uuid;

pub const MIN_ID_LENGTH: usize = 4;
/// A v4 UUID encodes to 22 characters; the tail carries version bits.
pub const MAX_ID_LENGTH: usize = 21;

/// URL-safe ids (`A-Za-z0-9-_`) cut from the base64 form of a random UUID.
#[derive(Debug, Clone, Copy)]
pub struct UuidIdGenerator {
    length: usize,
}

impl UuidIdGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(MIN_ID_LENGTH, MAX_ID_LENGTH),
        }
    }
}

impl Default for UuidIdGenerator {
    fn default() -> Self {
        Self::new(8)
    }
}

impl IdGenerator for UuidIdGenerator {
    fn generate(&self) -> String {
        let mut encoded = URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes());
        encoded.truncate(self.length);
        encoded
    }
}
