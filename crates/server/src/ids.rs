//! Unique identifier generation.
//!
//! Record identifiers are snowflake-style i64s: roughly time-ordered, unique
//! across restarts, and safe to hand out before the insert commits. The
//! service only cares about the [`IdGenerator`] contract; anything that can
//! mint positive 64-bit integers (a database sequence, a dedicated id
//! service) can be swapped in.

use std::sync::atomic::{AtomicI64, Ordering};

use rand::Rng;

/// Which identifier space to draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Customer,
}

/// Produces globally unique, positive 64-bit identifiers.
///
/// A non-positive return value is the failure sentinel: the generator could
/// not produce an identifier (clock trouble, exhaustion) and the current
/// request must not proceed.
pub trait IdGenerator: Send + Sync {
    fn next(&self, kind: IdKind) -> i64;
}

/// Snowflake-style identifier generator.
///
/// Layout: 41 bits of milliseconds since 2020-01-01 UTC (~69 years), 10 bits
/// of node id, 12 bits of per-process sequence. The sequence starts at a
/// random offset so two restarts within the same millisecond do not collide.
/// The primary-key constraint on the customer table is the ultimate backstop.
pub struct SnowflakeIdGenerator {
    node: i64,
    sequence: AtomicI64,
}

/// Custom epoch: 2020-01-01 00:00:00 UTC, in milliseconds.
const EPOCH_MS: i64 = 1_577_836_800_000;

const TIMESTAMP_BITS: i64 = 0x1FF_FFFF_FFFF; // 41 bits
const NODE_MASK: i64 = 0x3FF; // 10 bits
const SEQUENCE_MASK: i64 = 0xFFF; // 12 bits

impl SnowflakeIdGenerator {
    /// Create a generator for the given node id (only the low 10 bits are
    /// used).
    #[must_use]
    pub fn new(node_id: u16) -> Self {
        Self {
            node: i64::from(node_id) & NODE_MASK,
            sequence: AtomicI64::new(rand::rng().random_range(0..=SEQUENCE_MASK)),
        }
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

impl IdGenerator for SnowflakeIdGenerator {
    fn next(&self, _kind: IdKind) -> i64 {
        let elapsed = Self::now_ms() - EPOCH_MS;
        if elapsed <= 0 {
            // Clock reads before the epoch; signal failure instead of
            // handing out a colliding or negative id.
            return 0;
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) & SEQUENCE_MASK;
        ((elapsed & TIMESTAMP_BITS) << 22) | (self.node << 12) | sequence
    }
}
