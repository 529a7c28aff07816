use time::{OffsetDateTime, PrimitiveDateTime};

/// A source of creation timestamps for new listings.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current wall-clock time without an offset.
    fn now(&self) -> PrimitiveDateTime;
}

/// A clock that reads the system time in the local offset.
///
/// Falls back to UTC when the local offset cannot be determined, which the
/// `time` crate refuses to do in multi-threaded processes on some platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

/// A clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub PrimitiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        self.0
    }
}
