//! Injectable time source.

use chrono::{DateTime, Utc};

/// Supplies the current time to routing, so `now()` sharding values are
/// testable and consistent within one statement.
pub trait TimeService: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeService;

impl TimeService for SystemTimeService {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
