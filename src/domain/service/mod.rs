// src/domain/service/mod.rs
// Domain service interfaces

use chrono::NaiveDateTime;

/// Wall clock used to stamp successful refreshes.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
