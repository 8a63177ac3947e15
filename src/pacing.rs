use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::response::Rate;

/// Share of the time left in the rate window that one request may use.
///
/// The window is split across `remaining + 1` slots, so with no quota left
/// the whole window is waited out. A window that already reset yields zero.
pub(crate) fn interval(rate: &Rate, now: SystemTime) -> Duration {
    let reset = if rate.reset <= 0 {
        UNIX_EPOCH
    } else {
        UNIX_EPOCH + Duration::from_secs(rate.reset.unsigned_abs())
    };

    let until_reset = reset.duration_since(now).unwrap_or(Duration::ZERO);
    until_reset / rate.remaining.saturating_add(1)
}

/// Next instant a request may be issued; never earlier than `previous`.
pub(crate) fn next_allowed(
    previous: Option<SystemTime>,
    rate: &Rate,
    now: SystemTime,
) -> SystemTime {
    let candidate = now + interval(rate, now);
    match previous {
        Some(prev) if prev > candidate => prev,
        _ => candidate,
    }
}

/// How long to wait before a request may go out.
pub(crate) fn wait(next_allowed: Option<SystemTime>, now: SystemTime) -> Option<Duration> {
    next_allowed
        .and_then(|at| at.duration_since(now).ok())
        .filter(|d| !d.is_zero())
}
