use chrono::Utc;

/// Unix timestamp marking the start of the lookback window ending at `now`.
pub fn occurred_after(now: i64, lookback_seconds: u64) -> i64 {
    let lookback = i64::try_from(lookback_seconds).unwrap_or(i64::MAX);
    now.saturating_sub(lookback)
}

pub fn window_start(lookback_seconds: u64) -> i64 {
    occurred_after(Utc::now().timestamp(), lookback_seconds)
}
