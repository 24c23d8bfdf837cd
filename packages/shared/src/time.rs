//! Time-related utilities with clock abstraction for testability.
//!
//! The chat protocol carries ISO 8601 / RFC 3339 timestamps on the wire, so
//! everything here works in UTC. Deadline arithmetic (join cooldown, reconnect
//! backoff) uses Unix milliseconds.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Get current Unix timestamp in UTC (milliseconds)
    fn now_millis(&self) -> i64;

    /// Get current time as an RFC 3339 UTC string
    fn now_rfc3339(&self) -> String;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn now_rfc3339(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Fixed clock implementation for testing (returns a controllable time)
///
/// Unlike the system clock, the fixed clock can be advanced manually so that
/// deadline-driven behavior (cooldowns, backoff) is testable without sleeping.
#[derive(Debug)]
pub struct FixedClock {
    fixed_millis: AtomicI64,
}

impl FixedClock {
    /// Create a new fixed clock with the given timestamp
    pub fn new(fixed_time_millis: i64) -> Self {
        Self {
            fixed_millis: AtomicI64::new(fixed_time_millis),
        }
    }

    /// Advance the clock by the given number of milliseconds
    pub fn advance(&self, delta_millis: i64) {
        self.fixed_millis.fetch_add(delta_millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.fixed_millis.load(Ordering::SeqCst)
    }

    fn now_rfc3339(&self) -> String {
        let millis = self.now_millis();
        let dt = Utc.timestamp_millis_opt(millis).unwrap();
        dt.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Convert an RFC 3339 timestamp to local wall-clock time ("HH:MM") for display.
///
/// Returns an empty string when the input is missing or unparseable, so the
/// caller never has to special-case bad server timestamps.
pub fn format_clock_time(rfc3339: &str) -> String {
    match DateTime::parse_from_rfc3339(rfc3339) {
        Ok(dt) => dt.with_timezone(&Local).format("%H:%M").to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_non_zero_timestamp() {
        // テスト項目: SystemClock が 0 以外のタイムスタンプを返す
        // given (前提条件):
        let clock = SystemClock;

        // when (操作):
        let timestamp = clock.now_millis();

        // then (期待する結果):
        assert!(timestamp > 0);
    }

    #[test]
    fn test_system_clock_rfc3339_is_utc() {
        // テスト項目: SystemClock の RFC 3339 文字列が UTC 表記である
        // given (前提条件):
        let clock = SystemClock;

        // when (操作):
        let rfc3339 = clock.now_rfc3339();

        // then (期待する結果):
        assert!(rfc3339.ends_with('Z'));
    }

    #[test]
    fn test_fixed_clock_returns_fixed_timestamp() {
        // テスト項目: FixedClock が固定されたタイムスタンプを返す
        // given (前提条件):
        let fixed_time = 1234567890123;
        let clock = FixedClock::new(fixed_time);

        // when (操作):
        let timestamp = clock.now_millis();

        // then (期待する結果):
        assert_eq!(timestamp, fixed_time);
    }

    #[test]
    fn test_fixed_clock_advance_moves_time_forward() {
        // テスト項目: FixedClock の advance で時刻が前進する
        // given (前提条件):
        let clock = FixedClock::new(1_000);

        // when (操作):
        clock.advance(3_000);

        // then (期待する結果):
        assert_eq!(clock.now_millis(), 4_000);
    }

    #[test]
    fn test_fixed_clock_rfc3339_matches_millis() {
        // テスト項目: FixedClock の RFC 3339 文字列がミリ秒値と一致する
        // given (前提条件):
        // 2023-01-01 00:00:00 UTC in milliseconds
        let clock = FixedClock::new(1672531200000);

        // when (操作):
        let rfc3339 = clock.now_rfc3339();

        // then (期待する結果):
        assert!(rfc3339.starts_with("2023-01-01T00:00:00"));
    }

    #[test]
    fn test_format_clock_time_renders_hours_and_minutes() {
        // テスト項目: RFC 3339 タイムスタンプが "HH:MM" 形式に変換される
        // given (前提条件):
        let rfc3339 = "2023-01-01T12:34:56.000Z";

        // when (操作):
        let result = format_clock_time(rfc3339);

        // then (期待する結果):
        assert_eq!(result.len(), 5);
        assert!(result.contains(':'));
    }

    #[test]
    fn test_format_clock_time_with_invalid_input() {
        // テスト項目: 不正なタイムスタンプの場合は空文字列を返す
        // given (前提条件):
        let not_a_timestamp = "yesterday";

        // when (操作):
        let result = format_clock_time(not_a_timestamp);

        // then (期待する結果):
        assert_eq!(result, "");
    }
}
