//! Centralized logging for the VDP model and blit routines.
//!
//! # Architecture
//!
//! - **LogConfig**: process-wide configuration held in atomics
//! - **LogLevel**: Off < Error < Warn < Info < Debug < Trace
//! - **LogCategory**: VRAM, planes, DMA transfers, asset loading, blits, stubs
//! - **log()**: single entry point, lazily formats and rate limits
//!
//! A category with its own level ignores the global level. Messages go to
//! stderr, or to a file written by a background thread once
//! [`LogConfig::set_log_file`] has been called.
//!
//! # Usage
//!
//! ```rust
//! use mdflip_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Dma, LogLevel::Debug, || {
//!     format!("DMA: {} tiles to VRAM index {}", 12, 0x100)
//! });
//! ```

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

const CATEGORY_COUNT: usize = 5;

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for the different video components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Tile memory contents (pattern writes, wrap-around)
    Vram,
    /// Plane name table writes
    Plane,
    /// Bulk transfers into VRAM
    Dma,
    /// Image asset loading and validation
    Asset,
    /// Blit routines (placement, skips)
    Blit,
}

impl LogCategory {
    pub const ALL: [LogCategory; CATEGORY_COUNT] = [
        LogCategory::Vram,
        LogCategory::Plane,
        LogCategory::Dma,
        LogCategory::Asset,
        LogCategory::Blit,
    ];

    fn index(self) -> usize {
        match self {
            LogCategory::Vram => 0,
            LogCategory::Plane => 1,
            LogCategory::Dma => 2,
            LogCategory::Asset => 3,
            LogCategory::Blit => 4,
        }
    }
}

/// Per-category sliding-window state
#[derive(Default)]
struct Window {
    timestamps: VecDeque<Instant>,
    dropped: usize,
    last_drop_report: Option<Instant>,
}

/// Caps the number of messages per category per second.
///
/// Dropped messages are counted and reported at most once per second, either
/// alongside the next allowed message or on their own.
struct RateLimiter {
    max_per_second: AtomicUsize,
    window_duration: Duration,
    windows: Mutex<[Window; CATEGORY_COUNT]>,
}

impl RateLimiter {
    fn new(max_per_second: usize) -> Self {
        Self {
            max_per_second: AtomicUsize::new(max_per_second),
            window_duration: Duration::from_secs(1),
            windows: Mutex::new(Default::default()),
        }
    }

    /// Returns (allowed, dropped_count) where dropped_count is Some(n) if drops should be reported
    fn should_allow(&self, category: LogCategory) -> (bool, Option<usize>) {
        self.should_allow_at(category, Instant::now())
    }

    fn should_allow_at(&self, category: LogCategory, now: Instant) -> (bool, Option<usize>) {
        let mut windows = self.windows.lock().unwrap();
        let window = &mut windows[category.index()];

        while let Some(&front) = window.timestamps.front() {
            if now.duration_since(front) > self.window_duration {
                window.timestamps.pop_front();
            } else {
                break;
            }
        }

        let max = self.max_per_second.load(Ordering::Relaxed);
        if window.timestamps.len() < max {
            window.timestamps.push_back(now);

            if window.dropped > 0 {
                let dropped = std::mem::take(&mut window.dropped);
                window.last_drop_report = Some(now);
                return (true, Some(dropped));
            }
            return (true, None);
        }

        window.dropped += 1;
        let report_due = match window.last_drop_report {
            None => true,
            Some(last) => now.duration_since(last) >= self.window_duration,
        };
        if report_due {
            let dropped = std::mem::take(&mut window.dropped);
            window.last_drop_report = Some(now);
            (false, Some(dropped))
        } else {
            (false, None)
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    global_level: AtomicU8,
    levels: [AtomicU8; CATEGORY_COUNT],
    /// Set while a background file writer is running
    log_sender: Mutex<Option<Sender<String>>>,
    rate_limiter: RateLimiter,
}

impl LogConfig {
    /// Create a new LogConfig with all logging disabled and a 60 messages/second limit
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            levels: Default::default(),
            log_sender: Mutex::new(None),
            rate_limiter: RateLimiter::new(60),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    /// Set log level for a specific category (Off falls back to the global level)
    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.levels[category.index()].load(Ordering::Relaxed))
    }

    /// Check if a message should be logged for the given category and level
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        match self.get_level(category) {
            LogLevel::Off => level <= self.get_global_level(),
            category_level => level <= category_level,
        }
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }

    /// Set the maximum messages per second per category
    pub fn set_rate_limit(&self, max_logs_per_second: usize) {
        self.rate_limiter
            .max_per_second
            .store(max_logs_per_second, Ordering::Relaxed);
    }

    pub fn get_rate_limit(&self) -> usize {
        self.rate_limiter.max_per_second.load(Ordering::Relaxed)
    }

    /// Route output to a file.
    ///
    /// A background thread owns the file so that callers never block on I/O.
    /// Calling this again replaces the previous writer.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();

        thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                while let Ok(message) = receiver.recv() {
                    // Logging must never take the process down
                    let _ = writeln!(file, "{}", message);
                    let _ = file.flush();
                }
            })?;

        *self.log_sender.lock().unwrap() = Some(sender);
        Ok(())
    }

    /// Stop logging to file; the writer thread exits once its channel closes
    pub fn clear_log_file(&self) {
        *self.log_sender.lock().unwrap() = None;
    }

    fn write_message(&self, message: String) {
        let log_sender = self.log_sender.lock().unwrap();
        match log_sender.as_ref() {
            Some(sender) => {
                if let Err(err) = sender.send(message) {
                    eprintln!("{}", err.0);
                }
            }
            None => eprintln!("{}", message),
        }
    }
}

/// Log a message with the specified category and level
///
/// `message_fn` only runs when the category/level is enabled and the rate
/// limiter lets the message through, so formatting is free when disabled.
///
/// # Examples
///
/// ```rust
/// use mdflip_core::logging::{log, LogCategory, LogLevel};
///
/// log(LogCategory::Plane, LogLevel::Trace, || {
///     format!("Plane A ({}, {}) = {:04X}", 3, 4, 0x8805)
/// });
/// ```
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let (allowed, dropped) = config.rate_limiter.should_allow(category);
    if let Some(count) = dropped.filter(|&n| n > 0) {
        config.write_message(format!(
            "[{:?}] WARNING: Rate limit exceeded, {} log message(s) dropped in the last second",
            category, count
        ));
    }

    if allowed {
        config.write_message(message_fn());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("OFF"), Some(LogLevel::Off));
        assert_eq!(LogLevel::from_str("err"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_str("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("3"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("TRACE"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_str("verbose"), None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Off < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_category_level_overrides_global() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Error);
        config.set_level(LogCategory::Dma, LogLevel::Debug);

        assert!(config.should_log(LogCategory::Dma, LogLevel::Debug));
        assert!(!config.should_log(LogCategory::Dma, LogLevel::Trace));

        // Plane has no level of its own and follows the global one
        assert!(config.should_log(LogCategory::Plane, LogLevel::Error));
        assert!(!config.should_log(LogCategory::Plane, LogLevel::Warn));
    }

    #[test]
    fn test_off_messages_never_log() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        assert!(!config.should_log(LogCategory::Blit, LogLevel::Off));
    }

    #[test]
    fn test_reset() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        config.set_level(LogCategory::Vram, LogLevel::Debug);
        config.set_level(LogCategory::Asset, LogLevel::Info);

        config.reset();

        assert_eq!(config.get_global_level(), LogLevel::Off);
        for category in LogCategory::ALL {
            assert_eq!(config.get_level(category), LogLevel::Off);
        }
    }

    #[test]
    fn test_rate_limit_setting() {
        let config = LogConfig::new();
        assert_eq!(config.get_rate_limit(), 60);
        config.set_rate_limit(5);
        assert_eq!(config.get_rate_limit(), 5);
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit_per_category() {
        let limiter = RateLimiter::new(3);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.should_allow_at(LogCategory::Plane, now).0);
        }
        assert!(!limiter.should_allow_at(LogCategory::Plane, now).0);

        // Other categories keep their own budget
        assert!(limiter.should_allow_at(LogCategory::Dma, now).0);
    }

    #[test]
    fn test_rate_limiter_window_slides_and_reports_drops() {
        let limiter = RateLimiter::new(2);
        let start = Instant::now();

        limiter.should_allow_at(LogCategory::Vram, start);
        limiter.should_allow_at(LogCategory::Vram, start);

        // First drop is reported immediately, later ones accumulate
        assert_eq!(
            limiter.should_allow_at(LogCategory::Vram, start),
            (false, Some(1))
        );
        for _ in 0..4 {
            assert_eq!(
                limiter.should_allow_at(LogCategory::Vram, start),
                (false, None)
            );
        }

        let later = start + Duration::from_millis(1100);
        assert_eq!(
            limiter.should_allow_at(LogCategory::Vram, later),
            (true, Some(4))
        );
        assert_eq!(
            limiter.should_allow_at(LogCategory::Vram, later),
            (true, None)
        );
    }
}
