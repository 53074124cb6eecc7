//! System-wide constants for the Agora marketplace engine.

/// Basis-point denominator: 10 000 bps = 100%.
pub const BASIS_POINTS_DIVISOR: u64 = 10_000;

/// Hard cap on the platform fee rate (1 000 bps = 10%).
pub const FEE_CAP_BPS: u16 = 1_000;

/// Default platform fee rate (250 bps = 2.5%).
pub const DEFAULT_FEE_RATE_BPS: u16 = 250;

/// Grace period before `auto_release` becomes available, in seconds (7 days).
pub const AUTO_RELEASE_GRACE_SECS: i64 = 7 * 24 * 60 * 60;

/// The first listing id the book allocates.
pub const FIRST_LISTING_ID: u64 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Agora";
