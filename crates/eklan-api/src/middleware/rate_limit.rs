//! Per-client rate limiting via `tower_governor`.
//!
//! Route groups pick their limits with [`crate::make_rate_limit_layer!`];
//! the constants below keep the numbers in one place.

/// Read-heavy endpoints: 10 requests per second, burst of 20.
pub const GENERAL_RATE_PER_SECOND: u64 = 10;
pub const GENERAL_BURST_SIZE: u32 = 20;

/// Mutating endpoints (drill create/update/delete): 5 per second, burst 10.
pub const MUTATION_RATE_PER_SECOND: u64 = 5;
pub const MUTATION_BURST_SIZE: u32 = 10;

/// Build a `GovernorLayer` for a route group.
///
/// A macro rather than a function so the layer's middleware type parameters
/// never have to be spelled out at call sites.
#[macro_export]
macro_rules! make_rate_limit_layer {
    ($per_second:expr, $burst_size:expr) => {
        tower_governor::GovernorLayer::new(
            tower_governor::governor::GovernorConfigBuilder::default()
                .per_second($per_second)
                .burst_size($burst_size)
                .use_headers()
                .finish()
                .expect("invalid rate limiter configuration"),
        )
    };
}
