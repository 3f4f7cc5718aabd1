//! testscout - Marker-driven test discovery
//!
//! Re-exports [`testscout_core`] and adds a set of ready-made case builders,
//! a call-counting metadata wrapper and a logging helper, used by the
//! workspace integration tests.
pub mod builders;
pub mod logging;
pub mod metadata;

pub use testscout_core::*;
