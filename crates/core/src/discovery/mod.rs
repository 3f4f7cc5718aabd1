//! The discovery pipeline
//!
//! The engine binds classes to collections and runs the class step, which
//! runs the method step for each method and turns faults into error cases.

mod class;
mod engine;
mod method;

pub use engine::{DiscoveryEngine, EngineBuilder, FRAMEWORK_DISPLAY_NAME};
