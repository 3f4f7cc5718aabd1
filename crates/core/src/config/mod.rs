//! Configuration for discovery: the runner config file, the options handed
//! to builders, and the assembly-level collection behavior.

mod behavior;
mod options;
mod settings;

pub use behavior::{CollectionBehavior, GroupingStrategy};
pub use options::{DiscoveryOptions, MethodDisplay};
pub use settings::Config;
