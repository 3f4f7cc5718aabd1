use crate::{
    interfaces::AssemblyInfo,
    types::{Marker, MarkerFamily},
};

/// How classes are grouped into test collections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupingStrategy {
    #[default]
    PerClass,
    PerAssembly,
    /// A grouper factory registered under this name
    Custom(String),
}

impl GroupingStrategy {
    fn parse(name: &str) -> Self {
        match name {
            "per-class" => GroupingStrategy::PerClass,
            "per-assembly" => GroupingStrategy::PerAssembly,
            other => GroupingStrategy::Custom(other.to_string()),
        }
    }
}

/// Assembly-level collection settings, read from the assembly's
/// `collection-behavior` marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionBehavior {
    pub disable_test_parallelization: bool,
    pub grouping: GroupingStrategy,
    pub max_parallel_threads: Option<u64>,
    /// Whether the assembly declared a behavior marker at all
    pub declared: bool,
}

impl CollectionBehavior {
    pub fn from_marker(marker: &Marker) -> Self {
        Self {
            disable_test_parallelization: marker
                .bool_property("disableTestParallelization")
                .unwrap_or(false),
            grouping: marker
                .str_property("grouping")
                .map(GroupingStrategy::parse)
                .unwrap_or_default(),
            max_parallel_threads: marker.u64_property("maxParallelThreads"),
            declared: true,
        }
    }

    pub fn from_assembly(assembly: &dyn AssemblyInfo) -> Self {
        let markers = assembly.markers(MarkerFamily::CollectionBehavior);
        if markers.len() > 1 {
            tracing::warn!(
                "Assembly '{}' declares {} collection behavior markers, using the first",
                assembly.name(),
                markers.len()
            );
        }
        markers
            .first()
            .map(Self::from_marker)
            .unwrap_or_default()
    }
}
