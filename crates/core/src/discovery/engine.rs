use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{
    collection::{CollectionGrouper, CollectionPerAssembly, CollectionPerClass, GrouperFactory},
    config::{CollectionBehavior, Config, DiscoveryOptions, GroupingStrategy},
    diagnostics::{DiagnosticSink, TracingSink},
    error::{Error, Result},
    interfaces::{MarkerMetadata, TestCaseBuilder, TraitDiscoverer, TypeInfo},
    naming::{DefaultNamer, TestCaseNamer},
    registry::{BuilderFactory, BuilderRegistry, TraitRegistry},
    services::MarkerCatalog,
    types::{BuilderKey, TestAssembly, TestCase, TestClass},
};

use super::class::ClassDiscovery;

/// Name and version reported as the test framework
pub const FRAMEWORK_DISPLAY_NAME: &str = concat!("testscout v", env!("CARGO_PKG_VERSION"));

/// Discovers the test cases of one assembly.
///
/// The configuration file and the assembly's collection behavior are read
/// once, when the engine is built. Builder and trait resolutions are cached
/// for the engine's lifetime.
pub struct DiscoveryEngine {
    assembly: TestAssembly,
    config: Config,
    options: DiscoveryOptions,
    behavior: CollectionBehavior,
    disable_parallelization: bool,
    grouper: Arc<dyn CollectionGrouper>,
    registry: BuilderRegistry,
    traits: TraitRegistry,
    namer: Arc<dyn TestCaseNamer>,
    diagnostics: Arc<dyn DiagnosticSink>,
    display_name: String,
}

impl fmt::Debug for DiscoveryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryEngine")
            .field("assembly", &self.assembly)
            .field("display_name", &self.display_name)
            .field("options", &self.options)
            .field("registry", &self.registry)
            .field("traits", &self.traits)
            .finish()
    }
}

/// Fluent setup for a [`DiscoveryEngine`]
pub struct EngineBuilder {
    assembly: TestAssembly,
    metadata: Option<Arc<dyn MarkerMetadata>>,
    grouper: Option<Arc<dyn CollectionGrouper>>,
    grouper_factories: HashMap<String, GrouperFactory>,
    builders: Vec<(BuilderKey, BuilderFactory)>,
    trait_discoverers: Vec<(BuilderKey, Arc<dyn TraitDiscoverer>)>,
    namer: Arc<dyn TestCaseNamer>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl EngineBuilder {
    fn new(assembly: TestAssembly) -> Self {
        Self {
            assembly,
            metadata: None,
            grouper: None,
            grouper_factories: HashMap::new(),
            builders: Vec::new(),
            trait_discoverers: Vec::new(),
            namer: Arc::new(DefaultNamer),
            diagnostics: Arc::new(TracingSink),
        }
    }

    /// Marker metadata; defaults to [`MarkerCatalog::with_defaults`]
    pub fn with_metadata(mut self, metadata: Arc<dyn MarkerMetadata>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Use `grouper` whatever the assembly's collection behavior says
    pub fn with_grouper(mut self, grouper: Arc<dyn CollectionGrouper>) -> Self {
        self.grouper = Some(grouper);
        self
    }

    /// Make a custom grouping selectable by name from the collection
    /// behavior marker's `grouping` property
    pub fn with_grouper_factory(mut self, name: impl Into<String>, factory: GrouperFactory) -> Self {
        self.grouper_factories.insert(name.into(), factory);
        self
    }

    pub fn with_builder<F, B>(mut self, key: impl Into<BuilderKey>, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<B> + Send + Sync + 'static,
        B: TestCaseBuilder + 'static,
    {
        let factory: BuilderFactory =
            Arc::new(move || factory().map(|builder| Arc::new(builder) as Arc<dyn TestCaseBuilder>));
        self.builders.push((key.into(), factory));
        self
    }

    pub fn with_builder_factory(mut self, key: impl Into<BuilderKey>, factory: BuilderFactory) -> Self {
        self.builders.push((key.into(), factory));
        self
    }

    pub fn with_builder_instance(self, key: impl Into<BuilderKey>, builder: Arc<dyn TestCaseBuilder>) -> Self {
        self.with_builder_factory(key, Arc::new(move || Ok::<_, anyhow::Error>(builder.clone())))
    }

    pub fn with_trait_discoverer(mut self, key: impl Into<BuilderKey>, discoverer: Arc<dyn TraitDiscoverer>) -> Self {
        self.trait_discoverers.push((key.into(), discoverer));
        self
    }

    pub fn with_namer(mut self, namer: Arc<dyn TestCaseNamer>) -> Self {
        self.namer = namer;
        self
    }

    /// Where non-fatal problems are reported; defaults to [`TracingSink`]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Load the configuration, read the collection behavior and pick the
    /// collection grouper. Fails only if the configuration file exists but
    /// cannot be read.
    pub fn build(self) -> Result<DiscoveryEngine> {
        let config = Config::load_optional(self.assembly.config_file())?;
        let options = DiscoveryOptions::from_config(&config);
        let behavior = CollectionBehavior::from_assembly(self.assembly.info().as_ref());

        let diagnostics: Arc<dyn DiagnosticSink> = if options.diagnostic_messages {
            self.diagnostics
        } else {
            Arc::new(TracingSink)
        };

        let grouper = match self.grouper {
            Some(grouper) => grouper,
            None => select_grouper(&self.assembly, &behavior, &self.grouper_factories, diagnostics.as_ref()),
        };

        let disable_parallelization =
            behavior.disable_test_parallelization || config.parallelize_test_collections == Some(false);
        let display_name = format!(
            "{} [{}, {}]",
            FRAMEWORK_DISPLAY_NAME,
            grouper.display_name(),
            if disable_parallelization { "non-parallel" } else { "parallel" }
        );

        let metadata = self
            .metadata
            .unwrap_or_else(|| Arc::new(MarkerCatalog::with_defaults()));

        let mut registry = BuilderRegistry::new(metadata.clone(), diagnostics.clone());
        for (key, factory) in self.builders {
            registry.register_factory(key, factory);
        }

        let mut traits = TraitRegistry::new(metadata);
        for (key, discoverer) in self.trait_discoverers {
            traits.register(key, discoverer);
        }

        tracing::debug!("Discovery engine for '{}': {}", self.assembly.name(), display_name);

        Ok(DiscoveryEngine {
            assembly: self.assembly,
            config,
            options,
            behavior,
            disable_parallelization,
            grouper,
            registry,
            traits,
            namer: self.namer,
            diagnostics,
            display_name,
        })
    }
}

fn select_grouper(
    assembly: &TestAssembly,
    behavior: &CollectionBehavior,
    factories: &HashMap<String, GrouperFactory>,
    diagnostics: &dyn DiagnosticSink,
) -> Arc<dyn CollectionGrouper> {
    match &behavior.grouping {
        GroupingStrategy::PerClass => Arc::new(CollectionPerClass::new(assembly.name())),
        GroupingStrategy::PerAssembly => Arc::new(CollectionPerAssembly::new(assembly.name())),
        GroupingStrategy::Custom(name) => match factories.get(name) {
            Some(factory) => factory(assembly),
            None => {
                diagnostics.send(&format!(
                    "Collection grouping '{name}' is not registered, falling back to collection-per-class"
                ));
                Arc::new(CollectionPerClass::new(assembly.name()))
            }
        },
    }
}

impl DiscoveryEngine {
    pub fn builder(assembly: TestAssembly) -> EngineBuilder {
        EngineBuilder::new(assembly)
    }

    /// An engine with the default namer and a tracing diagnostic sink.
    /// `grouper`, when given, overrides the assembly's collection behavior.
    pub fn new(
        assembly: TestAssembly,
        metadata: Arc<dyn MarkerMetadata>,
        grouper: Option<Arc<dyn CollectionGrouper>>,
    ) -> Result<Self> {
        let builder = Self::builder(assembly).with_metadata(metadata);
        match grouper {
            Some(grouper) => builder.with_grouper(grouper).build(),
            None => builder.build(),
        }
    }

    /// `"<framework> [<grouper>, parallel|non-parallel]"`
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn disable_parallelization(&self) -> bool {
        self.disable_parallelization
    }

    /// Thread limit from the configuration file, else from the assembly
    pub fn max_parallel_threads(&self) -> Option<u64> {
        self.config
            .max_parallel_threads
            .or(self.behavior.max_parallel_threads)
    }

    pub fn collection_behavior(&self) -> &CollectionBehavior {
        &self.behavior
    }

    pub fn collection_grouper(&self) -> &Arc<dyn CollectionGrouper> {
        &self.grouper
    }

    pub fn registry(&self) -> &BuilderRegistry {
        &self.registry
    }

    pub fn trait_registry(&self) -> &TraitRegistry {
        &self.traits
    }

    /// Options derived from the configuration file
    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn assembly(&self) -> &TestAssembly {
        &self.assembly
    }

    /// Bind `class` to the collection the grouper assigns it
    pub fn discover_test_class(&self, class: Arc<dyn TypeInfo>) -> TestClass {
        let collection = self.grouper.collection_for(class.as_ref());
        TestClass::new(collection, class)
    }

    /// Report every test case of `class` to `on_test_case`, method by
    /// method. Returns `Ok(false)` if the callback asked to stop.
    pub fn discover_class(
        &self,
        class: &TestClass,
        options: &DiscoveryOptions,
        mut on_test_case: impl FnMut(TestCase) -> bool,
    ) -> Result<bool> {
        ClassDiscovery::new(&self.registry, &self.traits, self.namer.as_ref())
            .discover(class, options, &mut on_test_case)
    }

    /// Discover every concrete type of the assembly.
    ///
    /// A class whose methods cannot be enumerated is reported to the
    /// diagnostic sink and skipped.
    pub fn discover_assembly(
        &self,
        options: &DiscoveryOptions,
        mut on_test_case: impl FnMut(TestCase) -> bool,
    ) -> Result<bool> {
        let types = self.assembly.info().types()?;
        tracing::debug!("Discovering {} types in '{}'", types.len(), self.assembly.name());

        for ty in types {
            if ty.is_abstract() {
                tracing::debug!("Skipping abstract type '{}'", ty.name());
                continue;
            }

            let class = self.discover_test_class(ty);
            match self.discover_class(&class, options, &mut on_test_case) {
                Ok(true) => {}
                Ok(false) => return Ok(false),
                Err(err) => self.diagnostics.send(&format!(
                    "Exception during discovery of class '{}': {err}",
                    class.name()
                )),
            }
        }

        Ok(true)
    }

    /// Discover the single type called `name`
    pub fn discover_type_by_name(
        &self,
        name: &str,
        options: &DiscoveryOptions,
        on_test_case: impl FnMut(TestCase) -> bool,
    ) -> Result<bool> {
        let ty = self
            .assembly
            .info()
            .types()?
            .into_iter()
            .find(|ty| ty.name() == name)
            .ok_or_else(|| Error::TypeNotFound(name.to_string()))?;

        let class = self.discover_test_class(ty);
        self.discover_class(&class, options, on_test_case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MethodDisplay,
        diagnostics::CollectingSink,
        interfaces::{AssemblyInfo, MethodInfo, TestCaseIter},
        services::{MarkerDeclaration, StaticAssembly, StaticMethod, StaticType},
        types::{Marker, MarkerFamily, TestMethod},
    };
    use tempfile::TempDir;

    struct FactBuilder;

    impl TestCaseBuilder for FactBuilder {
        fn discover<'a>(
            &'a self,
            options: &'a DiscoveryOptions,
            method: &'a TestMethod,
            marker: &'a Marker,
        ) -> anyhow::Result<TestCaseIter<'a>> {
            let case = TestCase::new(DefaultNamer.details(options, method, marker));
            Ok(Box::new(std::iter::once(Ok(case))))
        }
    }

    fn catalog() -> Arc<MarkerCatalog> {
        Arc::new(MarkerCatalog::with_defaults().with_declaration(MarkerDeclaration::new("fact").with_builder("fact")))
    }

    fn behavior(grouping: &str, disable: bool) -> Marker {
        Marker::new(MarkerFamily::CollectionBehavior, "collection-behavior")
            .with_property("grouping", grouping)
            .with_property("disableTestParallelization", disable)
    }

    fn assembly(info: StaticAssembly) -> TestAssembly {
        TestAssembly::new(Arc::new(info), None)
    }

    fn engine(info: StaticAssembly) -> Result<DiscoveryEngine> {
        DiscoveryEngine::builder(assembly(info))
            .with_metadata(catalog())
            .with_builder("fact", || Ok(FactBuilder))
            .build()
    }

    fn fact(name: &str) -> StaticMethod {
        StaticMethod::new(name).with_marker(Marker::test("fact"))
    }

    #[test]
    fn test_default_display_name() -> Result<()> {
        let engine = engine(StaticAssembly::new("Calc.Tests"))?;
        insta::assert_snapshot!(engine.display_name(), @"testscout v0.1.0 [collection-per-class, parallel]");
        assert!(!engine.disable_parallelization());
        assert!(!engine.collection_behavior().declared);
        Ok(())
    }

    #[test]
    fn test_display_name_follows_collection_behavior() -> Result<()> {
        let engine = engine(StaticAssembly::new("Calc.Tests").with_marker(behavior("per-assembly", true)))?;
        assert_eq!(
            engine.display_name(),
            format!("{FRAMEWORK_DISPLAY_NAME} [collection-per-assembly, non-parallel]")
        );
        assert!(engine.disable_parallelization());
        Ok(())
    }

    #[test]
    fn test_explicit_grouper_wins_over_behavior() -> Result<()> {
        let engine = DiscoveryEngine::new(
            assembly(StaticAssembly::new("Calc.Tests").with_marker(behavior("per-class", false))),
            catalog(),
            Some(Arc::new(CollectionPerAssembly::new("Calc.Tests"))),
        )?;
        assert_eq!(engine.collection_grouper().display_name(), "collection-per-assembly");
        Ok(())
    }

    #[test]
    fn test_custom_grouper_selected_by_name() -> Result<()> {
        struct Everything(Arc<crate::types::TestCollection>);

        impl CollectionGrouper for Everything {
            fn display_name(&self) -> &str {
                "everything"
            }

            fn collection_for(&self, _class: &dyn TypeInfo) -> Arc<crate::types::TestCollection> {
                self.0.clone()
            }
        }

        let factory: GrouperFactory = Arc::new(|assembly: &TestAssembly| {
            let collection = crate::types::TestCollection::new(assembly.name(), "everything", None);
            Arc::new(Everything(Arc::new(collection))) as Arc<dyn CollectionGrouper>
        });

        let engine = DiscoveryEngine::builder(assembly(
            StaticAssembly::new("Calc.Tests").with_marker(behavior("everything", false)),
        ))
        .with_grouper_factory("everything", factory)
        .build()?;

        assert!(engine.display_name().ends_with("[everything, parallel]"));
        let class = engine.discover_test_class(Arc::new(StaticType::new("CalcTests")));
        assert_eq!(class.collection().display_name, "everything");
        Ok(())
    }

    #[test]
    fn test_unknown_custom_grouper_falls_back_to_per_class() -> Result<()> {
        let sink = Arc::new(CollectingSink::new());
        let engine = DiscoveryEngine::builder(assembly(
            StaticAssembly::new("Calc.Tests").with_marker(behavior("by-namespace", false)),
        ))
        .with_diagnostics(sink.clone())
        .build()?;

        assert_eq!(engine.collection_grouper().display_name(), "collection-per-class");
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("'by-namespace' is not registered"));
        Ok(())
    }

    #[test]
    fn test_default_grouping_is_per_class() -> Result<()> {
        let engine = engine(StaticAssembly::new("Calc.Tests"))?;
        let calc: Arc<dyn TypeInfo> = Arc::new(StaticType::new("CalcTests"));
        let strings: Arc<dyn TypeInfo> = Arc::new(StaticType::new("StringTests"));

        let a = engine.discover_test_class(calc.clone());
        let b = engine.discover_test_class(strings);
        let c = engine.discover_test_class(calc);

        assert!(!Arc::ptr_eq(a.collection(), b.collection()));
        assert!(Arc::ptr_eq(a.collection(), c.collection()));
        Ok(())
    }

    #[test]
    fn test_config_file_drives_options() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("testscout.json");
        std::fs::write(
            &path,
            r#"{ "methodDisplay": "method", "parallelizeTestCollections": false, "maxParallelThreads": 2 }"#,
        )?;

        let info = StaticAssembly::new("Calc.Tests").with_type(StaticType::new("CalcTests").with_method(fact("Add")));
        let engine = DiscoveryEngine::builder(TestAssembly::new(Arc::new(info), Some(path)))
            .with_metadata(catalog())
            .with_builder("fact", || Ok(FactBuilder))
            .build()?;

        assert_eq!(engine.options().method_display, MethodDisplay::Method);
        assert!(engine.disable_parallelization());
        assert_eq!(engine.max_parallel_threads(), Some(2));

        let mut names = Vec::new();
        engine.discover_type_by_name("CalcTests", engine.options(), |case| {
            names.push(case.display_name);
            true
        })?;
        assert_eq!(names, vec!["Add"]);
        Ok(())
    }

    #[test]
    fn test_unreadable_config_fails_build() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("testscout.json");
        std::fs::write(&path, "not json")?;

        let result = DiscoveryEngine::builder(TestAssembly::new(
            Arc::new(StaticAssembly::new("Calc.Tests")),
            Some(path),
        ))
        .build();
        assert!(matches!(result, Err(Error::ConfigError(_))));
        Ok(())
    }

    #[test]
    fn test_assembly_walk_skips_abstract_types() -> Result<()> {
        let info = StaticAssembly::new("Calc.Tests")
            .with_type(StaticType::new("BaseTests").abstract_type().with_method(fact("Inherited")))
            .with_type(StaticType::new("CalcTests").with_method(fact("Add")).with_method(fact("Sub")))
            .with_type(StaticType::new("StringTests").with_method(fact("Concat")));
        let engine = engine(info)?;

        let mut names = Vec::new();
        let finished = engine.discover_assembly(engine.options(), |case| {
            names.push(case.display_name);
            true
        })?;

        assert!(finished);
        assert_eq!(names, vec!["CalcTests.Add", "CalcTests.Sub", "StringTests.Concat"]);
        Ok(())
    }

    #[test]
    fn test_assembly_walk_stops_on_request() -> Result<()> {
        let info = StaticAssembly::new("Calc.Tests")
            .with_type(StaticType::new("CalcTests").with_method(fact("Add")).with_method(fact("Sub")))
            .with_type(StaticType::new("StringTests").with_method(fact("Concat")));
        let engine = engine(info)?;

        let mut count = 0;
        let finished = engine.discover_assembly(engine.options(), |_| {
            count += 1;
            count < 2
        })?;

        assert!(!finished);
        assert_eq!(count, 2);
        Ok(())
    }

    #[test]
    fn test_assembly_walk_recovers_from_class_fault() -> Result<()> {
        struct Sealed;

        impl TypeInfo for Sealed {
            fn name(&self) -> &str {
                "Sealed"
            }

            fn methods(&self, _include_private: bool) -> Result<Vec<Arc<dyn MethodInfo>>> {
                Err(Error::IntrospectionError("methods are not readable".to_string()))
            }

            fn markers(&self, _family: MarkerFamily) -> Vec<Marker> {
                Vec::new()
            }
        }

        struct Mixed;

        impl AssemblyInfo for Mixed {
            fn name(&self) -> &str {
                "Mixed.Tests"
            }

            fn types(&self) -> Result<Vec<Arc<dyn TypeInfo>>> {
                Ok(vec![
                    Arc::new(Sealed) as Arc<dyn TypeInfo>,
                    Arc::new(StaticType::new("CalcTests").with_method(fact("Add"))),
                ])
            }

            fn markers(&self, _family: MarkerFamily) -> Vec<Marker> {
                Vec::new()
            }
        }

        let sink = Arc::new(CollectingSink::new());
        let engine = DiscoveryEngine::builder(TestAssembly::new(Arc::new(Mixed), None))
            .with_metadata(catalog())
            .with_builder("fact", || Ok(FactBuilder))
            .with_diagnostics(sink.clone())
            .build()?;

        let mut names = Vec::new();
        assert!(engine.discover_assembly(engine.options(), |case| {
            names.push(case.display_name);
            true
        })?);

        assert_eq!(names, vec!["CalcTests.Add"]);
        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0],
            "Exception during discovery of class 'Sealed': Introspection error: methods are not readable"
        );
        Ok(())
    }

    #[test]
    fn test_unknown_type_name() -> Result<()> {
        let engine = engine(StaticAssembly::new("Calc.Tests"))?;
        let err = engine
            .discover_type_by_name("Missing", engine.options(), |_| true)
            .unwrap_err();
        assert!(matches!(err, Error::TypeNotFound(ref name) if name == "Missing"));
        Ok(())
    }

    #[test]
    fn test_disabled_diagnostics_bypass_sink() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("testscout.json");
        std::fs::write(&path, r#"{ "diagnosticMessages": false }"#)?;

        let sink = Arc::new(CollectingSink::new());
        let engine = DiscoveryEngine::builder(TestAssembly::new(Arc::new(StaticAssembly::new("Calc.Tests")), Some(path)))
            .with_metadata(catalog())
            .with_diagnostics(sink.clone())
            .build()?;

        assert!(engine.registry().get_builder(&BuilderKey::from("fact")).is_none());
        assert!(sink.is_empty());
        Ok(())
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DiscoveryEngine>();
    }
}
