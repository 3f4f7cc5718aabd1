//! Integration test for discovering an assembly described by a JSON manifest

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use testscout::builders::{FACT, FactBuilder, THEORY, TheoryBuilder};
use testscout_core::{AssemblyManifest, DiscoveryEngine, MethodDisplay, Result, TestAssembly};

const MANIFEST: &str = r#"{
    "name": "Calc.Tests",
    "markers": [
        {
            "kind": "collection-behavior",
            "family": "collection-behavior",
            "properties": { "grouping": "per-assembly", "maxParallelThreads": 4 }
        }
    ],
    "declarations": [
        { "kind": "fact", "builder": "fact" },
        { "kind": "theory", "base": "fact", "builder": "theory" },
        { "kind": "category", "base": "trait" }
    ],
    "types": [
        { "name": "CalcTestBase", "abstract": true,
          "methods": [ { "name": "Shared", "markers": [ { "kind": "fact", "family": "test-kind" } ] } ] },
        {
            "name": "CalcTests",
            "markers": [
                { "kind": "category", "family": "trait", "properties": { "name": "Category", "value": "Math" } }
            ],
            "methods": [
                { "name": "Add", "markers": [ { "kind": "fact", "family": "test-kind", "timeoutMs": 500 } ] },
                { "name": "Mul", "markers": [
                    { "kind": "theory", "family": "test-kind", "properties": { "data": [[2, 3], [4, 5]] } }
                ] },
                { "name": "Skipped", "public": false, "markers": [
                    { "kind": "fact", "family": "test-kind", "skip": "flaky on CI" }
                ] },
                { "name": "Helper" }
            ]
        }
    ]
}"#;

#[test]
fn test_manifest_assembly_with_config_file() -> Result<()> {
    testscout::logging::init();

    let temp_dir = TempDir::new()?;
    let manifest_path = temp_dir.path().join("Calc.Tests.json");
    let config_path = temp_dir.path().join("testscout.json");
    fs::write(&manifest_path, MANIFEST)?;
    fs::write(
        &config_path,
        r#"{ "methodDisplay": "method", "parallelizeTestCollections": false }"#,
    )?;

    let (assembly, catalog) = AssemblyManifest::load_from_file(&manifest_path)?.into_parts();
    let engine = DiscoveryEngine::builder(TestAssembly::new(Arc::new(assembly), Some(config_path)))
        .with_metadata(Arc::new(catalog))
        .with_builder(FACT, || Ok(FactBuilder))
        .with_builder(THEORY, || Ok(TheoryBuilder))
        .build()?;

    assert!(engine.display_name().ends_with("[collection-per-assembly, non-parallel]"));
    assert_eq!(engine.options().method_display, MethodDisplay::Method);
    assert_eq!(engine.max_parallel_threads(), Some(4));

    let mut cases = Vec::new();
    assert!(engine.discover_assembly(engine.options(), |case| {
        cases.push(case);
        true
    })?);

    let names: Vec<_> = cases.iter().map(|c| c.display_name.as_str()).collect();
    assert_eq!(names, vec!["Add", "Mul(2, 3)", "Mul(4, 5)", "Skipped"]);

    assert!(cases.iter().all(|c| c.collection == "Test collection for Calc.Tests"));
    assert!(cases.iter().all(|c| c.traits["Category"] == vec!["Math"]));
    assert_eq!(cases[0].timeout_ms, Some(500));
    assert_eq!(cases[3].skip_reason.as_deref(), Some("flaky on CI"));
    Ok(())
}

#[test]
fn test_cases_serialize_for_the_runner() -> Result<()> {
    let (assembly, catalog) = AssemblyManifest::from_json(MANIFEST)?.into_parts();
    let engine = DiscoveryEngine::builder(TestAssembly::new(Arc::new(assembly), None))
        .with_metadata(Arc::new(catalog))
        .with_builder(FACT, || Ok(FactBuilder))
        .build()?;

    let mut cases = Vec::new();
    engine.discover_type_by_name("CalcTests", engine.options(), |case| {
        cases.push(case);
        true
    })?;

    // No theory builder registered: `Mul` yields nothing
    assert_eq!(cases.len(), 2);
    let json = serde_json::to_value(&cases[0])?;
    assert_eq!(json["displayName"], "CalcTests.Add");
    assert_eq!(json["kind"]["type"], "standard");
    Ok(())
}
