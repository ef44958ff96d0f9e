//! Integration tests for migration discovery across fixture modules

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use switchy_migration_loader::{
    MigrationError, MigrationLoader,
    metadata::{Module, TypeDefinition},
    migration::MigrationDescriptor,
};

use common::interleaved::{pass1, pass10};

fn versions(migrations: &[MigrationDescriptor]) -> Vec<u64> {
    migrations.iter().map(|x| x.version).collect()
}

fn names(migrations: &[MigrationDescriptor]) -> Vec<&str> {
    migrations.iter().map(|x| x.type_reference.name()).collect()
}

#[test_log::test]
fn test_can_find_migrations_in_module() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&common::application_module(), "")
        .unwrap();

    assert!(!migrations.is_empty());
}

#[test_log::test]
fn test_scenario_without_filter_orders_and_excludes_base() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&common::scenario_module(), "")
        .unwrap();

    assert_eq!(versions(&migrations), vec![1, 2, 3]);
    assert!(!names(&migrations).contains(&"MigrationBase"));
}

#[test_log::test]
fn test_scenario_with_matching_filter() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&common::scenario_module(), "X.Y")
        .unwrap();

    assert_eq!(versions(&migrations), vec![1, 2, 3]);
}

#[test_log::test]
fn test_scenario_with_non_matching_filter() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&common::scenario_module(), "X.Z")
        .unwrap();

    assert!(migrations.is_empty());
}

#[test_log::test]
fn test_filter_includes_nested_namespaces() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&common::namespaced_module(), "A.B")
        .unwrap();

    assert_eq!(names(&migrations), vec!["InB", "InNested", "Described"]);
}

#[test_log::test]
fn test_filter_excludes_sibling_sharing_prefix() {
    let loader = MigrationLoader::new();
    let module = common::namespaced_module();

    let in_b = loader.find_migrations_in(&module, "A.B").unwrap();
    let in_bc = loader.find_migrations_in(&module, "A.BC").unwrap();

    assert!(!names(&in_b).contains(&"InSibling"));
    assert_eq!(names(&in_bc), vec!["InSibling"]);
}

#[test_log::test]
fn test_separator_only_filter_keeps_nothing() {
    let loader = MigrationLoader::new();
    let module = common::namespaced_module();

    for filter in [".", "::", "A..B"] {
        let migrations = loader.find_migrations_in(&module, filter).unwrap();

        assert!(migrations.is_empty(), "filter={filter}");
    }
}

#[test_log::test]
fn test_filter_on_root_namespace() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&common::namespaced_module(), "A")
        .unwrap();

    assert_eq!(versions(&migrations), vec![1, 2, 3, 4, 6]);
}

#[test_log::test]
fn test_description_is_carried_on_descriptor() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&common::namespaced_module(), "A.B")
        .unwrap();

    let described = migrations
        .iter()
        .find(|x| x.type_reference.name() == "Described")
        .unwrap();

    assert_eq!(
        described.description.as_deref(),
        Some("Add described table")
    );
    assert_eq!(migrations[0].description, None);
}

#[test_log::test]
fn test_rust_module_paths_filter_by_segment() {
    let pass1_namespace = TypeDefinition::of::<pass1::CreateUsers>()
        .namespace()
        .to_string();
    let pass10_namespace = TypeDefinition::of::<pass10::CreateTracks>()
        .namespace()
        .to_string();

    let loader = MigrationLoader::new();
    let module = common::application_module();

    let pass1 = loader.find_migrations_in(&module, &pass1_namespace).unwrap();
    let pass10 = loader
        .find_migrations_in(&module, &pass10_namespace)
        .unwrap();

    assert_eq!(names(&pass1), vec!["CreateUsers", "CreateAlbums"]);
    assert_eq!(versions(&pass1), vec![20_240_101, 20_240_201]);
    assert_eq!(names(&pass10), vec!["CreateTracks"]);
}

#[test_log::test]
fn test_profiles_are_not_migrations() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&common::application_module(), "")
        .unwrap();

    assert!(!names(&migrations).contains(&"SeedDevelopmentUsers"));
    assert_eq!(migrations.len(), 3);
}

#[test_log::test]
fn test_find_profiles_by_name() {
    let loader = MigrationLoader::new();
    let module = common::application_module();

    let development = loader.find_profiles_in(&module, "development");
    let missing = loader.find_profiles_in(&module, "production");

    assert_eq!(development.len(), 1);
    assert_eq!(development[0].name, "development");
    assert_eq!(development[0].type_reference.name(), "SeedDevelopmentUsers");
    assert!(missing.is_empty());

    let mut statements: Vec<String> = Vec::new();
    development[0].instantiate().unwrap().up(&mut statements);
    assert_eq!(statements, vec!["INSERT INTO users (name) VALUES ('dev')"]);
}

#[test_log::test]
fn test_discovery_is_idempotent() {
    let loader = MigrationLoader::new();
    let module = common::application_module();

    let first = loader.find_migrations_in(&module, "").unwrap();
    let second = loader.find_migrations_in(&module, "").unwrap();

    assert_eq!(first, second);
}

#[test_log::test]
fn test_load_migrations_instantiates_in_version_order() {
    let loaded = MigrationLoader::new()
        .load_migrations(&common::application_module(), "")
        .unwrap();

    assert_eq!(
        loaded.keys().copied().collect::<Vec<_>>(),
        vec![20_240_101, 20_240_201, 20_240_301]
    );

    let mut statements: Vec<String> = Vec::new();
    for migration in loaded.values() {
        migration.up(&mut statements);
    }

    assert_eq!(
        statements,
        vec![
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)",
            "CREATE TABLE albums (id INTEGER PRIMARY KEY, title TEXT)",
            "CREATE TABLE tracks (id INTEGER PRIMARY KEY)",
        ]
    );
}

#[test_log::test]
fn test_discovery_keeps_duplicate_versions_in_registration_order() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&common::duplicate_version_module(), "")
        .unwrap();

    assert_eq!(names(&migrations), vec!["CreateUsers", "CreateAlbums"]);
}

#[test_log::test]
fn test_load_migrations_rejects_duplicate_versions() {
    let err = MigrationLoader::new()
        .load_migrations(&common::duplicate_version_module(), "")
        .err()
        .unwrap();

    match err {
        MigrationError::DuplicateVersion {
            version,
            first,
            second,
        } => {
            assert_eq!(version, 1);
            assert!(first.ends_with("::CreateUsers"), "first={first}");
            assert!(second.ends_with("::CreateAlbums"), "second={second}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test_log::test]
fn test_loader_can_be_shared_between_threads() {
    let loader = Arc::new(MigrationLoader::new());
    let module = Arc::new(common::application_module());

    let expected = loader.find_migrations_in(&module, "").unwrap();

    std::thread::scope(|scope| {
        let handles = (0..4)
            .map(|_| scope.spawn(|| loader.find_migrations_in(&module, "").unwrap()))
            .collect::<Vec<_>>();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test_log::test]
fn test_empty_module_yields_no_migrations() {
    let migrations = MigrationLoader::new()
        .find_migrations_in(&Module::builder("empty").build(), "")
        .unwrap();

    assert!(migrations.is_empty());
}
