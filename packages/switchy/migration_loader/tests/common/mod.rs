#![allow(dead_code)]

use switchy_migration_loader::{
    metadata::{Attribute, Capability, Module, TypeDefinition},
    migration::{Migration, MigrationContext},
    migration_module,
    version::VersionTableMetaData,
};

pub const CUSTOM_TABLE_NAME: &str = "Custom";
pub const CUSTOM_COLUMN_NAME: &str = "Ver";

pub mod interleaved {
    pub mod pass1 {
        use super::super::{Migration, MigrationContext};

        #[derive(Default)]
        pub struct CreateUsers;

        impl Migration for CreateUsers {
            fn up(&self, ctx: &mut dyn MigrationContext) {
                ctx.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
            }

            fn down(&self, ctx: &mut dyn MigrationContext) {
                ctx.execute("DROP TABLE users");
            }
        }

        #[derive(Default)]
        pub struct CreateAlbums;

        impl Migration for CreateAlbums {
            fn up(&self, ctx: &mut dyn MigrationContext) {
                ctx.execute("CREATE TABLE albums (id INTEGER PRIMARY KEY, title TEXT)");
            }

            fn down(&self, ctx: &mut dyn MigrationContext) {
                ctx.execute("DROP TABLE albums");
            }
        }
    }

    pub mod pass10 {
        use super::super::{Migration, MigrationContext};

        #[derive(Default)]
        pub struct CreateTracks;

        impl Migration for CreateTracks {
            fn up(&self, ctx: &mut dyn MigrationContext) {
                ctx.execute("CREATE TABLE tracks (id INTEGER PRIMARY KEY)");
            }
        }
    }
}

pub mod seeds {
    use super::{Migration, MigrationContext};

    #[derive(Default)]
    pub struct SeedDevelopmentUsers;

    impl Migration for SeedDevelopmentUsers {
        fn up(&self, ctx: &mut dyn MigrationContext) {
            ctx.execute("INSERT INTO users (name) VALUES ('dev')");
        }
    }

    #[derive(Default)]
    pub struct SeedTestUsers;

    impl Migration for SeedTestUsers {
        fn up(&self, ctx: &mut dyn MigrationContext) {
            ctx.execute("INSERT INTO users (name) VALUES ('test')");
        }
    }
}

#[derive(Default)]
pub struct TestVersionTableMetaData;

impl VersionTableMetaData for TestVersionTableMetaData {
    fn table_name(&self) -> &str {
        CUSTOM_TABLE_NAME
    }

    fn column_name(&self) -> &str {
        CUSTOM_COLUMN_NAME
    }
}

#[derive(Default)]
pub struct OtherVersionTableMetaData;

impl VersionTableMetaData for OtherVersionTableMetaData {
    fn table_name(&self) -> &str {
        "Other"
    }
}

fn abstract_base(namespace: &str) -> TypeDefinition {
    TypeDefinition::new("MigrationBase", namespace)
        .with_abstract(true)
        .with_capability(Capability::Migration)
}

/// Migrations `{3, 1, 2}` in `X.Y`, plus an unversioned abstract base
pub fn scenario_module() -> Module {
    Module::builder("M")
        .register(abstract_base("X.Y"))
        .register(TypeDefinition::migration("AddTracks", "X.Y", 3))
        .register(TypeDefinition::migration("AddUsers", "X.Y", 1))
        .register(TypeDefinition::migration("AddAlbums", "X.Y", 2))
        .build()
}

/// Migrations spread over sibling namespaces sharing string prefixes
pub fn namespaced_module() -> Module {
    Module::builder("namespaced")
        .register(TypeDefinition::migration("InRoot", "A", 1))
        .register(TypeDefinition::migration("InB", "A.B", 2))
        .register(TypeDefinition::migration("InNested", "A.B.C", 3))
        .register(TypeDefinition::migration("InSibling", "A.BC", 4))
        .register(TypeDefinition::migration("InOther", "Z", 5))
        .register(
            TypeDefinition::new("Described", "A.B")
                .with_capability(Capability::Migration)
                .with_attribute(
                    Attribute::new("Migration")
                        .arg(6)
                        .named("description", "Add described table"),
                ),
        )
        .build()
}

/// Concrete Rust migrations, profiles, and no custom version table
pub fn application_module() -> Module {
    migration_module!("application",
        migrations: [
            interleaved::pass10::CreateTracks => 20_240_301,
            interleaved::pass1::CreateAlbums => 20_240_201,
            interleaved::pass1::CreateUsers => 20_240_101,
        ],
        profiles: [
            seeds::SeedDevelopmentUsers => "development",
            seeds::SeedTestUsers => "test",
        ],
    )
}

/// A module carrying exactly one custom version table description
pub fn custom_version_table_module() -> Module {
    migration_module!("M2",
        migrations: [interleaved::pass1::CreateUsers => 1],
        version_table: TestVersionTableMetaData,
    )
}

/// A module carrying two custom version table descriptions
pub fn ambiguous_version_table_module() -> Module {
    Module::builder("ambiguous")
        .register(TypeDefinition::of_version_table::<TestVersionTableMetaData>())
        .register(TypeDefinition::of_version_table::<OtherVersionTableMetaData>())
        .build()
}

/// Two concrete migrations registered under one version
pub fn duplicate_version_module() -> Module {
    migration_module!("duplicates",
        migrations: [
            interleaved::pass1::CreateUsers => 1,
            interleaved::pass1::CreateAlbums => 1,
        ],
    )
}
