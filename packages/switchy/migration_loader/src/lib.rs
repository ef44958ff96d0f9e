//! # Switchy Migration Loader
//!
//! Discovers, classifies, and orders the migrations registered in a [`Module`], and resolves
//! the [`VersionTableMetaData`](version::VersionTableMetaData) describing the table that records
//! which migrations have been applied.
//!
//! Rust has no runtime reflection, so a [`Module`] is an explicit registry of
//! [`TypeDefinition`](metadata::TypeDefinition)s. Each definition carries the markers
//! ([`Attribute`](metadata::Attribute)s) and capabilities that the
//! [`MigrationConventions`](conventions::MigrationConventions) inspect.
//!
//! ```rust
//! use switchy_migration_loader::{
//!     MigrationLoader,
//!     metadata::{Module, TypeDefinition},
//! };
//!
//! # fn main() -> switchy_migration_loader::Result<()> {
//! let module = Module::builder("app")
//!     .register(TypeDefinition::migration("CreateUsers", "app.migrations", 2))
//!     .register(TypeDefinition::migration("CreateAlbums", "app.migrations", 1))
//!     .build();
//!
//! let loader = MigrationLoader::new();
//! let migrations = loader.find_migrations_in(&module, "app.migrations")?;
//!
//! assert_eq!(
//!     migrations.iter().map(|m| m.version).collect::<Vec<_>>(),
//!     vec![1, 2],
//! );
//!
//! let version_table = loader.get_version_table_meta_data(&module)?;
//! assert_eq!(version_table.table_name(), "VersionInfo");
//! # Ok(())
//! # }
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod conventions;
pub mod discovery;
pub mod metadata;
pub mod migration;
pub mod version;

pub use conventions::{DefaultMigrationConventions, MigrationConventions};
pub use discovery::MigrationLoader;
pub use metadata::Module;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Multiple version table meta data types found: {}", .candidates.join(", "))]
    AmbiguousVersionTableMetaData { candidates: Vec<String> },

    #[error("Invalid migration version on '{type_name}': {reason}")]
    InvalidVersion { type_name: String, reason: String },

    #[error("Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        version: u64,
        first: String,
        second: String,
    },

    #[error("Type '{type_name}' cannot be instantiated")]
    NotInstantiable { type_name: String },
}

pub type Result<T> = std::result::Result<T, MigrationError>;
