//! # Migrations
//!
//! The [`Migration`] trait is the contract a runner drives once the loader has discovered and
//! ordered the registered migrations. A migration writes its statements into a
//! [`MigrationContext`]; what the context does with them (execute, print, record) belongs to the
//! runner.
//!
//! ```rust
//! use switchy_migration_loader::migration::{Migration, MigrationContext};
//!
//! #[derive(Default)]
//! struct CreateUsers;
//!
//! impl Migration for CreateUsers {
//!     fn up(&self, ctx: &mut dyn MigrationContext) {
//!         ctx.execute("CREATE TABLE users (id INTEGER PRIMARY KEY)");
//!     }
//!
//!     fn down(&self, ctx: &mut dyn MigrationContext) {
//!         ctx.execute("DROP TABLE users");
//!     }
//! }
//!
//! let mut statements: Vec<String> = Vec::new();
//! CreateUsers.up(&mut statements);
//! assert_eq!(statements, vec!["CREATE TABLE users (id INTEGER PRIMARY KEY)"]);
//! ```
//!
//! Discovery produces [`MigrationDescriptor`]s (and [`ProfileDescriptor`]s for profiles). A
//! descriptor keeps a handle to the registered [`TypeDefinition`] so the migration can be
//! instantiated later.

use std::sync::Arc;

use crate::{
    MigrationError, Result,
    metadata::{TypeDefinition, TypeFactory},
};

pub trait Migration: Send + Sync {
    fn up(&self, ctx: &mut dyn MigrationContext);

    fn down(&self, _ctx: &mut dyn MigrationContext) {}
}

/// Sink for the statements a [`Migration`] produces
pub trait MigrationContext {
    fn execute(&mut self, sql: &str);
}

impl MigrationContext for Vec<String> {
    fn execute(&mut self, sql: &str) {
        self.push(sql.to_string());
    }
}

/// A discovered migration
///
/// Created fresh by every discovery call.
#[derive(Debug, Clone)]
pub struct MigrationDescriptor {
    pub version: u64,
    pub description: Option<String>,
    pub type_reference: Arc<TypeDefinition>,
}

impl MigrationDescriptor {
    #[must_use]
    pub fn type_name(&self) -> String {
        self.type_reference.full_name()
    }

    /// Construct the migration this descriptor refers to
    ///
    /// # Errors
    ///
    /// * If the type has no migration factory
    pub fn instantiate(&self) -> Result<Box<dyn Migration>> {
        instantiate_migration(&self.type_reference)
    }
}

impl PartialEq for MigrationDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.description == other.description
            && Arc::ptr_eq(&self.type_reference, &other.type_reference)
    }
}

/// A discovered profile migration
#[derive(Debug, Clone)]
pub struct ProfileDescriptor {
    pub name: String,
    pub type_reference: Arc<TypeDefinition>,
}

impl ProfileDescriptor {
    #[must_use]
    pub fn type_name(&self) -> String {
        self.type_reference.full_name()
    }

    /// Construct the profile migration this descriptor refers to
    ///
    /// # Errors
    ///
    /// * If the type has no migration factory
    pub fn instantiate(&self) -> Result<Box<dyn Migration>> {
        instantiate_migration(&self.type_reference)
    }
}

fn instantiate_migration(definition: &TypeDefinition) -> Result<Box<dyn Migration>> {
    match definition.factory() {
        Some(TypeFactory::Migration(factory)) => Ok(factory()),
        Some(TypeFactory::VersionTableMetaData(_)) | None => Err(MigrationError::NotInstantiable {
            type_name: definition.full_name(),
        }),
    }
}
