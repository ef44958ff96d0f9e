//! # Version Table Meta Data
//!
//! Describes the table a runner uses to record which migrations have been applied, and resolves
//! which description applies to a [`Module`].
//!
//! ## Default Behavior
//!
//! Unless a module registers its own [`VersionTableMetaData`], the built-in
//! [`DefaultVersionTableMetaData`] is used:
//!
//! * schema: `""` (the connection's default schema)
//! * table: `VersionInfo`
//! * version column: `Version`
//! * unique index: `UC_Version`
//! * applied-on column: `AppliedOn`
//! * description column: `Description`
//!
//! ## Custom Tables
//!
//! ```rust
//! use switchy_migration_loader::{
//!     MigrationLoader,
//!     metadata::{Module, TypeDefinition},
//!     version::VersionTableMetaData,
//! };
//!
//! #[derive(Default)]
//! struct AppVersionTable;
//!
//! impl VersionTableMetaData for AppVersionTable {
//!     fn table_name(&self) -> &str {
//!         "app_versions"
//!     }
//!
//!     fn column_name(&self) -> &str {
//!         "ver"
//!     }
//! }
//!
//! # fn main() -> switchy_migration_loader::Result<()> {
//! let module = Module::builder("app")
//!     .register(TypeDefinition::of_version_table::<AppVersionTable>())
//!     .build();
//!
//! let version_table = MigrationLoader::new().get_version_table_meta_data(&module)?;
//! assert_eq!(version_table.table_name(), "app_versions");
//! assert_eq!(version_table.column_name(), "ver");
//! assert_eq!(version_table.unique_index_name(), "UC_Version");
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, LazyLock};

use crate::{
    MigrationError, Result,
    conventions::MigrationConventions,
    metadata::{Module, TypeDefinition, TypeFactory},
};

pub const DEFAULT_SCHEMA_NAME: &str = "";
pub const DEFAULT_TABLE_NAME: &str = "VersionInfo";
pub const DEFAULT_COLUMN_NAME: &str = "Version";
pub const DEFAULT_UNIQUE_INDEX_NAME: &str = "UC_Version";
pub const DEFAULT_APPLIED_ON_COLUMN_NAME: &str = "AppliedOn";
pub const DEFAULT_DESCRIPTION_COLUMN_NAME: &str = "Description";

/// Shape of the table recording applied migrations
///
/// Every method defaults to the built-in naming, so implementors only override what differs.
pub trait VersionTableMetaData: Send + Sync {
    fn schema_name(&self) -> &str {
        DEFAULT_SCHEMA_NAME
    }

    fn table_name(&self) -> &str {
        DEFAULT_TABLE_NAME
    }

    fn column_name(&self) -> &str {
        DEFAULT_COLUMN_NAME
    }

    fn unique_index_name(&self) -> &str {
        DEFAULT_UNIQUE_INDEX_NAME
    }

    fn applied_on_column_name(&self) -> &str {
        DEFAULT_APPLIED_ON_COLUMN_NAME
    }

    fn description_column_name(&self) -> &str {
        DEFAULT_DESCRIPTION_COLUMN_NAME
    }

    /// Snapshot of all names as a comparable value
    fn descriptor(&self) -> VersionTableDescriptor {
        VersionTableDescriptor {
            schema_name: self.schema_name().to_string(),
            table_name: self.table_name().to_string(),
            column_name: self.column_name().to_string(),
            unique_index_name: self.unique_index_name().to_string(),
            applied_on_column_name: self.applied_on_column_name().to_string(),
            description_column_name: self.description_column_name().to_string(),
        }
    }
}

/// The built-in version table description
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultVersionTableMetaData;

impl DefaultVersionTableMetaData {
    /// Registration of the built-in type
    ///
    /// Modules may contain it (e.g. when re-exporting this crate's types); it is never treated
    /// as a custom description.
    #[must_use]
    pub fn type_definition() -> TypeDefinition {
        TypeDefinition::of::<Self>().with_factory(TypeFactory::VersionTableMetaData(
            || -> Box<dyn VersionTableMetaData> { Box::new(Self) },
        ))
    }

    /// Whether `definition` is the registration of the built-in type
    #[must_use]
    pub fn is_type(definition: &TypeDefinition) -> bool {
        definition.full_name() == Self::type_definition().full_name()
    }
}

impl VersionTableMetaData for DefaultVersionTableMetaData {}

static DEFAULT_VERSION_TABLE_META_DATA: LazyLock<Arc<dyn VersionTableMetaData>> =
    LazyLock::new(|| -> Arc<dyn VersionTableMetaData> {
        Arc::new(DefaultVersionTableMetaData)
    });

/// The process-wide built-in description
#[must_use]
pub fn default_version_table_meta_data() -> Arc<dyn VersionTableMetaData> {
    DEFAULT_VERSION_TABLE_META_DATA.clone()
}

/// Plain-value version table description
///
/// Usable directly as a [`VersionTableMetaData`], e.g. as a configured fallback for
/// [`MigrationLoader::with_default_version_table`](crate::MigrationLoader::with_default_version_table).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct VersionTableDescriptor {
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
    pub unique_index_name: String,
    pub applied_on_column_name: String,
    pub description_column_name: String,
}

impl Default for VersionTableDescriptor {
    fn default() -> Self {
        DefaultVersionTableMetaData.descriptor()
    }
}

impl VersionTableMetaData for VersionTableDescriptor {
    fn schema_name(&self) -> &str {
        &self.schema_name
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn column_name(&self) -> &str {
        &self.column_name
    }

    fn unique_index_name(&self) -> &str {
        &self.unique_index_name
    }

    fn applied_on_column_name(&self) -> &str {
        &self.applied_on_column_name
    }

    fn description_column_name(&self) -> &str {
        &self.description_column_name
    }

    fn descriptor(&self) -> VersionTableDescriptor {
        self.clone()
    }
}

/// Resolve the effective version table description of `module`
///
/// A single custom description wins over `fallback`; more than one is ambiguous.
///
/// # Errors
///
/// * If more than one custom description is registered
/// * If the custom description has no version table factory
pub fn resolve_version_table_meta_data(
    conventions: &dyn MigrationConventions,
    module: &Module,
    fallback: &Arc<dyn VersionTableMetaData>,
) -> Result<Arc<dyn VersionTableMetaData>> {
    log::trace!(
        "resolve_version_table_meta_data: scanning module '{}' ({} types)",
        module.name(),
        module.len(),
    );

    let candidates = module
        .types()
        .filter(|x| conventions.is_version_table_meta_data(x))
        .collect::<Vec<_>>();

    match candidates.as_slice() {
        [] => {
            log::debug!(
                "No custom version table meta data in module '{}', using default",
                module.name()
            );
            Ok(fallback.clone())
        }
        [definition] => {
            log::debug!(
                "Using version table meta data '{}' from module '{}'",
                definition.full_name(),
                module.name()
            );
            match definition.factory() {
                Some(TypeFactory::VersionTableMetaData(factory)) => Ok(Arc::from(factory())),
                Some(TypeFactory::Migration(_)) | None => Err(MigrationError::NotInstantiable {
                    type_name: definition.full_name(),
                }),
            }
        }
        _ => Err(MigrationError::AmbiguousVersionTableMetaData {
            candidates: candidates.iter().map(|x| x.full_name()).collect(),
        }),
    }
}
