//! # Conventions
//!
//! Rules deciding which registered types are migrations, profiles, or version table
//! descriptions, and how ordering keys and database object names are derived.
//!
//! [`DefaultMigrationConventions`] recognizes types by their markers:
//!
//! * `Migration(version, description = "...")` on a concrete type implementing
//!   [`Capability::Migration`]
//! * `Profile("name")` on a concrete type implementing [`Capability::Migration`]
//! * `VersionTableMetaData` on a concrete type implementing [`Capability::VersionTableMetaData`]
//!
//! The marker names can be changed with the `with_*_attribute` builders, or the whole policy
//! replaced by implementing [`MigrationConventions`].

use crate::{
    MigrationError, Result,
    metadata::{AttributeValue, Capability, TypeDefinition},
    version::DefaultVersionTableMetaData,
};

pub const MIGRATION_ATTRIBUTE: &str = "Migration";
pub const PROFILE_ATTRIBUTE: &str = "Profile";
pub const VERSION_TABLE_META_DATA_ATTRIBUTE: &str = "VersionTableMetaData";

const VERSION_ARGUMENT: &str = "version";
const DESCRIPTION_ARGUMENT: &str = "description";
const NAME_ARGUMENT: &str = "name";

pub trait MigrationConventions: Send + Sync {
    /// Whether the type is a concrete, runnable migration
    fn is_migration(&self, definition: &TypeDefinition) -> bool;

    /// Ordering key of a migration type
    ///
    /// # Errors
    ///
    /// * If the type has no valid version marker
    fn migration_version(&self, definition: &TypeDefinition) -> Result<u64>;

    fn migration_description(&self, _definition: &TypeDefinition) -> Option<String> {
        None
    }

    /// Whether the type is a custom version table description
    fn is_version_table_meta_data(&self, definition: &TypeDefinition) -> bool;

    fn is_profile(&self, _definition: &TypeDefinition) -> bool {
        false
    }

    fn profile_name(&self, _definition: &TypeDefinition) -> Option<String> {
        None
    }

    fn primary_key_name(&self, table_name: &str) -> String {
        format!("PK_{table_name}")
    }

    fn foreign_key_name(
        &self,
        foreign_table: &str,
        foreign_columns: &[&str],
        primary_table: &str,
        primary_columns: &[&str],
    ) -> String {
        format!(
            "FK_{foreign_table}_{}_{primary_table}_{}",
            foreign_columns.join("_"),
            primary_columns.join("_"),
        )
    }

    fn index_name(&self, table_name: &str, columns: &[&str]) -> String {
        format!("IX_{table_name}_{}", columns.join("_"))
    }
}

/// Marker-based conventions
#[derive(Debug, Clone)]
pub struct DefaultMigrationConventions {
    migration_attribute: String,
    profile_attribute: String,
    version_table_attribute: String,
}

impl DefaultMigrationConventions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            migration_attribute: MIGRATION_ATTRIBUTE.to_string(),
            profile_attribute: PROFILE_ATTRIBUTE.to_string(),
            version_table_attribute: VERSION_TABLE_META_DATA_ATTRIBUTE.to_string(),
        }
    }

    #[must_use]
    pub fn with_migration_attribute(mut self, name: impl Into<String>) -> Self {
        self.migration_attribute = name.into();
        self
    }

    #[must_use]
    pub fn with_profile_attribute(mut self, name: impl Into<String>) -> Self {
        self.profile_attribute = name.into();
        self
    }

    #[must_use]
    pub fn with_version_table_attribute(mut self, name: impl Into<String>) -> Self {
        self.version_table_attribute = name.into();
        self
    }
}

impl Default for DefaultMigrationConventions {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_version(definition: &TypeDefinition, reason: impl Into<String>) -> MigrationError {
    MigrationError::InvalidVersion {
        type_name: definition.full_name(),
        reason: reason.into(),
    }
}

impl MigrationConventions for DefaultMigrationConventions {
    fn is_migration(&self, definition: &TypeDefinition) -> bool {
        !definition.is_abstract()
            && definition.implements(Capability::Migration)
            && definition.has_attribute(&self.migration_attribute)
    }

    fn migration_version(&self, definition: &TypeDefinition) -> Result<u64> {
        let attribute = definition
            .attribute(&self.migration_attribute)
            .ok_or_else(|| {
                invalid_version(
                    definition,
                    format!("missing '{}' marker", self.migration_attribute),
                )
            })?;

        match attribute
            .args()
            .first()
            .or_else(|| attribute.get(VERSION_ARGUMENT))
        {
            Some(AttributeValue::Int(version)) => u64::try_from(*version)
                .map_err(|_| invalid_version(definition, format!("negative version {version}"))),
            Some(AttributeValue::Str(version)) => version.trim().parse::<u64>().map_err(|e| {
                invalid_version(definition, format!("\"{version}\" is not a version: {e}"))
            }),
            Some(value @ AttributeValue::Bool(_)) => Err(invalid_version(
                definition,
                format!("{value} is not a version"),
            )),
            None => Err(invalid_version(definition, "marker has no version")),
        }
    }

    fn migration_description(&self, definition: &TypeDefinition) -> Option<String> {
        let attribute = definition.attribute(&self.migration_attribute)?;

        attribute
            .get(DESCRIPTION_ARGUMENT)
            .or_else(|| attribute.args().get(1))
            .and_then(AttributeValue::as_str)
            .map(ToString::to_string)
    }

    fn is_version_table_meta_data(&self, definition: &TypeDefinition) -> bool {
        !definition.is_abstract()
            && definition.implements(Capability::VersionTableMetaData)
            && definition.has_attribute(&self.version_table_attribute)
            && !DefaultVersionTableMetaData::is_type(definition)
    }

    fn is_profile(&self, definition: &TypeDefinition) -> bool {
        !definition.is_abstract()
            && definition.implements(Capability::Migration)
            && definition.has_attribute(&self.profile_attribute)
    }

    fn profile_name(&self, definition: &TypeDefinition) -> Option<String> {
        let attribute = definition.attribute(&self.profile_attribute)?;

        attribute
            .args()
            .first()
            .or_else(|| attribute.get(NAME_ARGUMENT))
            .and_then(AttributeValue::as_str)
            .map(ToString::to_string)
    }
}
