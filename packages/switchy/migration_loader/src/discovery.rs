//! # Migration Discovery
//!
//! [`MigrationLoader`] scans a [`Module`] with its [`MigrationConventions`] and produces:
//!
//! * the migrations, ordered by ascending version ([`MigrationLoader::find_migrations_in`])
//! * the profile migrations for a profile name ([`MigrationLoader::find_profiles_in`])
//! * instantiated migrations keyed by version ([`MigrationLoader::load_migrations`])
//! * the effective version table description
//!   ([`MigrationLoader::get_version_table_meta_data`])
//!
//! All operations are read-only scans; a loader can be shared between threads.
//!
//! ## Namespace Filtering
//!
//! A non-empty namespace filter keeps only migrations declared in that namespace or a namespace
//! nested below it. Matching is done on whole segments, so the filter `app.v1` keeps
//! `app.v1.users` but not `app.v10`.
//!
//! ## Custom Conventions
//!
//! ```rust
//! use switchy_migration_loader::{
//!     DefaultMigrationConventions, MigrationLoader,
//!     metadata::{Attribute, Capability, Module, TypeDefinition},
//! };
//!
//! # fn main() -> switchy_migration_loader::Result<()> {
//! let module = Module::builder("app")
//!     .register(
//!         TypeDefinition::new("AddAlbums", "app")
//!             .with_capability(Capability::Migration)
//!             .with_attribute(Attribute::new("Version").arg(3)),
//!     )
//!     .build();
//!
//! let loader = MigrationLoader::new().with_conventions(
//!     DefaultMigrationConventions::new().with_migration_attribute("Version"),
//! );
//!
//! assert_eq!(loader.find_migrations_in(&module, "")?[0].version, 3);
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    MigrationError, Result,
    conventions::{DefaultMigrationConventions, MigrationConventions},
    metadata::Module,
    migration::{Migration, MigrationDescriptor, ProfileDescriptor},
    version::{
        VersionTableMetaData, default_version_table_meta_data, resolve_version_table_meta_data,
    },
};

pub struct MigrationLoader {
    conventions: Box<dyn MigrationConventions>,
    default_version_table: Arc<dyn VersionTableMetaData>,
}

impl MigrationLoader {
    /// Create a loader with [`DefaultMigrationConventions`] and the built-in version table
    #[must_use]
    pub fn new() -> Self {
        Self {
            conventions: Box::new(DefaultMigrationConventions::new()),
            default_version_table: default_version_table_meta_data(),
        }
    }

    #[must_use]
    pub fn with_conventions(mut self, conventions: impl MigrationConventions + 'static) -> Self {
        self.conventions = Box::new(conventions);
        self
    }

    /// Replace the description used when a module registers none of its own
    #[must_use]
    pub fn with_default_version_table(
        mut self,
        version_table: impl VersionTableMetaData + 'static,
    ) -> Self {
        self.default_version_table = Arc::new(version_table);
        self
    }

    #[must_use]
    pub fn conventions(&self) -> &dyn MigrationConventions {
        self.conventions.as_ref()
    }

    /// Find the migrations registered in `module`, ordered by ascending version
    ///
    /// An empty `namespace` disables filtering. Migrations sharing a version keep their
    /// registration order.
    ///
    /// # Errors
    ///
    /// * If a migration type has no valid version
    pub fn find_migrations_in(
        &self,
        module: &Module,
        namespace: &str,
    ) -> Result<Vec<MigrationDescriptor>> {
        log::trace!(
            "find_migrations_in: scanning module '{}' ({} types) namespace='{namespace}'",
            module.name(),
            module.len(),
        );

        let mut migrations = Vec::new();

        for definition in module.types() {
            if !self.conventions.is_migration(definition) {
                continue;
            }
            if !definition.is_in_namespace(namespace) {
                log::trace!(
                    "find_migrations_in: skipping '{}' outside namespace '{namespace}'",
                    definition.full_name()
                );
                continue;
            }

            let version = self.conventions.migration_version(definition)?;
            log::trace!(
                "find_migrations_in: found migration '{}' version={version}",
                definition.full_name()
            );

            migrations.push(MigrationDescriptor {
                version,
                description: self.conventions.migration_description(definition),
                type_reference: definition.clone(),
            });
        }

        migrations.sort_by_key(|x| x.version);

        log::debug!(
            "Found {} migration(s) in module '{}'",
            migrations.len(),
            module.name()
        );

        Ok(migrations)
    }

    /// Find the profile migrations registered in `module` under `profile`
    ///
    /// Profiles keep their registration order. An empty `profile` matches nothing.
    #[must_use]
    pub fn find_profiles_in(&self, module: &Module, profile: &str) -> Vec<ProfileDescriptor> {
        if profile.is_empty() {
            return Vec::new();
        }

        module
            .types()
            .filter(|x| self.conventions.is_profile(x))
            .filter_map(|x| {
                let name = self.conventions.profile_name(x)?;
                (name == profile).then(|| ProfileDescriptor {
                    name,
                    type_reference: x.clone(),
                })
            })
            .collect()
    }

    /// Discover and instantiate the migrations registered in `module`
    ///
    /// # Errors
    ///
    /// * If a migration type has no valid version
    /// * If two migrations share a version
    /// * If a migration type has no migration factory
    pub fn load_migrations(
        &self,
        module: &Module,
        namespace: &str,
    ) -> Result<BTreeMap<u64, Box<dyn Migration>>> {
        let mut loaded = BTreeMap::new();
        let mut loaded_names: BTreeMap<u64, String> = BTreeMap::new();

        for descriptor in self.find_migrations_in(module, namespace)? {
            if let Some(first) = loaded_names.get(&descriptor.version) {
                return Err(MigrationError::DuplicateVersion {
                    version: descriptor.version,
                    first: first.clone(),
                    second: descriptor.type_name(),
                });
            }

            loaded.insert(descriptor.version, descriptor.instantiate()?);
            loaded_names.insert(descriptor.version, descriptor.type_name());
        }

        Ok(loaded)
    }

    /// Resolve the version table description for `module`
    ///
    /// Returns the module's own description if it registers exactly one, otherwise the
    /// loader's default.
    ///
    /// # Errors
    ///
    /// * If the module registers more than one version table description
    /// * If the registered description cannot be instantiated
    pub fn get_version_table_meta_data(
        &self,
        module: &Module,
    ) -> Result<Arc<dyn VersionTableMetaData>> {
        resolve_version_table_meta_data(
            self.conventions.as_ref(),
            module,
            &self.default_version_table,
        )
    }
}

impl Default for MigrationLoader {
    fn default() -> Self {
        Self::new()
    }
}
