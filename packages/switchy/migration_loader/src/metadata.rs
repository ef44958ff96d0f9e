//! # Type Metadata
//!
//! The inspection layer the loader scans. A [`Module`] is an ordered registry of
//! [`TypeDefinition`]s, each describing one type: its name and namespace, whether it is
//! abstract, the markers ([`Attribute`]s) attached to it, the contracts it implements
//! ([`Capability`]), and how to construct it ([`TypeFactory`]).
//!
//! Modules are populated by explicit registration:
//!
//! ```rust
//! use switchy_migration_loader::metadata::{Capability, Module, TypeDefinition};
//!
//! let module = Module::builder("app")
//!     .register(TypeDefinition::migration("CreateUsers", "app.migrations", 1))
//!     .register(
//!         TypeDefinition::new("MigrationBase", "app.migrations")
//!             .with_abstract(true)
//!             .with_capability(Capability::Migration),
//!     )
//!     .build();
//!
//! assert_eq!(module.len(), 2);
//! ```
//!
//! or, for concrete Rust types, with [`migration_module!`](crate::migration_module), which
//! derives the name and namespace from the type path.

use std::{collections::BTreeMap, collections::BTreeSet, fmt, sync::Arc};

use crate::{
    conventions::{MIGRATION_ATTRIBUTE, PROFILE_ATTRIBUTE, VERSION_TABLE_META_DATA_ATTRIBUTE},
    migration::Migration,
    version::VersionTableMetaData,
};

/// A single argument value carried by an [`Attribute`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl AttributeValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            Self::Int(_) | Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "\"{value}\""),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// A declarative marker attached to a type
///
/// Markers have a name plus positional and named arguments, e.g. a migration marker
/// `Migration(20240101, description = "create users")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    args: Vec<AttributeValue>,
    named: BTreeMap<String, AttributeValue>,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            named: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, value: impl Into<AttributeValue>) -> Self {
        self.args.push(value.into());
        self
    }

    #[must_use]
    pub fn named(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn args(&self) -> &[AttributeValue] {
        &self.args
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.named.get(key)
    }
}

/// Contracts a registered type implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Migration,
    VersionTableMetaData,
}

/// Constructor for a concrete registered type
#[derive(Debug, Clone, Copy)]
pub enum TypeFactory {
    Migration(fn() -> Box<dyn Migration>),
    VersionTableMetaData(fn() -> Box<dyn VersionTableMetaData>),
}

/// Metadata describing one type registered in a [`Module`]
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    name: String,
    namespace: String,
    is_abstract: bool,
    attributes: Vec<Attribute>,
    capabilities: BTreeSet<Capability>,
    factory: Option<TypeFactory>,
}

impl TypeDefinition {
    /// Create a concrete type with no markers, capabilities or factory
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            is_abstract: false,
            attributes: Vec::new(),
            capabilities: BTreeSet::new(),
            factory: None,
        }
    }

    /// Create a type named after the Rust type `T`
    ///
    /// The namespace is the module path of `T` (e.g. `my_app::migrations`), the name is the
    /// last path segment including its generic arguments, so `Wrapper<u8>` and `Wrapper<u16>`
    /// stay distinct.
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        let path = std::any::type_name::<T>();
        let (base, generics) = path.find('<').map_or((path, ""), |i| path.split_at(i));

        match base.rsplit_once("::") {
            Some((namespace, name)) => Self::new(format!("{name}{generics}"), namespace),
            None => Self::new(path, ""),
        }
    }

    /// Create a migration type carrying a `Migration(version)` marker
    ///
    /// The type has no factory; use [`Self::of_migration`] for types that can be instantiated.
    #[must_use]
    pub fn migration(name: impl Into<String>, namespace: impl Into<String>, version: i64) -> Self {
        Self::new(name, namespace)
            .with_capability(Capability::Migration)
            .with_attribute(Attribute::new(MIGRATION_ATTRIBUTE).arg(version))
    }

    /// Register the concrete migration `T` under the given version
    #[must_use]
    pub fn of_migration<T: Migration + Default + 'static>(version: i64) -> Self {
        Self::of::<T>()
            .with_attribute(Attribute::new(MIGRATION_ATTRIBUTE).arg(version))
            .with_factory(TypeFactory::Migration(|| -> Box<dyn Migration> {
                Box::new(T::default())
            }))
    }

    /// Register the concrete profile migration `T` under the given profile name
    #[must_use]
    pub fn of_profile<T: Migration + Default + 'static>(profile: &str) -> Self {
        Self::of::<T>()
            .with_attribute(Attribute::new(PROFILE_ATTRIBUTE).arg(profile))
            .with_factory(TypeFactory::Migration(|| -> Box<dyn Migration> {
                Box::new(T::default())
            }))
    }

    /// Register the concrete version table meta data `T`
    #[must_use]
    pub fn of_version_table<T: VersionTableMetaData + Default + 'static>() -> Self {
        Self::of::<T>()
            .with_attribute(Attribute::new(VERSION_TABLE_META_DATA_ATTRIBUTE))
            .with_factory(TypeFactory::VersionTableMetaData(
                || -> Box<dyn VersionTableMetaData> { Box::new(T::default()) },
            ))
    }

    #[must_use]
    pub const fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Attach a factory, which also grants the matching [`Capability`]
    #[must_use]
    pub fn with_factory(mut self, factory: TypeFactory) -> Self {
        self.capabilities.insert(match factory {
            TypeFactory::Migration(_) => Capability::Migration,
            TypeFactory::VersionTableMetaData(_) => Capability::VersionTableMetaData,
        });
        self.factory = Some(factory);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The namespace-qualified name, joined with the separator the namespace itself uses
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else if self.namespace.contains("::") {
            format!("{}::{}", self.namespace, self.name)
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// First marker with the given name
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|x| x.name() == name)
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    #[must_use]
    pub fn implements(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    #[must_use]
    pub const fn factory(&self) -> Option<TypeFactory> {
        self.factory
    }

    /// Whether this type lives in `namespace` or a namespace nested below it
    ///
    /// Matching is done on whole segments, so `A.B` contains `A.B.C` but not `A.BC`.
    /// Segments may be separated by `.` or `::`. An empty `namespace` contains everything, while
    /// a filter with empty segments (`"."`, `"A..B"`) never matches a real namespace.
    #[must_use]
    pub fn is_in_namespace(&self, namespace: &str) -> bool {
        if namespace.is_empty() {
            return true;
        }
        if self.namespace.is_empty() {
            return false;
        }

        let mut own = namespace_segments(&self.namespace);

        namespace_segments(namespace).all(|segment| own.next() == Some(segment))
    }
}

fn namespace_segments(namespace: &str) -> impl Iterator<Item = &str> {
    namespace.split("::").flat_map(|x| x.split('.'))
}

/// A loaded collection of type definitions
///
/// Types are enumerated in registration order.
#[derive(Debug, Clone, Default)]
pub struct Module {
    name: String,
    types: Vec<Arc<TypeDefinition>>,
}

impl Module {
    #[must_use]
    pub fn new(name: impl Into<String>, types: impl IntoIterator<Item = TypeDefinition>) -> Self {
        Self {
            name: name.into(),
            types: types.into_iter().map(Arc::new).collect(),
        }
    }

    #[must_use]
    pub fn builder(name: impl Into<String>) -> ModuleBuilder {
        ModuleBuilder {
            module: Self {
                name: name.into(),
                types: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> impl Iterator<Item = &Arc<TypeDefinition>> {
        self.types.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    #[must_use]
    pub fn register(mut self, definition: TypeDefinition) -> Self {
        self.module.types.push(Arc::new(definition));
        self
    }

    #[must_use]
    pub fn register_all(mut self, definitions: impl IntoIterator<Item = TypeDefinition>) -> Self {
        self.module
            .types
            .extend(definitions.into_iter().map(Arc::new));
        self
    }

    #[must_use]
    pub fn build(self) -> Module {
        self.module
    }
}

/// Build a [`Module`] from concrete Rust types
///
/// ```rust
/// use switchy_migration_loader::{
///     migration::{Migration, MigrationContext},
///     migration_module,
///     version::VersionTableMetaData,
/// };
///
/// #[derive(Default)]
/// struct CreateUsers;
///
/// impl Migration for CreateUsers {
///     fn up(&self, ctx: &mut dyn MigrationContext) {
///         ctx.execute("CREATE TABLE users (id INTEGER PRIMARY KEY)");
///     }
/// }
///
/// #[derive(Default)]
/// struct AppVersionTable;
///
/// impl VersionTableMetaData for AppVersionTable {
///     fn table_name(&self) -> &str {
///         "app_versions"
///     }
/// }
///
/// let module = migration_module!("app",
///     migrations: [CreateUsers => 1],
///     version_table: AppVersionTable,
/// );
///
/// assert_eq!(module.len(), 2);
/// ```
#[macro_export]
macro_rules! migration_module {
    (
        $name:expr,
        migrations: [$($migration:ty => $version:expr),* $(,)?]
        $(, profiles: [$($profile_ty:ty => $profile:expr),* $(,)?])?
        $(, version_table: $version_table:ty)?
        $(,)?
    ) => {{
        #[allow(unused_mut)]
        let mut builder = $crate::metadata::Module::builder($name);
        $(
            builder = builder.register(
                $crate::metadata::TypeDefinition::of_migration::<$migration>($version),
            );
        )*
        $($(
            builder = builder.register(
                $crate::metadata::TypeDefinition::of_profile::<$profile_ty>($profile),
            );
        )*)?
        $(
            builder = builder.register(
                $crate::metadata::TypeDefinition::of_version_table::<$version_table>(),
            );
        )?
        builder.build()
    }};
}
