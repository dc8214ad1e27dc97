//! # Custom Mapper Registry
//!
//! Mappings of kind `transformer` name a custom mapper by identifier. The
//! registry maps identifiers to factory closures and is populated once at
//! start-up; it is read-only afterwards and may be shared across threads.
//!
//! Aliases let deployments keep historical transformer names working
//! (`ScheduleTransformer` → `schedule`) without registering the mapper twice.

use std::collections::HashMap;
use std::sync::Arc;

use suro_core::{MappingKind, OutputMapping};

use crate::error::{MapperResult, ResultError};

use super::{Mapper, ScheduleMapper};

/// Builds a fresh mapper handle.
pub type MapperFactory = Arc<dyn Fn() -> Mapper + Send + Sync>;

/// Identifier → factory table for custom mappers.
#[derive(Clone, Default)]
pub struct MapperRegistry {
    factories: HashMap<String, MapperFactory>,
    aliases: HashMap<String, String>,
}

impl MapperRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the bundled custom mappers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(ScheduleMapper::ID, || Mapper::document(ScheduleMapper));
        registry
    }

    /// Register a factory under `id`, replacing any previous one.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Mapper + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
    }

    /// Make `alias` resolve to the mapper registered as `target`.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    /// Whether `id` resolves, directly or through an alias.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(self.canonical(id))
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    fn canonical<'a>(&'a self, id: &'a str) -> &'a str {
        self.aliases.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Build the custom mapper registered as `id`.
    ///
    /// # Errors
    ///
    /// [`ResultError::UnknownCustomMapper`] when nothing is registered.
    pub fn resolve_custom(&self, id: &str) -> MapperResult<Mapper> {
        self.factories
            .get(self.canonical(id))
            .map(|factory| factory())
            .ok_or_else(|| ResultError::UnknownCustomMapper(id.to_string()))
    }

    /// Resolve the mapper for an output mapping: the built-in mapper for its
    /// kind, or the registered custom mapper it names.
    ///
    /// # Errors
    ///
    /// [`ResultError::MissingCustomId`] for a custom mapping without an
    /// identifier, [`ResultError::UnknownCustomMapper`] for an unregistered
    /// one.
    pub fn resolve(&self, mapping: &OutputMapping) -> MapperResult<Mapper> {
        if let Some(mapper) = Mapper::builtin(mapping.kind) {
            return Ok(mapper);
        }
        debug_assert_eq!(mapping.kind, MappingKind::Custom);
        let id = mapping
            .custom_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ResultError::MissingCustomId(mapping.file_name.clone()))?;
        self.resolve_custom(id)
    }
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperRegistry")
            .field("ids", &self.ids())
            .field("aliases", &self.aliases)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use suro_core::ArtifactFormat;

    use super::*;
    use crate::artifact::Table;
    use crate::mapper::RowMapper;
    use crate::validation::ValidationReport;

    struct Echo;

    impl RowMapper for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn check(&self, _mapping: &OutputMapping) -> ValidationReport {
            ValidationReport::ok()
        }

        fn produce_rows(&self, _mapping: &OutputMapping, _solution: &Value) -> MapperResult<Table> {
            Ok(Table::new(vec!["echo".into()]))
        }
    }

    #[test]
    fn builtins_include_schedule() {
        let registry = MapperRegistry::with_builtins();
        assert!(registry.contains("schedule"));
        assert_eq!(registry.ids(), vec!["schedule"]);
    }

    #[test]
    fn resolves_builtin_kinds_without_registration() {
        let registry = MapperRegistry::new();
        let mapping = OutputMapping::new("a.csv", MappingKind::Flat);
        assert_eq!(registry.resolve(&mapping).unwrap().name(), "key-to-column");
    }

    #[test]
    fn resolves_registered_custom_mapper() {
        let mut registry = MapperRegistry::new();
        registry.register("echo", || Mapper::rows(Echo));
        let mapping = OutputMapping::new("e.csv", MappingKind::Custom).with_custom_id("echo");
        let mapper = registry.resolve(&mapping).unwrap();
        assert_eq!(mapper.format(), ArtifactFormat::Csv);
        let artifact = mapper.produce(&mapping, &json!({})).unwrap();
        assert_eq!(artifact.to_bytes().unwrap(), b"echo".to_vec());
    }

    #[test]
    fn alias_resolves_to_target() {
        let mut registry = MapperRegistry::with_builtins();
        registry.alias("ScheduleTransformer", "schedule");
        assert!(registry.contains("ScheduleTransformer"));
        assert_eq!(registry.resolve_custom("ScheduleTransformer").unwrap().name(), "schedule");
    }

    #[test]
    fn unknown_and_missing_ids_fail() {
        let registry = MapperRegistry::with_builtins();
        let unknown = OutputMapping::new("x.json", MappingKind::Custom).with_custom_id("nope");
        assert!(matches!(
            registry.resolve(&unknown),
            Err(ResultError::UnknownCustomMapper(id)) if id == "nope"
        ));
        let missing = OutputMapping::new("x.json", MappingKind::Custom);
        assert!(matches!(
            registry.resolve(&missing),
            Err(ResultError::MissingCustomId(_))
        ));
    }
}
