//! Provider: an explicit registry of resource types
//!
//! Providers are built by a factory function and composed at startup. There
//! is no process-wide table.

use crate::resource::{BoxedResource, Resource};
use anyhow::{Result, bail};
use std::collections::BTreeMap;

/// Resource types offered by one provider
pub struct Provider<M: ?Sized> {
    name: &'static str,
    resources: BTreeMap<&'static str, BoxedResource<M>>,
}

impl<M: ?Sized> Provider<M> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            resources: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a resource type
    ///
    /// Registering the same type name twice is an error.
    pub fn register(&mut self, resource: BoxedResource<M>) -> Result<()> {
        let type_name = resource.type_name();
        if self.resources.contains_key(type_name) {
            bail!(
                "resource type '{}' is already registered with provider '{}'",
                type_name,
                self.name
            );
        }
        self.resources.insert(type_name, resource);
        Ok(())
    }

    /// Look up a resource type
    pub fn resource(&self, type_name: &str) -> Option<&dyn Resource<M>> {
        self.resources.get(type_name).map(|r| r.as_ref())
    }

    /// Registered type names, sorted
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }
}

impl<M: ?Sized> std::fmt::Debug for Provider<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ResourceData;
    use crate::schema::Schema;

    #[derive(Debug, Default)]
    struct Dummy {
        schema: Schema,
    }

    impl Resource<()> for Dummy {
        fn type_name(&self) -> &'static str {
            "dummy"
        }
        fn schema(&self) -> &Schema {
            &self.schema
        }
        fn create(&self, _data: &mut ResourceData, _meta: &()) -> Result<()> {
            Ok(())
        }
        fn read(&self, _data: &mut ResourceData, _meta: &()) -> Result<()> {
            Ok(())
        }
        fn update(&self, _data: &mut ResourceData, _meta: &()) -> Result<()> {
            Ok(())
        }
        fn delete(&self, _data: &mut ResourceData, _meta: &()) -> Result<()> {
            Ok(())
        }
        fn exists(&self, _data: &ResourceData, _meta: &()) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut provider: Provider<()> = Provider::new("test");
        provider.register(Box::new(Dummy::default())).unwrap();

        assert!(provider.resource("dummy").is_some());
        assert!(provider.resource("other").is_none());
        assert_eq!(provider.resource_types().collect::<Vec<_>>(), vec!["dummy"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut provider: Provider<()> = Provider::new("test");
        provider.register(Box::new(Dummy::default())).unwrap();

        let err = provider.register(Box::new(Dummy::default())).unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }
}
