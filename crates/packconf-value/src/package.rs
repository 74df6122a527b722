//! Configuration documents exchanged through the handoff file
//!
//! Two shapes exist. [`PackageConfig`] maps logical names to aliased payloads
//! and decodes them through an [`AliasRegistry`]. [`UntypedConfiguration`] is a
//! flat object of plain values for tools that need no concrete types.

use crate::errors::{CodecError, HandoffError};
use crate::handoff::HandoffChannel;
use crate::registry::{Aliased, AliasRegistry, AliasedPayload, AnyConfiguration};
use crate::value::ConfigurationValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Logical name a configuration is stored under
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    pub fn new(name: impl Into<String>) -> Self {
        PackageName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageName {
    fn from(name: &str) -> Self {
        PackageName(name.to_string())
    }
}

impl From<String> for PackageName {
    fn from(name: String) -> Self {
        PackageName(name)
    }
}

/// Wire form of a [`PackageConfig`]
pub type PackageConfigDocument = BTreeMap<PackageName, AliasedPayload>;

/// Named, heterogeneous configurations
#[derive(Debug, Default)]
pub struct PackageConfig {
    configurations: BTreeMap<PackageName, Box<dyn AnyConfiguration>>,
}

impl PackageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with<T: Aliased>(mut self, name: impl Into<PackageName>, configuration: T) -> Self {
        self.insert(name, configuration);
        self
    }

    pub fn insert<T: Aliased>(
        &mut self,
        name: impl Into<PackageName>,
        configuration: T,
    ) -> Option<Box<dyn AnyConfiguration>> {
        self.configurations
            .insert(name.into(), Box::new(configuration))
    }

    pub fn get(&self, name: &str) -> Option<&dyn AnyConfiguration> {
        self.configurations
            .get(&PackageName::from(name))
            .map(|boxed| &**boxed)
    }

    /// Typed lookup; `None` when absent or of another type
    pub fn get_as<T: Aliased>(&self, name: &str) -> Option<&T> {
        self.get(name).and_then(|config| config.downcast_ref::<T>())
    }

    /// Remove and return the configuration named `name` as a `T`
    pub fn take<T: Aliased>(&mut self, name: &str) -> Result<T, CodecError> {
        let key = PackageName::from(name);
        let boxed = self
            .configurations
            .remove(&key)
            .ok_or_else(|| CodecError::MissingEntry(name.to_string()))?;
        let alias = boxed.alias();

        if !boxed.is::<T>() {
            self.configurations.insert(key, boxed);
            return Err(CodecError::TypeMismatch {
                name: name.to_string(),
                alias: alias.to_string(),
                expected: std::any::type_name::<T>(),
            });
        }

        boxed.downcast::<T>().map_err(|_| CodecError::TypeMismatch {
            name: name.to_string(),
            alias: alias.to_string(),
            expected: std::any::type_name::<T>(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &PackageName> {
        self.configurations.keys()
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    pub fn encode(&self) -> Result<PackageConfigDocument, CodecError> {
        self.configurations
            .iter()
            .map(|(name, config)| AliasedPayload::wrap(&**config).map(|w| (name.clone(), w)))
            .collect()
    }

    pub fn decode(
        document: &PackageConfigDocument,
        registry: &AliasRegistry,
    ) -> Result<Self, CodecError> {
        let configurations = document
            .iter()
            .map(|(name, wrapped)| registry.decode(wrapped).map(|c| (name.clone(), c)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(PackageConfig { configurations })
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let document = self.encode()?;
        serde_json::to_vec_pretty(&document).map_err(|e| CodecError::Serialize(e.to_string()))
    }

    pub fn from_json_bytes(bytes: &[u8], registry: &AliasRegistry) -> Result<Self, CodecError> {
        let document: PackageConfigDocument =
            serde_json::from_slice(bytes).map_err(|e| CodecError::Serialize(e.to_string()))?;
        Self::decode(&document, registry)
    }

    /// Hand the configurations off to the waiting tool
    pub fn write(&self) -> Result<PathBuf, HandoffError> {
        let channel = HandoffChannel::from_env();
        self.write_to(&channel)?;
        Ok(channel.path().to_path_buf())
    }

    pub fn write_to(&self, channel: &HandoffChannel) -> Result<(), HandoffError> {
        let bytes = self.to_json_bytes()?;
        channel.write_bytes(&bytes)
    }
}

/// Flat string-keyed document of plain values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UntypedConfiguration {
    values: BTreeMap<String, ConfigurationValue>,
}

impl UntypedConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigurationValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigurationValue> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigurationValue::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, ConfigurationValue> {
        self.values
    }
}

impl From<BTreeMap<String, ConfigurationValue>> for UntypedConfiguration {
    fn from(values: BTreeMap<String, ConfigurationValue>) -> Self {
        UntypedConfiguration { values }
    }
}
