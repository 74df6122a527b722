//! Alias registry for type-preserving decode
//!
//! A configuration crosses the process boundary as `{ "alias": .., "payload": .. }`.
//! The reading side registers every concrete type it understands under its
//! alias before decoding; the registry then turns a payload back into that
//! exact type rather than a generic value tree.

use crate::errors::CodecError;
use crate::value::{from_value, to_value, ConfigurationValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A configuration type that can travel under an alias.
///
/// ```ignore
/// #[derive(Debug, Serialize, Deserialize)]
/// struct LintConfiguration { rules: Vec<String> }
///
/// impl Aliased for LintConfiguration {
///     const ALIAS: &'static str = "LintConfiguration";
/// }
/// ```
pub trait Aliased: Serialize + DeserializeOwned + fmt::Debug + Any {
    const ALIAS: &'static str;
}

/// Object-safe view of an [`Aliased`] value
pub trait AnyConfiguration: Any + fmt::Debug {
    fn alias(&self) -> &'static str;
    fn type_name(&self) -> &'static str;
    fn to_payload(&self) -> Result<ConfigurationValue, CodecError>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Aliased> AnyConfiguration for T {
    fn alias(&self) -> &'static str {
        T::ALIAS
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn to_payload(&self) -> Result<ConfigurationValue, CodecError> {
        to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn AnyConfiguration {
    pub fn is<T: Aliased>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Aliased>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast<T: Aliased>(self: Box<Self>) -> Result<T, Box<dyn Any>> {
        self.into_any().downcast::<T>().map(|boxed| *boxed)
    }
}

/// Wire form of one named configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasedPayload {
    pub alias: String,
    pub payload: ConfigurationValue,
}

impl AliasedPayload {
    pub fn new(alias: impl Into<String>, payload: ConfigurationValue) -> Self {
        AliasedPayload {
            alias: alias.into(),
            payload,
        }
    }

    /// Wrap a concrete configuration under its own alias
    pub fn wrap(configuration: &dyn AnyConfiguration) -> Result<Self, CodecError> {
        Ok(AliasedPayload {
            alias: configuration.alias().to_string(),
            payload: configuration.to_payload()?,
        })
    }
}

type Decoder = fn(&str, &ConfigurationValue) -> Result<Box<dyn AnyConfiguration>, CodecError>;

#[derive(Clone, Copy)]
struct Registration {
    type_id: TypeId,
    type_name: &'static str,
    decode: Decoder,
}

fn decode_boxed<T: Aliased>(
    alias: &str,
    payload: &ConfigurationValue,
) -> Result<Box<dyn AnyConfiguration>, CodecError> {
    match from_value::<T>(payload) {
        Ok(value) => Ok(Box::new(value)),
        Err(CodecError::Serialize(reason)) => Err(CodecError::PayloadMismatch {
            alias: alias.to_string(),
            type_name: std::any::type_name::<T>(),
            reason,
        }),
        Err(e) => Err(e),
    }
}

/// Table from alias to the decoder of its concrete type
#[derive(Default, Clone)]
pub struct AliasRegistry {
    entries: BTreeMap<String, Registration>,
}

impl fmt::Debug for AliasRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(alias, reg)| (alias, reg.type_name)))
            .finish()
    }
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under its own alias
    pub fn register<T: Aliased>(&mut self) -> Result<&mut Self, CodecError> {
        self.register_as::<T>(T::ALIAS)
    }

    /// Register `T` under an explicit alias.
    ///
    /// Registering the same type under the same alias again is a no-op; a
    /// different type under a taken alias is an [`CodecError::AliasConflict`].
    pub fn register_as<T: Aliased>(&mut self, alias: &str) -> Result<&mut Self, CodecError> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        if let Some(existing) = self.entries.get(alias) {
            if existing.type_id == type_id {
                return Ok(self);
            }
            return Err(CodecError::AliasConflict {
                alias: alias.to_string(),
                registered: existing.type_name,
                attempted: type_name,
            });
        }

        debug!("Registering alias '{}' for {}", alias, type_name);
        self.entries.insert(
            alias.to_string(),
            Registration {
                type_id,
                type_name,
                decode: decode_boxed::<T>,
            },
        );
        Ok(self)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode a wrapper into the type registered for its alias
    pub fn decode(&self, wrapped: &AliasedPayload) -> Result<Box<dyn AnyConfiguration>, CodecError> {
        let registration = self
            .entries
            .get(&wrapped.alias)
            .ok_or_else(|| CodecError::UnregisteredAlias(wrapped.alias.clone()))?;
        (registration.decode)(&wrapped.alias, &wrapped.payload)
    }

    /// Decode a wrapper and require it to be a `T`
    pub fn decode_as<T: Aliased>(&self, wrapped: &AliasedPayload) -> Result<T, CodecError> {
        let decoded = self.decode(wrapped)?;
        decoded.downcast::<T>().map_err(|_| CodecError::AliasTypeMismatch {
            alias: wrapped.alias.clone(),
            registered: self
                .entries
                .get(&wrapped.alias)
                .map_or("an unregistered type", |r| r.type_name),
            expected: std::any::type_name::<T>(),
        })
    }
}
