use crate::stat::StatType;
use serde::Serialize;
use std::collections::BTreeMap;

/// The compiled statistics of one resource kind, keyed by statistic name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceSchema {
    stats: BTreeMap<String, StatType>,
}

impl ResourceSchema {
    pub fn new() -> ResourceSchema {
        ResourceSchema::default()
    }

    /// Declares `name`. A later declaration of the same name replaces the
    /// earlier one.
    pub fn declare(&mut self, name: impl Into<String>, stat_type: StatType) {
        self.stats.insert(name.into(), stat_type);
    }

    pub fn get(&self, name: &str) -> Option<&StatType> {
        self.stats.get(name)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, StatType)> for ResourceSchema {
    fn from_iter<I: IntoIterator<Item = (K, StatType)>>(iter: I) -> Self {
        let mut schema = ResourceSchema::new();
        for (name, ty) in iter {
            schema.declare(name, ty);
        }
        schema
    }
}

/// Every known resource kind and its schema.
///
/// A registry is assembled once (through [`FromIterator`]) and is read-only
/// afterwards, so one instance can be shared by any number of validations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, ResourceSchema>,
}

impl SchemaRegistry {
    /// Returns `None` when the resource kind has no declared schema.
    pub fn get(&self, resource_kind: &str) -> Option<&ResourceSchema> {
        self.schemas.get(resource_kind)
    }

    pub fn contains(&self, resource_kind: &str) -> bool {
        self.schemas.contains_key(resource_kind)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Resource kinds in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|k| k.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, ResourceSchema)> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = (K, ResourceSchema)>>(iter: I) -> Self {
        SchemaRegistry {
            schemas: iter.into_iter().map(|(k, s)| (k.into(), s)).collect(),
        }
    }
}
