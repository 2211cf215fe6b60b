//! Name-keyed collections of owned objects with a metadata catalog.

use log::{debug, warn};
use shared::Metadata;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::domain::budget::Budget;
use crate::domain::dataset::{Table, SIZE_FIELD};
use crate::domain::entity::{Entity, NAME_FIELD};
use crate::domain::record_table::Ledger;
use crate::error::{Result, ZenithError};

pub const BASE_OBJECT_FIELD: &str = "Base_Object";

/// Anything a [`Collection`] can hold: named, and able to describe itself
pub trait Catalogued {
    /// Reported as `Base_Object` in the collection metadata
    const KIND: &'static str;

    fn name(&self) -> &str;

    fn metadata(&self) -> Metadata;
}

impl Catalogued for Entity {
    const KIND: &'static str = "Entity";

    fn name(&self) -> &str {
        &self.name
    }

    fn metadata(&self) -> Metadata {
        Entity::metadata(self)
    }
}

impl Catalogued for Table {
    const KIND: &'static str = "Table";

    fn name(&self) -> &str {
        &self.entity.name
    }

    fn metadata(&self) -> Metadata {
        Table::metadata(self)
    }
}

impl Catalogued for Ledger {
    const KIND: &'static str = "Ledger";

    fn name(&self) -> &str {
        Ledger::name(self)
    }

    fn metadata(&self) -> Metadata {
        Ledger::metadata(self)
    }
}

impl Catalogued for Budget {
    const KIND: &'static str = "Budget";

    fn name(&self) -> &str {
        Budget::name(self)
    }

    fn metadata(&self) -> Metadata {
        Budget::metadata(self)
    }
}

/// Owned copies of objects, keyed by name, with one catalog row per object
#[derive(Debug, Clone)]
pub struct Collection<T: Catalogued + Clone> {
    pub entity: Entity,
    items: BTreeMap<String, T>,
    catalog: Vec<Metadata>,
}

impl<T: Catalogued + Clone> Default for Collection<T> {
    fn default() -> Self {
        Self::new("MyCollection", Some("Col0"))
    }
}

impl<T: Catalogued + Clone> Collection<T> {
    pub fn new(name: &str, alias: Option<&str>) -> Self {
        Self {
            entity: Entity::new(name, alias),
            items: BTreeMap::new(),
            catalog: Vec::new(),
        }
    }

    /// Store a copy of `item`. An item with the same name is replaced.
    pub fn append(&mut self, item: &T) {
        let copy = item.clone();
        let name = copy.name().to_string();
        self.catalog
            .retain(|row| row.get(NAME_FIELD) != Some(name.as_str()));
        self.catalog.push(copy.metadata());
        self.items.insert(name.clone(), copy);
        self.sort_catalog();
        debug!("Appended {} to collection {}", name, self.entity.name);
    }

    pub fn remove(&mut self, name: &str) -> Result<T> {
        let item = self.items.remove(name).ok_or_else(|| {
            ZenithError::NotFound(format!("{} in collection {}", name, self.entity.name))
        })?;
        self.catalog.retain(|row| row.get(NAME_FIELD) != Some(name));
        self.sort_catalog();
        debug!("Removed {} from collection {}", name, self.entity.name);
        Ok(item)
    }

    /// Sort the catalog by name. With `details`, rebuild it from each
    /// item's current metadata and re-key items whose name changed.
    ///
    /// Fails with `Integrity`, changing nothing, when two items now share a name.
    pub fn update(&mut self, details: bool) -> Result<()> {
        if details {
            let mut names = HashSet::new();
            for item in self.items.values() {
                if !names.insert(item.name()) {
                    warn!(
                        "⚠️ Two items of collection {} are named {}",
                        self.entity.name,
                        item.name()
                    );
                    return Err(ZenithError::Integrity(format!(
                        "name {} used twice in collection {}",
                        item.name(),
                        self.entity.name
                    )));
                }
            }

            let items = std::mem::take(&mut self.items);
            self.items = items
                .into_values()
                .map(|item| (item.name().to_string(), item))
                .collect();
            self.catalog = self.items.values().map(Catalogued::metadata).collect();
        }
        self.sort_catalog();
        Ok(())
    }

    fn sort_catalog(&mut self) {
        self.catalog.sort_by(|a, b| a.get(NAME_FIELD).cmp(&b.get(NAME_FIELD)));
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.get(name)
    }

    /// Mutable access; call `update(true)` after renaming
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.items.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Items in name order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn catalog(&self) -> &[Metadata] {
        &self.catalog
    }

    pub fn size(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn metadata(&self) -> Metadata {
        let mut metadata = self.entity.metadata();
        metadata.insert(SIZE_FIELD, self.size().to_string());
        metadata.insert(BASE_OBJECT_FIELD, T::KIND);
        metadata
    }
}

impl<T: Catalogued + Clone> fmt::Display for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{} ({})]", self.entity.name, self.entity.alias)?;
        write!(f, "{}", self.metadata())?;
        writeln!(f, "Catalog:")?;
        for row in &self.catalog {
            let line: Vec<&str> = row.iter().map(|(_, v)| v).collect();
            writeln!(f, "{}", line.join(";"))?;
        }
        Ok(())
    }
}
