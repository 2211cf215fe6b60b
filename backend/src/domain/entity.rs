//! Base identity of every bookkeeping object.
//!
//! An [`Entity`] only knows its `name` and `alias`. Richer objects embed one
//! and extend its metadata with their own attributes, so a metadata listing
//! always starts with `Name` and `Alias`.

use log::info;
use shared::Metadata;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Result, ZenithError};
use crate::storage::CsvStorage;

pub const NAME_FIELD: &str = "Name";
pub const ALIAS_FIELD: &str = "Alias";
/// Key column of attribute bootstrap files
pub const ATTRIBUTE_FIELD: &str = "Attribute";
/// Value column of attribute bootstrap files
pub const VALUE_FIELD: &str = "Value";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub alias: String,
    bootfile: Option<PathBuf>,
    folder_bootfile: PathBuf,
}

impl Entity {
    /// Create an entity. Without an alias, one is derived from the name.
    pub fn new(name: impl Into<String>, alias: Option<&str>) -> Self {
        let name = name.into();
        let alias = match alias {
            Some(alias) => alias.to_string(),
            None => Self::derive_alias(&name),
        };
        Self {
            name,
            alias,
            bootfile: None,
            folder_bootfile: PathBuf::from("."),
        }
    }

    /// First and last characters of `name`, or `name` itself when shorter than two characters
    pub fn derive_alias(name: &str) -> String {
        let mut chars = name.chars();
        match (chars.next(), chars.next_back()) {
            (Some(first), Some(last)) => format!("{}{}", first, last),
            _ => name.to_string(),
        }
    }

    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(NAME_FIELD, self.name.as_str());
        metadata.insert(ALIAS_FIELD, self.alias.as_str());
        metadata
    }

    /// Overwrite name and alias from a mapping keyed like [`Entity::metadata`]
    pub fn set(&mut self, values: &Metadata) -> Result<()> {
        let name = required(values, NAME_FIELD)?;
        let alias = required(values, ALIAS_FIELD)?;
        self.name = name.to_string();
        self.alias = alias.to_string();
        Ok(())
    }

    /// Read an `Attribute;Value` file and apply it with [`Entity::set`]
    pub fn load_from_table(&mut self, path: &Path) -> Result<()> {
        let values = Self::read_boot_table(path)?;
        self.set_from_boot(&values, path)
    }

    /// Alias of [`Entity::load_from_table`]
    pub fn boot(&mut self, path: &Path) -> Result<()> {
        self.load_from_table(path)
    }

    /// Read an attribute bootstrap file without applying it
    pub fn read_boot_table(path: &Path) -> Result<Metadata> {
        CsvStorage::default().read_pairs(path, ATTRIBUTE_FIELD, VALUE_FIELD)
    }

    /// Apply bootstrap values and remember the file and its folder.
    ///
    /// Nothing changes when the values are rejected.
    pub fn set_from_boot(&mut self, values: &Metadata, path: &Path) -> Result<()> {
        self.set(values)?;

        self.bootfile = Some(path.to_path_buf());
        self.folder_bootfile = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        info!("📋 Booting {} from {}", self.name, path.display());
        Ok(())
    }

    pub fn bootfile(&self) -> Option<&Path> {
        self.bootfile.as_deref()
    }

    pub fn folder_bootfile(&self) -> &Path {
        &self.folder_bootfile
    }

    /// Resolve a data file named in a bootstrap file.
    ///
    /// Existing paths are used as given; anything else is taken relative to
    /// the bootstrap file's folder.
    pub fn resolve_path(&self, file: &str) -> PathBuf {
        let path = PathBuf::from(file);
        if path.is_file() || path.is_absolute() {
            path
        } else {
            self.folder_bootfile.join(path)
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{} ({})]", self.name, self.alias)?;
        write!(f, "{}", self.metadata())
    }
}

/// Look up a mandatory attribute
pub(crate) fn required<'a>(values: &'a Metadata, key: &str) -> Result<&'a str> {
    values
        .get(key)
        .ok_or_else(|| ZenithError::Parse(format!("missing attribute {}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;

    #[test]
    fn test_alias_is_derived_from_name() {
        assert_eq!(Entity::new("Algo", None).alias, "Ao");
        assert_eq!(Entity::new("X", None).alias, "X");
        assert_eq!(Entity::new("", None).alias, "");
        assert_eq!(Entity::new("Algo", Some("al")).alias, "al");
    }

    #[test]
    fn test_set_metadata_is_a_fixed_point() {
        let mut entity = Entity::new("Algo", Some("al"));
        let before = entity.clone();
        let metadata = entity.metadata();
        entity.set(&metadata).unwrap();
        assert_eq!(entity, before);
    }

    #[test]
    fn test_set_requires_name_and_alias() {
        let mut entity = Entity::new("Algo", None);
        let values: Metadata = [("Name", "Other")].into_iter().collect();
        assert!(matches!(entity.set(&values), Err(ZenithError::Parse(_))));
        assert_eq!(entity.name, "Algo");
    }

    #[test]
    fn test_load_from_table() {
        let env = TestEnvironment::new().unwrap();
        let path = env.write_file("boot.csv", "Attribute;Value\nName;ResTia\nAlias;Ra\n");

        let mut entity = Entity::new("Algo", None);
        entity.load_from_table(&path).unwrap();
        assert_eq!(entity.name, "ResTia");
        assert_eq!(entity.alias, "Ra");
        assert_eq!(entity.bootfile(), Some(path.as_path()));
        assert_eq!(entity.folder_bootfile(), env.base_directory());
        assert_eq!(entity.resolve_path("data.csv"), env.path("data.csv"));
    }

    #[test]
    fn test_load_from_table_errors() {
        let env = TestEnvironment::new().unwrap();
        let mut entity = Entity::new("Algo", None);

        let missing = entity.load_from_table(&env.path("missing.csv"));
        assert!(matches!(missing, Err(ZenithError::NotFound(_))));

        let bad = env.write_file("bad.csv", "Key;Value\nName;ResTia\n");
        assert!(matches!(entity.load_from_table(&bad), Err(ZenithError::Parse(_))));
    }

    #[test]
    fn test_rejected_boot_file_leaves_entity_untouched() {
        let env = TestEnvironment::new().unwrap();
        let path = env.write_file("boot.csv", "Attribute;Value\nName;ResTia\n");

        let mut entity = Entity::new("Algo", None);
        let before = entity.clone();
        assert!(matches!(entity.load_from_table(&path), Err(ZenithError::Parse(_))));
        assert_eq!(entity, before);
        assert_eq!(entity.bootfile(), None);
        assert_eq!(entity.folder_bootfile(), Path::new("."));
    }

    #[test]
    fn test_display_lists_metadata() {
        let text = Entity::new("Algo", Some("al")).to_string();
        assert!(text.starts_with("[Algo (al)]"));
        assert!(text.contains("Name;Algo"));
        assert!(text.contains("Alias;al"));
    }
}
