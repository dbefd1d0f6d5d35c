//! Style map: ordered font-name to role rules.
//!
//! A style map is read as a JSON array:
//!
//! ```json
//! [
//!   { "style": "ABCDEE+Helvetica-Bold", "type": "title" }
//! ]
//! ```
//!
//! Lookups are first-match-wins in the order the rules were supplied. A
//! map is never edited in place; [`StyleMap::extended`] returns a new map
//! with an extra rule at the end, so existing classifications keep their
//! meaning.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Semantic role assigned to a font.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Section heading
    Title,
    /// Any other caller-defined role
    Other(String),
}

impl Role {
    /// Whether this role opens a section.
    pub fn is_title(&self) -> bool {
        matches!(self, Role::Title)
    }

    /// String form used in the JSON format.
    pub fn as_str(&self) -> &str {
        match self {
            Role::Title => "title",
            Role::Other(name) => name,
        }
    }
}

/// Only the exact string `"title"` is a title; any other spelling is kept
/// as written so a saved map round-trips unchanged.
impl From<String> for Role {
    fn from(value: String) -> Self {
        if value == "title" {
            Role::Title
        } else {
            Role::Other(value)
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Title => "title".to_string(),
            Role::Other(name) => name,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule of a style map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRule {
    /// Font name to match exactly
    pub style: String,
    /// Role given to text in that font
    #[serde(rename = "type")]
    pub role: Role,
}

impl StyleRule {
    /// Create a rule.
    pub fn new(style: impl Into<String>, role: impl Into<Role>) -> Self {
        Self {
            style: style.into(),
            role: role.into(),
        }
    }

    /// Create a rule mapping a font to [`Role::Title`].
    pub fn title(style: impl Into<String>) -> Self {
        Self::new(style, Role::Title)
    }
}

/// Ordered list of style rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap {
    rules: Vec<StyleRule>,
}

impl StyleMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map from rules in priority order.
    pub fn from_rules(rules: Vec<StyleRule>) -> Self {
        Self { rules }
    }

    /// Parse a map from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a map from a JSON file.
    ///
    /// A missing file is reported as [`Error::MissingStyleMap`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::MissingStyleMap(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        Self::from_json(&json)
    }

    /// Serialize the map to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the map to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Rules in priority order.
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the map has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Role of the first rule matching `font_name`.
    pub fn role_for(&self, font_name: &str) -> Option<&Role> {
        self.rules
            .iter()
            .find(|rule| rule.style == font_name)
            .map(|rule| &rule.role)
    }

    /// Whether `font_name` is already mapped to a title.
    pub fn maps_title(&self, font_name: &str) -> bool {
        self.role_for(font_name).is_some_and(Role::is_title)
    }

    /// A copy of this map with `rule` appended.
    pub fn extended(&self, rule: StyleRule) -> Self {
        let mut rules = self.rules.clone();
        rules.push(rule);
        Self { rules }
    }

    /// Build the lookup table used during segmentation.
    pub fn index(&self) -> StyleIndex {
        StyleIndex::new(self)
    }
}

impl FromIterator<StyleRule> for StyleMap {
    fn from_iter<I: IntoIterator<Item = StyleRule>>(iter: I) -> Self {
        Self::from_rules(iter.into_iter().collect())
    }
}

/// Precomputed font lookup for one version of a [`StyleMap`].
///
/// When several rules name the same font, the earliest one is kept, which
/// preserves the first-match-wins order of [`StyleMap::role_for`].
#[derive(Debug, Clone, Default)]
pub struct StyleIndex {
    roles: HashMap<String, Role>,
}

impl StyleIndex {
    /// Build the index for `map`.
    pub fn new(map: &StyleMap) -> Self {
        let mut roles = HashMap::with_capacity(map.len());
        for rule in map.rules() {
            roles
                .entry(rule.style.clone())
                .or_insert_with(|| rule.role.clone());
        }
        Self { roles }
    }

    /// Role for a font, if any rule names it.
    pub fn role_for(&self, font_name: &str) -> Option<&Role> {
        self.roles.get(font_name)
    }

    /// Whether text in `font_name` opens a section.
    pub fn is_title(&self, font_name: &str) -> bool {
        self.role_for(font_name).is_some_and(Role::is_title)
    }
}
