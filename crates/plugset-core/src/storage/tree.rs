//! Element tree shared by every document codec.
//!
//! Settings files are handled as plain trees of named elements: the XML codec
//! maps markup onto [`Element`]s one to one, and the serde codecs store the
//! same structure verbatim. Nothing in here knows what a setting is.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single element: name, attributes, text content and child elements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder-style text setter
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Every element below this one with the given name, depth-first in document order.
    ///
    /// Matching elements are not searched further.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_named(self, name, &mut found);
        found
    }
}

fn collect_named<'a>(element: &'a Element, name: &str, found: &mut Vec<&'a Element>) {
    for child in &element.children {
        if child.name == name {
            found.push(child);
        } else {
            collect_named(child, name, found);
        }
    }
}

/// A parsed document; `root` is `None` for an empty document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsTree {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Element>,
}

impl SettingsTree {
    pub fn new(root: Element) -> Self {
        Self { root: Some(root) }
    }

    pub fn empty() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }
}
