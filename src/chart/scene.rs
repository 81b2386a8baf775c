//! Retained scene and keyed reconciliation.
//!
//! A scene is an ordered list of elements identified by string keys. Two
//! scenes are reconciled by key into create/update/remove patches that a
//! display surface (the browser page, or the SVG serializer) applies.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use serde::Serialize;

use crate::util::escape_html;

pub type Attrs = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub id: String,
    pub tag: &'static str,
    pub parent: String,
    pub attrs: Attrs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Element {
    pub fn new(id: impl Into<String>, tag: &'static str, parent: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag,
            parent: parent.into(),
            attrs: Attrs::new(),
            text: None,
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl ToString) -> Self {
        self.attrs.insert(name, value.to_string());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    /// Insert `element` at `index` among its parent's children.
    Create { element: Element, index: usize },
    /// Overwrite the listed attributes and, when present, the text.
    Update {
        id: String,
        attrs: Attrs,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Reposition an existing element at `index` among its siblings.
    Move { id: String, index: usize },
    Remove { id: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    elements: Vec<Element>,
    index: HashMap<String, usize>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `element`; a later element with the same id replaces the earlier one.
    pub fn push(&mut self, element: Element) {
        match self.index.get(&element.id) {
            Some(&position) => self.elements[position] = element,
            None => {
                self.index.insert(element.id.clone(), self.elements.len());
                self.elements.push(element);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.index.get(id).map(|&position| &self.elements[position])
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn children<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |element| element.parent == parent)
    }

    /// Serializes `root` and its descendants as markup.
    pub fn markup(&self, root: &str) -> String {
        let mut out = String::new();
        if let Some(element) = self.get(root) {
            self.write_element(&mut out, element);
        }
        out
    }

    fn write_element(&self, out: &mut String, element: &Element) {
        let _ = write!(out, "<{} id=\"{}\"", element.tag, escape_html(&element.id));
        for (name, value) in &element.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape_html(value));
        }
        out.push('>');
        if let Some(text) = &element.text {
            out.push_str(&escape_html(text));
        }
        for child in self.children(&element.id) {
            self.write_element(out, child);
        }
        let _ = write!(out, "</{}>", element.tag);
    }
}

/// Reconciles `prev` into `next` by element id.
///
/// Removals come first, then one pass in `next` order that creates, moves
/// and updates. Every `index` is the element's position among its parent's
/// children once the earlier patches are applied, so applying the patches
/// in order leaves each parent's children in `next` order. Elements keep
/// their parent and attribute names for their whole lifetime.
pub fn diff(prev: &Scene, next: &Scene) -> Vec<Patch> {
    let mut patches: Vec<Patch> = Vec::new();
    // surviving children per parent, in current display order
    let mut order: HashMap<&str, Vec<&str>> = HashMap::new();
    for element in &prev.elements {
        if next.get(&element.id).is_some() {
            order
                .entry(element.parent.as_str())
                .or_default()
                .push(element.id.as_str());
        } else {
            patches.push(Patch::Remove {
                id: element.id.clone(),
            });
        }
    }

    let mut sibling_counts: HashMap<&str, usize> = HashMap::new();
    for element in &next.elements {
        let slot = sibling_counts.entry(element.parent.as_str()).or_insert(0);
        let index = *slot;
        *slot += 1;
        let siblings = order.entry(element.parent.as_str()).or_default();

        let Some(old) = prev.get(&element.id) else {
            siblings.insert(index.min(siblings.len()), element.id.as_str());
            patches.push(Patch::Create {
                element: element.clone(),
                index,
            });
            continue;
        };

        if let Some(current) = siblings.iter().position(|id| *id == element.id) {
            if current != index {
                let id = siblings.remove(current);
                siblings.insert(index.min(siblings.len()), id);
                patches.push(Patch::Move {
                    id: element.id.clone(),
                    index,
                });
            }
        }

        let attrs: Attrs = element
            .attrs
            .iter()
            .filter(|(name, value)| old.attrs.get(*name) != Some(*value))
            .map(|(name, value)| (*name, value.clone()))
            .collect();
        let text = (element.text != old.text).then(|| element.text.clone().unwrap_or_default());
        if !attrs.is_empty() || text.is_some() {
            patches.push(Patch::Update {
                id: element.id.clone(),
                attrs,
                text,
            });
        }
    }

    patches
}
