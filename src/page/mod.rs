//! Headless page model shared by the generation panel and the navbar.
//!
//! A [`Document`] is a flat map of element ids to [`Element`]s plus the page's
//! location path. Components mount their elements into a document and then
//! only ever mutate it through the helpers below; a [`host::Host`] decides how
//! (and whether) the document is shown.

pub mod host;
pub mod render;

use std::collections::{BTreeMap, BTreeSet};

/// A single UI element: a button, a text span, an input, a link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub text: String,
    /// Current value of an input field.
    pub value: String,
    pub hidden: bool,
    pub disabled: bool,
    pub href: Option<String>,
    classes: BTreeSet<String>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn input(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: Some(href.into()),
            ..Self::default()
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn class(mut self, name: &str) -> Self {
        self.classes.insert(name.to_string());
        self
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    pub fn add_class(&mut self, name: &str) {
        self.classes.insert(name.to_string());
    }

    pub fn remove_class(&mut self, name: &str) {
        self.classes.remove(name);
    }

    pub fn toggle_class(&mut self, name: &str, on: bool) {
        if on {
            self.add_class(name);
        } else {
            self.remove_class(name);
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    fn from_element(element: &Element) -> Option<Self> {
        [Self::Info, Self::Success, Self::Error]
            .into_iter()
            .find(|kind| element.has_class(kind.class_name()))
    }
}

/// The page: elements by id and the location path it was loaded from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    location_path: String,
    elements: BTreeMap<String, Element>,
}

impl Document {
    pub fn new(location_path: impl Into<String>) -> Self {
        Self {
            location_path: location_path.into(),
            elements: BTreeMap::new(),
        }
    }

    /// URL path of the page, e.g. `/index.html` (may be empty).
    pub fn location_path(&self) -> &str {
        &self.location_path
    }

    pub fn insert(&mut self, id: &str, element: Element) {
        self.elements.insert(id.to_string(), element);
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Apply `f` to the element if it is mounted.
    pub fn update(&mut self, id: &str, f: impl FnOnce(&mut Element)) {
        if let Some(element) = self.elements.get_mut(id) {
            f(element);
        } else {
            tracing::trace!(id, "update of an element that is not mounted");
        }
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.get(id).map(|e| e.text.as_str())
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.get(id).map(|e| e.value.as_str())
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) {
        let text = text.into();
        self.update(id, |e| e.text = text);
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) {
        let value = value.into();
        self.update(id, |e| e.value = value);
    }

    pub fn set_hidden(&mut self, id: &str, hidden: bool) {
        self.update(id, |e| e.hidden = hidden);
    }

    pub fn set_disabled(&mut self, id: &str, disabled: bool) {
        self.update(id, |e| e.disabled = disabled);
    }

    pub fn set_href(&mut self, id: &str, href: impl Into<String>) {
        let href = href.into();
        self.update(id, |e| e.href = Some(href));
    }

    /// Missing elements read as hidden.
    pub fn is_hidden(&self, id: &str) -> bool {
        self.get(id).is_none_or(|e| e.hidden)
    }

    pub fn is_disabled(&self, id: &str) -> bool {
        self.get(id).is_some_and(|e| e.disabled)
    }

    /// All elements carrying `class`, in id order.
    pub fn query_class(&self, class: &str) -> impl Iterator<Item = (&str, &Element)> {
        self.elements
            .iter()
            .filter(move |(_, e)| e.has_class(class))
            .map(|(id, e)| (id.as_str(), e))
    }

    /// Mutable counterpart of [`query_class`](Self::query_class).
    pub fn query_class_mut(&mut self, class: &str) -> impl Iterator<Item = &mut Element> {
        self.elements
            .values_mut()
            .filter(move |e| e.has_class(class))
    }

    /// Show a status message in the element `id`, replacing any previous one.
    pub fn show_status(&mut self, id: &str, kind: StatusKind, message: impl Into<String>) {
        let message = message.into();
        self.update(id, |e| {
            e.text = message;
            e.hidden = false;
            for other in [StatusKind::Info, StatusKind::Success, StatusKind::Error] {
                e.remove_class(other.class_name());
            }
            e.add_class("status");
            e.add_class(kind.class_name());
        });
    }

    /// The visible status message in `id`, if any.
    pub fn status(&self, id: &str) -> Option<(StatusKind, &str)> {
        let element = self.get(id).filter(|e| !e.hidden)?;
        let kind = StatusKind::from_element(element)?;
        Some((kind, element.text.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_replaces_previous_kind() {
        let mut doc = Document::new("/index.html");
        doc.insert("status", Element::new().hidden());
        assert_eq!(doc.status("status"), None);

        doc.show_status("status", StatusKind::Info, "working");
        assert_eq!(doc.status("status"), Some((StatusKind::Info, "working")));

        doc.show_status("status", StatusKind::Error, "boom");
        let element = doc.get("status").unwrap();
        assert!(element.has_class("error"));
        assert!(!element.has_class("info"));
        assert_eq!(doc.status("status"), Some((StatusKind::Error, "boom")));
    }

    #[test]
    fn updates_to_missing_elements_are_ignored() {
        let mut doc = Document::new("");
        doc.set_text("nope", "text");
        doc.set_hidden("nope", false);
        assert!(doc.get("nope").is_none());
        assert!(doc.is_hidden("nope"));
        assert!(!doc.is_disabled("nope"));
    }

    #[test]
    fn query_class_filters_elements() {
        let mut doc = Document::new("");
        doc.insert("a", Element::link("index.html", "Home").class("nav-link"));
        doc.insert("b", Element::with_text("plain"));
        doc.insert("c", Element::link("play.html", "Play").class("nav-link"));

        let ids: Vec<&str> = doc.query_class("nav-link").map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "c"]);

        for link in doc.query_class_mut("nav-link") {
            link.add_class("seen");
        }
        assert!(doc.get("a").unwrap().has_class("seen"));
        assert!(!doc.get("b").unwrap().has_class("seen"));
    }

    #[test]
    fn toggle_class_adds_and_removes() {
        let mut element = Element::new();
        element.toggle_class("active", true);
        assert!(element.has_class("active"));
        element.toggle_class("active", false);
        assert!(!element.has_class("active"));
        assert_eq!(element.classes().count(), 0);
    }
}
