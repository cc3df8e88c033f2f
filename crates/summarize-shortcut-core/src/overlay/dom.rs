//! The slice of the page DOM the overlay needs, and an in-memory model of it.

use std::collections::BTreeMap;

pub type ListenerId = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Where a page-level listener is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerTarget {
    Document,
    Window,
    Element(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    KeyDown,
}

/// DOM operations used by the overlay controller. Every mutation reports
/// whether its target existed, so callers can treat a vanished node as a no-op.
pub trait Dom: Send {
    fn viewport(&self) -> Viewport;

    /// Create an empty `div` with `id`, appended to `parent` (or the body)
    fn create_element(&mut self, id: &str, parent: Option<&str>) -> bool;

    /// Remove the element and everything below it
    fn remove_element(&mut self, id: &str) -> bool;

    fn has_element(&self, id: &str) -> bool;

    /// Whether `id` is `ancestor` or lies below it
    fn contains(&self, ancestor: &str, id: &str) -> bool;

    /// Replace the element's markup; child elements are dropped
    fn set_inner_html(&mut self, id: &str, html: &str) -> bool;

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> bool;

    /// Add a `<link rel="stylesheet">` with `id` unless one is present
    fn ensure_stylesheet(&mut self, id: &str, href: &str);

    fn add_listener(&mut self, target: ListenerTarget, kind: EventKind) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub inner_html: String,
    pub style: BTreeMap<String, String>,
}

/// DOM model kept in memory; what the CLI host renders and tests inspect.
#[derive(Debug, Default)]
pub struct MemoryDom {
    viewport: Viewport,
    elements: BTreeMap<String, Element>,
    body: Vec<String>,
    stylesheets: BTreeMap<String, String>,
    listeners: BTreeMap<ListenerId, (ListenerTarget, EventKind)>,
    next_listener: ListenerId,
}

impl MemoryDom {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Elements appended directly to the body
    pub fn body_children(&self) -> &[String] {
        &self.body
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners(&self) -> impl Iterator<Item = &(ListenerTarget, EventKind)> {
        self.listeners.values()
    }

    pub fn stylesheet(&self, id: &str) -> Option<&str> {
        self.stylesheets.get(id).map(String::as_str)
    }

    /// Serialized markup of the element and its children
    pub fn outer_html(&self, id: &str) -> Option<String> {
        let element = self.elements.get(id)?;
        let style = element
            .style
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ");

        let mut html = if style.is_empty() {
            format!("<div id=\"{}\">", id)
        } else {
            format!("<div id=\"{}\" style=\"{}\">", id, style)
        };
        for child in &element.children {
            if let Some(child_html) = self.outer_html(child) {
                html.push_str(&child_html);
            }
        }
        html.push_str(&element.inner_html);
        html.push_str("</div>");
        Some(html)
    }

    fn drop_subtree(&mut self, id: &str) {
        if let Some(element) = self.elements.remove(id) {
            for child in element.children {
                self.drop_subtree(&child);
            }
        }
    }
}

impl Dom for MemoryDom {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn create_element(&mut self, id: &str, parent: Option<&str>) -> bool {
        if self.elements.contains_key(id) {
            return false;
        }

        match parent {
            Some(parent_id) => match self.elements.get_mut(parent_id) {
                Some(parent) => parent.children.push(id.to_string()),
                None => return false,
            },
            None => self.body.push(id.to_string()),
        }

        self.elements.insert(
            id.to_string(),
            Element {
                parent: parent.map(str::to_string),
                ..Default::default()
            },
        );
        true
    }

    fn remove_element(&mut self, id: &str) -> bool {
        let Some(parent) = self.elements.get(id).map(|e| e.parent.clone()) else {
            return false;
        };

        match parent {
            Some(parent_id) => {
                if let Some(parent) = self.elements.get_mut(&parent_id) {
                    parent.children.retain(|c| c != id);
                }
            }
            None => self.body.retain(|c| c != id),
        }

        self.drop_subtree(id);
        true
    }

    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn contains(&self, ancestor: &str, id: &str) -> bool {
        let mut current = Some(id.to_string());
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.elements.get(&node).and_then(|e| e.parent.clone());
        }
        false
    }

    fn set_inner_html(&mut self, id: &str, html: &str) -> bool {
        let children = match self.elements.get_mut(id) {
            Some(element) => {
                element.inner_html = html.to_string();
                std::mem::take(&mut element.children)
            }
            None => return false,
        };

        for child in children {
            self.drop_subtree(&child);
        }
        true
    }

    fn set_style(&mut self, id: &str, property: &str, value: &str) -> bool {
        match self.elements.get_mut(id) {
            Some(element) => {
                element.style.insert(property.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    fn ensure_stylesheet(&mut self, id: &str, href: &str) {
        self.stylesheets
            .entry(id.to_string())
            .or_insert_with(|| href.to_string());
    }

    fn add_listener(&mut self, target: ListenerTarget, kind: EventKind) -> ListenerId {
        self.next_listener += 1;
        self.listeners.insert(self.next_listener, (target, kind));
        self.next_listener
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }
}
