//! Static catalog of the panels that can be opened as windows.

use crate::{panels, Point, Size};
use maud::Markup;
use serde::Serialize;

/// Renders a panel's body.
pub type RenderFn = fn() -> Markup;

/// Immutable catalog entry describing a panel and where it first appears.
#[derive(Clone, Copy, Serialize)]
pub struct WindowDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub badge: Option<&'static str>,
    /// Label shown for this panel in the menu bar.
    pub menu_label: &'static str,
    pub default_size: Size,
    pub default_position: Point,
    #[serde(skip)]
    pub render: RenderFn,
}

impl std::fmt::Debug for WindowDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowDefinition")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("default_size", &self.default_size)
            .field("default_position", &self.default_position)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<WindowDefinition>,
}

impl Catalog {
    /// Builds a catalog, keeping the first definition for any repeated id.
    pub fn new(definitions: Vec<WindowDefinition>) -> Self {
        let mut unique: Vec<WindowDefinition> = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if unique.iter().any(|d| d.id == definition.id) {
                log::warn!("Duplicate panel id '{}' ignored", definition.id);
                continue;
            }
            unique.push(definition);
        }
        Self {
            definitions: unique,
        }
    }

    /// The portfolio's panels: About (welcome), Skills, Projects, Contact.
    pub fn builtin() -> Self {
        Self::new(vec![
            WindowDefinition {
                id: "welcome",
                title: "Welcome",
                subtitle: "Who I am",
                badge: Some("Home"),
                menu_label: "About",
                default_size: Size::new(680.0, 600.0),
                default_position: Point::new(80.0, 120.0),
                render: panels::welcome,
            },
            WindowDefinition {
                id: "skills",
                title: "Skills",
                subtitle: "Capabilities",
                badge: None,
                menu_label: "Skills",
                default_size: Size::new(520.0, 360.0),
                default_position: Point::new(220.0, 240.0),
                render: panels::skills,
            },
            WindowDefinition {
                id: "projects",
                title: "Projects",
                subtitle: "Recent Projects",
                badge: None,
                menu_label: "Projects",
                default_size: Size::new(540.0, 520.0),
                default_position: Point::new(120.0, 200.0),
                render: panels::projects,
            },
            WindowDefinition {
                id: "contact",
                title: "Contact",
                subtitle: "Get in touch",
                badge: Some("Available"),
                menu_label: "Contact",
                default_size: Size::new(520.0, 480.0),
                default_position: Point::new(200.0, 160.0),
                render: panels::contact,
            },
        ])
    }

    pub fn get(&self, id: &str) -> Option<&WindowDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maud::html;

    fn blank() -> Markup {
        html! {}
    }

    #[test]
    fn builtin_catalog_has_menu_order() {
        let catalog = Catalog::builtin();
        let ids: Vec<_> = catalog.iter().map(|d| d.id).collect();
        assert_eq!(ids, ["welcome", "skills", "projects", "contact"]);
        assert_eq!(catalog.get("welcome").unwrap().menu_label, "About");
        assert!(catalog.get("resume").is_none());
    }

    #[test]
    fn duplicate_ids_keep_first_definition() {
        let first = WindowDefinition {
            id: "notes",
            title: "Notes",
            subtitle: "",
            badge: None,
            menu_label: "Notes",
            default_size: Size::new(400.0, 300.0),
            default_position: Point::new(40.0, 90.0),
            render: blank,
        };
        let second = WindowDefinition {
            title: "Other",
            ..first
        };

        let catalog = Catalog::new(vec![first, second]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("notes").unwrap().title, "Notes");
    }
}
