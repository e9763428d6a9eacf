use crate::config::DesktopConfig;
use crate::registry::{Catalog, WindowDefinition};
use crate::{Point, Rect, Size};
use log::debug;
use serde::Serialize;

/// Lower limits every open window is held to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Bounds {
    /// `f64::max` returns the other operand for NaN, so NaN clamps to the minimum.
    pub fn clamp_position(&self, position: Point) -> Point {
        Point::new(position.x.max(self.min_x), position.y.max(self.min_y))
    }

    pub fn clamp_size(&self, size: Size) -> Size {
        Size::new(
            size.width.max(self.min_width),
            size.height.max(self.min_height),
        )
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::from(&DesktopConfig::default())
    }
}

impl From<&DesktopConfig> for Bounds {
    fn from(config: &DesktopConfig) -> Self {
        Self {
            min_x: config.min_x,
            min_y: config.min_y,
            min_width: config.min_width,
            min_height: config.min_height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowInstance {
    pub definition: WindowDefinition,
    pub position: Point,
    pub size: Size,
    pub z_index: u32,
}

impl WindowInstance {
    pub fn id(&self) -> &'static str {
        self.definition.id
    }

    pub fn rect(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenOutcome {
    Opened,
    /// The panel was already open and was brought to the front instead.
    Focused,
    Unknown,
}

/// Serializable view of an open window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSnapshot {
    pub id: String,
    pub title: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: u32,
    pub focused: bool,
}

pub struct WindowManager {
    catalog: Catalog,
    bounds: Bounds,
    base_z_index: u32,
    windows: Vec<WindowInstance>,
}

impl WindowManager {
    pub fn new(catalog: Catalog, bounds: Bounds, base_z_index: u32) -> Self {
        Self {
            catalog,
            bounds,
            base_z_index,
            windows: Vec::new(),
        }
    }

    /// Builds a manager from config and opens `initial_panels` in order.
    pub fn from_config(catalog: Catalog, config: &DesktopConfig) -> Self {
        let mut manager = Self::new(catalog, Bounds::from(config), config.base_z_index);
        for id in &config.initial_panels {
            if manager.open(id) == OpenOutcome::Unknown {
                log::warn!("Initial panel '{}' is not in the catalog", id);
            }
        }
        manager
    }

    pub fn open(&mut self, id: &str) -> OpenOutcome {
        if self.is_open(id) {
            self.focus(id);
            return OpenOutcome::Focused;
        }

        let Some(definition) = self.catalog.get(id).copied() else {
            debug!("Ignoring open for unknown panel '{}'", id);
            return OpenOutcome::Unknown;
        };

        let z_index = self.next_z_index();
        debug!("Opening panel '{}' at z-index {}", id, z_index);
        self.windows.push(WindowInstance {
            position: self.bounds.clamp_position(definition.default_position),
            size: self.bounds.clamp_size(definition.default_size),
            definition,
            z_index,
        });
        OpenOutcome::Opened
    }

    pub fn close(&mut self, id: &str) -> bool {
        let before = self.windows.len();
        self.windows.retain(|w| w.id() != id);
        let closed = self.windows.len() != before;
        if closed {
            debug!("Closed panel '{}'", id);
        }
        closed
    }

    pub fn focus(&mut self, id: &str) -> bool {
        let z_index = self.next_z_index();
        match self.get_mut(id) {
            Some(window) => {
                window.z_index = z_index;
                debug!("Focused panel '{}' at z-index {}", id, z_index);
                true
            }
            None => false,
        }
    }

    pub fn move_window(&mut self, id: &str, x: f64, y: f64) -> bool {
        let position = self.bounds.clamp_position(Point::new(x, y));
        match self.get_mut(id) {
            Some(window) => {
                window.position = position;
                true
            }
            None => false,
        }
    }

    pub fn resize(&mut self, id: &str, width: f64, height: f64) -> bool {
        let size = self.bounds.clamp_size(Size::new(width, height));
        match self.get_mut(id) {
            Some(window) => {
                window.size = size;
                true
            }
            None => false,
        }
    }

    /// Open windows in the order they were opened.
    pub fn windows(&self) -> &[WindowInstance] {
        &self.windows
    }

    pub fn get(&self, id: &str) -> Option<&WindowInstance> {
        self.windows.iter().find(|w| w.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut WindowInstance> {
        self.windows.iter_mut().find(|w| w.id() == id)
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The window on top of the stack.
    pub fn focused(&self) -> Option<&WindowInstance> {
        self.windows.iter().max_by_key(|w| w.z_index)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn snapshot(&self) -> Vec<WindowSnapshot> {
        let focused = self.focused().map(|w| w.id());
        self.windows
            .iter()
            .map(|w| WindowSnapshot {
                id: w.id().to_string(),
                title: w.definition.title.to_string(),
                x: w.position.x,
                y: w.position.y,
                width: w.size.width,
                height: w.size.height,
                z_index: w.z_index,
                focused: Some(w.id()) == focused,
            })
            .collect()
    }

    fn next_z_index(&mut self) -> u32 {
        let Some(top) = self.windows.iter().map(|w| w.z_index).max() else {
            return self.base_z_index;
        };
        match top.max(self.base_z_index).checked_add(1) {
            Some(next) => next,
            None => self.compact_z_indices(),
        }
    }

    /// Renumbers open windows contiguously in stacking order and returns the
    /// next free z-index. The start is lowered below `base_z_index` only as
    /// far as needed to leave room above the current stack.
    fn compact_z_indices(&mut self) -> u32 {
        let count = self.windows.len() as u32;
        let start = self.base_z_index.min(u32::MAX - count);

        let mut order: Vec<usize> = (0..self.windows.len()).collect();
        order.sort_by_key(|&i| self.windows[i].z_index);
        for (rank, i) in order.into_iter().enumerate() {
            self.windows[i].z_index = start + rank as u32;
        }

        debug!("Compacted z-indices to start at {}", start);
        start + count
    }
}
