//! Pointer gestures on window chrome: dragging by the title bar and resizing
//! from the bottom-right grip. One gesture is active at a time; releasing the
//! pointer always commits.

use crate::window_manager::WindowManager;
use crate::{Point, Size};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    TitleBar,
    ResizeGrip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging {
        window_id: &'static str,
        start_pointer: Point,
        start_position: Point,
    },
    Resizing {
        window_id: &'static str,
        start_pointer: Point,
        start_size: Size,
    },
}

/// Visual-only geometry reported while a gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provisional {
    Position(Point),
    Size(Size),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Committed {
    Moved { window_id: &'static str, position: Point },
    Resized { window_id: &'static str, size: Size },
}

#[derive(Debug)]
pub struct GestureTracker {
    state: GestureState,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureTracker {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Starts a gesture on an open window. Ignored while another gesture is
    /// active or when the window is not open.
    pub fn press(
        &mut self,
        manager: &WindowManager,
        id: &str,
        handle: Handle,
        pointer: Point,
    ) -> bool {
        if self.is_active() {
            debug!("Ignoring press on '{}': gesture already active", id);
            return false;
        }
        let Some(window) = manager.get(id) else {
            return false;
        };

        self.state = match handle {
            Handle::TitleBar => GestureState::Dragging {
                window_id: window.id(),
                start_pointer: pointer,
                start_position: window.position,
            },
            Handle::ResizeGrip => GestureState::Resizing {
                window_id: window.id(),
                start_pointer: pointer,
                start_size: window.size,
            },
        };
        debug!("Gesture started: {:?}", self.state);
        true
    }

    /// Geometry to show for the current pointer position. Drag positions are
    /// raw; resize sizes are held to the manager's minimum dimensions.
    pub fn pointer_move(&self, manager: &WindowManager, pointer: Point) -> Option<Provisional> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Dragging {
                start_pointer,
                start_position,
                ..
            } => Some(Provisional::Position(start_position.offset(
                pointer.x - start_pointer.x,
                pointer.y - start_pointer.y,
            ))),
            GestureState::Resizing {
                start_pointer,
                start_size,
                ..
            } => Some(Provisional::Size(manager.bounds().clamp_size(Size::new(
                start_size.width + pointer.x - start_pointer.x,
                start_size.height + pointer.y - start_pointer.y,
            )))),
        }
    }

    /// Ends the gesture and writes the result into the manager.
    pub fn release(&mut self, manager: &mut WindowManager, pointer: Point) -> Option<Committed> {
        let provisional = self.pointer_move(manager, pointer)?;
        let state = std::mem::replace(&mut self.state, GestureState::Idle);

        let committed = match (state, provisional) {
            (GestureState::Dragging { window_id, .. }, Provisional::Position(position)) => {
                if !manager.move_window(window_id, position.x, position.y) {
                    return None;
                }
                Committed::Moved {
                    window_id,
                    position: manager.get(window_id)?.position,
                }
            }
            (GestureState::Resizing { window_id, .. }, Provisional::Size(size)) => {
                if !manager.resize(window_id, size.width, size.height) {
                    return None;
                }
                Committed::Resized {
                    window_id,
                    size: manager.get(window_id)?.size,
                }
            }
            _ => return None,
        };
        debug!("Gesture committed: {:?}", committed);
        Some(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Catalog;
    use crate::window_manager::Bounds;
    use assert_matches::assert_matches;

    fn desktop() -> WindowManager {
        let mut wm = WindowManager::new(Catalog::builtin(), Bounds::default(), 1000);
        wm.open("welcome");
        wm.open("projects");
        wm
    }

    #[test]
    fn drag_reports_raw_provisional_then_commits_clamped() {
        let mut wm = desktop();
        let mut gesture = GestureTracker::new();

        assert!(gesture.press(&wm, "projects", Handle::TitleBar, Point::new(150.0, 210.0)));
        assert_matches!(gesture.state(), GestureState::Dragging { window_id: "projects", .. });

        let provisional = gesture.pointer_move(&wm, Point::new(0.0, 100.0));
        assert_eq!(provisional, Some(Provisional::Position(Point::new(-30.0, 90.0))));
        assert_eq!(wm.get("projects").unwrap().position, Point::new(120.0, 200.0));

        let committed = gesture.release(&mut wm, Point::new(0.0, 100.0));
        assert_eq!(
            committed,
            Some(Committed::Moved {
                window_id: "projects",
                position: Point::new(20.0, 90.0),
            })
        );
        assert_eq!(wm.get("projects").unwrap().position, Point::new(20.0, 90.0));
        assert!(!gesture.is_active());
    }

    #[test]
    fn resize_provisional_is_held_to_minimums() {
        let mut wm = desktop();
        let mut gesture = GestureTracker::new();
        gesture.press(&wm, "welcome", Handle::ResizeGrip, Point::new(760.0, 720.0));

        let provisional = gesture.pointer_move(&wm, Point::new(0.0, 0.0));
        assert_eq!(provisional, Some(Provisional::Size(Size::new(320.0, 260.0))));

        let committed = gesture.release(&mut wm, Point::new(860.0, 740.0));
        assert_matches!(committed, Some(Committed::Resized { window_id: "welcome", size })
            if size == Size::new(780.0, 620.0));
    }

    #[test]
    fn pointer_events_while_idle_do_nothing() {
        let mut wm = desktop();
        let mut gesture = GestureTracker::new();

        assert_eq!(gesture.pointer_move(&wm, Point::new(5.0, 5.0)), None);
        assert_eq!(gesture.release(&mut wm, Point::new(5.0, 5.0)), None);
        assert_eq!(wm.get("welcome").unwrap().position, Point::new(80.0, 120.0));
    }

    #[test]
    fn second_press_is_ignored_until_release() {
        let mut wm = desktop();
        let mut gesture = GestureTracker::new();

        assert!(gesture.press(&wm, "welcome", Handle::TitleBar, Point::new(100.0, 130.0)));
        assert!(!gesture.press(&wm, "projects", Handle::ResizeGrip, Point::new(0.0, 0.0)));
        assert_matches!(gesture.state(), GestureState::Dragging { window_id: "welcome", .. });

        gesture.release(&mut wm, Point::new(110.0, 140.0));
        assert_eq!(wm.get("welcome").unwrap().position, Point::new(90.0, 130.0));
        assert!(gesture.press(&wm, "projects", Handle::ResizeGrip, Point::new(0.0, 0.0)));
    }

    #[test]
    fn press_on_closed_window_is_ignored() {
        let wm = desktop();
        let mut gesture = GestureTracker::new();
        assert!(!gesture.press(&wm, "contact", Handle::TitleBar, Point::new(0.0, 0.0)));
        assert!(!gesture.is_active());
    }

    #[test]
    fn closing_mid_gesture_makes_commit_a_no_op() {
        let mut wm = desktop();
        let mut gesture = GestureTracker::new();
        gesture.press(&wm, "projects", Handle::TitleBar, Point::new(0.0, 0.0));

        wm.close("projects");

        assert_eq!(gesture.release(&mut wm, Point::new(50.0, 50.0)), None);
        assert!(!gesture.is_active());
        assert!(!wm.is_open("projects"));
    }
}
