use deskfolio::window_manager::Bounds;
use deskfolio::{Catalog, OpenOutcome, WindowManager};
use proptest::prelude::*;
use std::collections::BTreeSet;

const IDS: [&str; 5] = ["welcome", "skills", "projects", "contact", "unknown"];

#[derive(Debug, Clone)]
enum Op {
    Open(usize),
    Close(usize),
    Focus(usize),
    Move(usize, f64, f64),
    Resize(usize, f64, f64),
}

fn op() -> impl Strategy<Value = Op> {
    let id = 0..IDS.len();
    let coord = -2000.0..2000.0f64;
    prop_oneof![
        id.clone().prop_map(Op::Open),
        id.clone().prop_map(Op::Close),
        id.clone().prop_map(Op::Focus),
        (id.clone(), coord.clone(), coord.clone()).prop_map(|(i, x, y)| Op::Move(i, x, y)),
        (id, coord.clone(), coord).prop_map(|(i, w, h)| Op::Resize(i, w, h)),
    ]
}

fn manager() -> WindowManager {
    WindowManager::new(Catalog::builtin(), Bounds::default(), 1000)
}

fn assert_invariants(wm: &WindowManager) {
    let bounds = wm.bounds();
    let mut ids = BTreeSet::new();
    let mut z_indices = BTreeSet::new();
    for window in wm.windows() {
        assert!(ids.insert(window.id()), "duplicate instance {}", window.id());
        assert!(z_indices.insert(window.z_index), "duplicate z-index");
        assert!(window.position.x >= bounds.min_x);
        assert!(window.position.y >= bounds.min_y);
        assert!(window.size.width >= bounds.min_width);
        assert!(window.size.height >= bounds.min_height);
    }
}

proptest! {
    #[test]
    fn visible_set_tracks_opens_minus_closes(ops in prop::collection::vec(op(), 0..64)) {
        let mut wm = manager();
        let mut expected = BTreeSet::new();

        for op in ops {
            match op {
                Op::Open(i) => {
                    if wm.open(IDS[i]) != OpenOutcome::Unknown {
                        expected.insert(IDS[i]);
                    }
                }
                Op::Close(i) => {
                    wm.close(IDS[i]);
                    expected.remove(IDS[i]);
                }
                Op::Focus(i) => {
                    wm.focus(IDS[i]);
                }
                Op::Move(i, x, y) => {
                    wm.move_window(IDS[i], x, y);
                }
                Op::Resize(i, w, h) => {
                    wm.resize(IDS[i], w, h);
                }
            }
            assert_invariants(&wm);
        }

        let visible: BTreeSet<_> = wm.windows().iter().map(|w| w.id()).collect();
        prop_assert_eq!(visible, expected);
        prop_assert!(!wm.is_open("unknown"));
    }

    #[test]
    fn focus_puts_window_strictly_on_top(
        opens in prop::collection::vec(0..4usize, 1..12),
        target in 0..4usize,
    ) {
        let mut wm = manager();
        for i in &opens {
            wm.open(IDS[*i]);
        }
        wm.open(IDS[target]);
        wm.focus(IDS[target]);

        let top = wm.get(IDS[target]).unwrap().z_index;
        for window in wm.windows().iter().filter(|w| w.id() != IDS[target]) {
            prop_assert!(top > window.z_index);
        }
    }

    #[test]
    fn reopening_never_duplicates(repeats in 1..10usize) {
        let mut wm = manager();
        wm.open("contact");
        for _ in 0..repeats {
            let expected = if wm.is_open("projects") {
                OpenOutcome::Focused
            } else {
                OpenOutcome::Opened
            };
            prop_assert_eq!(wm.open("projects"), expected);
        }
        prop_assert_eq!(wm.windows().len(), 2);
        prop_assert_eq!(wm.focused().unwrap().id(), "projects");
    }
}

#[test]
fn projects_then_contact_then_click_projects() {
    let mut wm = manager();
    wm.open("projects");
    wm.open("contact");

    wm.focus("projects");

    let projects = wm.get("projects").unwrap().z_index;
    let contact = wm.get("contact").unwrap().z_index;
    assert!(projects > contact);
    assert!(wm.is_open("contact"));
}
