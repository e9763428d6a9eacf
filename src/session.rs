use crate::gesture::{Committed, GestureTracker, Handle, Provisional};
use crate::render;
use crate::window_manager::{OpenOutcome, WindowManager, WindowSnapshot};
use crate::{Point, Result};
use log::{debug, info};
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Open(String),
    Close(String),
    Focus(String),
    Move { id: String, x: f64, y: f64 },
    Resize { id: String, width: f64, height: f64 },
    /// Pointer press on a window's chrome: focuses it and starts a gesture.
    /// Ignored entirely while another gesture is in progress.
    Press { id: String, handle: Handle, x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    Release { x: f64, y: f64 },
    ListWindows,
    RenderPage,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Opened(OpenOutcome),
    Applied(bool),
    Provisional(Option<Provisional>),
    Committed(Option<Committed>),
    Windows(Vec<WindowSnapshot>),
    Page(String),
    Stopping,
}

#[derive(Debug)]
pub struct Command {
    pub action: Action,
    pub reply: oneshot::Sender<Reply>,
}

/// Single owner of the desktop state. Every mutation goes through `apply`,
/// one command at a time.
pub struct DesktopSession {
    manager: WindowManager,
    gesture: GestureTracker,
    command_rx: mpsc::Receiver<Command>,
}

impl DesktopSession {
    pub fn new(manager: WindowManager) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let session = Self {
            manager,
            gesture: GestureTracker::new(),
            command_rx,
        };
        (session, SessionHandle { command_tx })
    }

    pub async fn run(mut self) {
        info!(
            "Desktop session started with {} open window(s)",
            self.manager.windows().len()
        );

        while let Some(Command { action, reply }) = self.command_rx.recv().await {
            let quit = action == Action::Quit;
            let response = self.apply(action);
            // The requester may have given up waiting.
            let _ = reply.send(response);
            if quit {
                break;
            }
        }

        info!("Desktop session stopped");
    }

    pub fn apply(&mut self, action: Action) -> Reply {
        debug!("Applying {:?}", action);

        match action {
            Action::Open(id) => Reply::Opened(self.manager.open(&id)),
            Action::Close(id) => Reply::Applied(self.manager.close(&id)),
            Action::Focus(id) => Reply::Applied(self.manager.focus(&id)),
            Action::Move { id, x, y } => Reply::Applied(self.manager.move_window(&id, x, y)),
            Action::Resize { id, width, height } => {
                Reply::Applied(self.manager.resize(&id, width, height))
            }
            Action::Press { id, handle, x, y } => {
                // A press during another gesture is dropped whole, focus included.
                if self.gesture.is_active() || !self.manager.focus(&id) {
                    return Reply::Applied(false);
                }
                Reply::Applied(
                    self.gesture
                        .press(&self.manager, &id, handle, Point::new(x, y)),
                )
            }
            Action::PointerMove { x, y } => {
                Reply::Provisional(self.gesture.pointer_move(&self.manager, Point::new(x, y)))
            }
            Action::Release { x, y } => {
                Reply::Committed(self.gesture.release(&mut self.manager, Point::new(x, y)))
            }
            Action::ListWindows => Reply::Windows(self.manager.snapshot()),
            Action::RenderPage => {
                let clock = chrono::Local::now().format("%H:%M").to_string();
                Reply::Page(render::desktop_page(&self.manager, &clock))
            }
            Action::Quit => Reply::Stopping,
        }
    }

    pub fn manager(&self) -> &WindowManager {
        &self.manager
    }
}

/// Cloneable sender side of a running [`DesktopSession`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    pub async fn request(&self, action: Action) -> Result<Reply> {
        let (reply, response) = oneshot::channel();
        self.command_tx
            .send(Command { action, reply })
            .await
            .map_err(|_| anyhow::anyhow!("Desktop session is not running"))?;
        response
            .await
            .map_err(|_| anyhow::anyhow!("Desktop session dropped the request"))
    }

    pub async fn open(&self, id: &str) -> Result<OpenOutcome> {
        match self.request(Action::Open(id.to_string())).await? {
            Reply::Opened(outcome) => Ok(outcome),
            other => Err(unexpected(other)),
        }
    }

    pub async fn windows(&self) -> Result<Vec<WindowSnapshot>> {
        match self.request(Action::ListWindows).await? {
            Reply::Windows(windows) => Ok(windows),
            other => Err(unexpected(other)),
        }
    }

    pub async fn render_page(&self) -> Result<String> {
        match self.request(Action::RenderPage).await? {
            Reply::Page(page) => Ok(page),
            other => Err(unexpected(other)),
        }
    }

    pub async fn quit(&self) -> Result<()> {
        self.request(Action::Quit).await.map(|_| ())
    }
}

fn unexpected(reply: Reply) -> anyhow::Error {
    anyhow::anyhow!("Unexpected session reply: {:?}", reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Catalog;
    use crate::window_manager::Bounds;
    use crate::Size;
    use assert_matches::assert_matches;

    fn session() -> DesktopSession {
        let manager = WindowManager::new(Catalog::builtin(), Bounds::default(), 1000);
        DesktopSession::new(manager).0
    }

    #[test]
    fn press_focuses_before_dragging() {
        let mut session = session();
        session.apply(Action::Open("projects".into()));
        session.apply(Action::Open("contact".into()));

        let reply = session.apply(Action::Press {
            id: "projects".into(),
            handle: Handle::TitleBar,
            x: 130.0,
            y: 210.0,
        });

        assert_eq!(reply, Reply::Applied(true));
        assert_eq!(session.manager().focused().unwrap().id(), "projects");
    }

    #[test]
    fn press_during_active_gesture_leaves_stacking_alone() {
        let mut session = session();
        session.apply(Action::Open("projects".into()));
        session.apply(Action::Open("contact".into()));
        session.apply(Action::Press {
            id: "contact".into(),
            handle: Handle::TitleBar,
            x: 210.0,
            y: 170.0,
        });
        let contact_z = session.manager().get("contact").unwrap().z_index;

        let reply = session.apply(Action::Press {
            id: "projects".into(),
            handle: Handle::ResizeGrip,
            x: 600.0,
            y: 700.0,
        });

        assert_eq!(reply, Reply::Applied(false));
        assert_eq!(session.manager().focused().unwrap().id(), "contact");
        assert_eq!(session.manager().get("contact").unwrap().z_index, contact_z);
        assert_matches!(
            session.apply(Action::Release { x: 230.0, y: 190.0 }),
            Reply::Committed(Some(Committed::Moved { window_id: "contact", .. }))
        );
    }

    #[test]
    fn resize_gesture_round_trip() {
        let mut session = session();
        session.apply(Action::Open("skills".into()));
        session.apply(Action::Press {
            id: "skills".into(),
            handle: Handle::ResizeGrip,
            x: 700.0,
            y: 560.0,
        });

        let provisional = session.apply(Action::PointerMove { x: 740.0, y: 600.0 });
        assert_eq!(
            provisional,
            Reply::Provisional(Some(Provisional::Size(Size::new(560.0, 400.0))))
        );

        let committed = session.apply(Action::Release { x: 750.0, y: 610.0 });
        assert_matches!(committed, Reply::Committed(Some(Committed::Resized { .. })));
        assert_eq!(
            session.manager().get("skills").unwrap().size,
            Size::new(570.0, 410.0)
        );
    }

    #[test]
    fn press_on_closed_window_does_not_start_gesture() {
        let mut session = session();
        let reply = session.apply(Action::Press {
            id: "contact".into(),
            handle: Handle::TitleBar,
            x: 0.0,
            y: 0.0,
        });
        assert_eq!(reply, Reply::Applied(false));
        assert_eq!(
            session.apply(Action::Release { x: 10.0, y: 10.0 }),
            Reply::Committed(None)
        );
    }

    #[tokio::test]
    async fn handle_talks_to_running_session() {
        let manager = WindowManager::new(Catalog::builtin(), Bounds::default(), 1000);
        let (session, handle) = DesktopSession::new(manager);
        let task = tokio::spawn(session.run());

        assert_eq!(handle.open("welcome").await.unwrap(), OpenOutcome::Opened);
        assert_eq!(handle.open("welcome").await.unwrap(), OpenOutcome::Focused);
        assert_eq!(handle.open("nope").await.unwrap(), OpenOutcome::Unknown);

        let windows = handle.windows().await.unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].id, "welcome");

        handle.quit().await.unwrap();
        task.await.unwrap();
        assert!(handle.windows().await.is_err());
    }
}
