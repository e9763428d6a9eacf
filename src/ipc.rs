use crate::config::IpcConfig;
use crate::gesture::{Committed, Handle, Provisional};
use crate::session::{Action, Reply, SessionHandle};
use crate::window_manager::OpenOutcome;
use crate::Result;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};

#[derive(Debug, Serialize, Deserialize)]
pub struct IpcMessage {
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IpcResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl IpcResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    fn ok_with(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

pub struct IpcServer {
    config: IpcConfig,
    session: SessionHandle,
}

impl IpcServer {
    pub fn new(config: &IpcConfig, session: SessionHandle) -> Self {
        Self {
            config: config.clone(),
            session,
        }
    }

    pub async fn start(&self) -> Result<()> {
        let socket_path = &self.config.socket_path;

        if Path::new(socket_path).exists() {
            std::fs::remove_file(socket_path)?;
        }

        let listener = UnixListener::bind(socket_path)?;
        info!("IPC server listening on {}", socket_path);

        let session = self.session.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        debug!("IPC client connected: {:?}", addr);
                        let session = session.clone();
                        tokio::spawn(async move {
                            if let Err(e) = Self::handle_client(stream, session).await {
                                error!("Error handling IPC client: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting IPC connection: {}", e);
                    }
                }
            }
        });

        Ok(())
    }

    async fn handle_client(stream: UnixStream, session: SessionHandle) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        let client_timeout = Duration::from_secs(30);

        while let Ok(Ok(bytes_read)) = timeout(client_timeout, reader.read_line(&mut line)).await {
            if bytes_read == 0 {
                debug!("IPC client disconnected");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                line.clear();
                continue;
            }

            debug!("Received IPC message: {}", trimmed);

            let response = match serde_json::from_str::<IpcMessage>(trimmed) {
                Ok(message) => Self::process_message(message, &session).await,
                Err(e) => IpcResponse::fail(format!("Invalid JSON: {}", e)),
            };

            let response_json = match serde_json::to_string(&response) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize response: {}", e);
                    r#"{"success":false,"message":"Internal server error","data":null}"#
                        .to_string()
                }
            };

            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;

            debug!("Sent response: {}", response_json);
            line.clear();
        }

        debug!("IPC client handler finished");
        Ok(())
    }

    pub async fn process_message(message: IpcMessage, session: &SessionHandle) -> IpcResponse {
        debug!(
            "Processing command: {} with args: {:?}",
            message.command, message.args
        );

        let action = match parse_action(&message) {
            Ok(Some(action)) => action,
            Ok(None) => return Self::builtin_response(&message.command),
            Err(usage) => return IpcResponse::fail(usage),
        };

        match session.request(action).await {
            Ok(reply) => describe(reply),
            Err(e) => IpcResponse::fail(format!("Failed to reach desktop session: {}", e)),
        }
    }

    fn builtin_response(command: &str) -> IpcResponse {
        match command {
            "ping" => IpcResponse::ok_with(
                "pong",
                serde_json::json!({
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                    "version": env!("CARGO_PKG_VERSION")
                }),
            ),
            _ => IpcResponse::ok_with(
                "Available commands",
                serde_json::json!({
                    "commands": [
                        {"name": "open", "args": ["panel"], "description": "Open or refocus a panel"},
                        {"name": "close", "args": ["panel"], "description": "Close a panel"},
                        {"name": "focus", "args": ["panel"], "description": "Bring a panel to the front"},
                        {"name": "move", "args": ["panel", "x", "y"], "description": "Move a panel"},
                        {"name": "resize", "args": ["panel", "width", "height"], "description": "Resize a panel"},
                        {"name": "press", "args": ["panel", "title|grip", "x", "y"], "description": "Start a drag or resize gesture"},
                        {"name": "drag", "args": ["x", "y"], "description": "Move the pointer during a gesture"},
                        {"name": "release", "args": ["x", "y"], "description": "Finish the current gesture"},
                        {"name": "list", "args": [], "description": "List open windows"},
                        {"name": "status", "args": [], "description": "Show desktop status"},
                        {"name": "ping", "args": [], "description": "Test connection"},
                        {"name": "quit", "args": [], "description": "Stop the desktop session"},
                        {"name": "help", "args": [], "description": "Show this help"}
                    ]
                }),
            ),
        }
    }
}

/// Maps a text command onto a session action. `Ok(None)` marks commands the
/// IPC layer answers itself.
fn parse_action(message: &IpcMessage) -> std::result::Result<Option<Action>, String> {
    let args = &message.args;
    let action = match message.command.as_str() {
        "open" => Action::Open(panel_arg(args, "open")?),
        "close" => Action::Close(panel_arg(args, "close")?),
        "focus" => Action::Focus(panel_arg(args, "focus")?),
        "move" => {
            let usage = "move command requires: panel x y";
            let (x, y) = coords(args.get(1..), usage)?;
            Action::Move {
                id: panel_arg(args, "move")?,
                x,
                y,
            }
        }
        "resize" => {
            let usage = "resize command requires: panel width height";
            let (width, height) = coords(args.get(1..), usage)?;
            Action::Resize {
                id: panel_arg(args, "resize")?,
                width,
                height,
            }
        }
        "press" => {
            let usage = "press command requires: panel title|grip x y";
            let handle = match args.get(1).map(String::as_str) {
                Some("title") => Handle::TitleBar,
                Some("grip") => Handle::ResizeGrip,
                _ => return Err(usage.to_string()),
            };
            let (x, y) = coords(args.get(2..), usage)?;
            Action::Press {
                id: panel_arg(args, "press")?,
                handle,
                x,
                y,
            }
        }
        "drag" => {
            let (x, y) = coords(Some(args.as_slice()), "drag command requires: x y")?;
            Action::PointerMove { x, y }
        }
        "release" => {
            let (x, y) = coords(Some(args.as_slice()), "release command requires: x y")?;
            Action::Release { x, y }
        }
        "list" | "status" => Action::ListWindows,
        "quit" | "stop" => Action::Quit,
        "ping" | "help" => return Ok(None),
        other => {
            return Err(format!(
                "Unknown command: '{}'. Use 'help' to see available commands.",
                other
            ))
        }
    };
    Ok(Some(action))
}

fn panel_arg(args: &[String], command: &str) -> std::result::Result<String, String> {
    args.first()
        .cloned()
        .ok_or_else(|| format!("{} command requires a panel argument", command))
}

fn coords(args: Option<&[String]>, usage: &str) -> std::result::Result<(f64, f64), String> {
    match args {
        Some([a, b, ..]) => match (a.parse::<f64>(), b.parse::<f64>()) {
            (Ok(a), Ok(b)) => Ok((a, b)),
            _ => Err(usage.to_string()),
        },
        _ => Err(usage.to_string()),
    }
}

fn describe(reply: Reply) -> IpcResponse {
    match reply {
        Reply::Opened(OpenOutcome::Opened) => IpcResponse::ok("Panel opened"),
        Reply::Opened(OpenOutcome::Focused) => IpcResponse::ok("Panel already open, brought to front"),
        Reply::Opened(OpenOutcome::Unknown) => IpcResponse::ok("Unknown panel ignored"),
        Reply::Applied(true) => IpcResponse::ok("Applied"),
        Reply::Applied(false) => IpcResponse::ok("No matching open window"),
        Reply::Provisional(Some(Provisional::Position(p))) => {
            IpcResponse::ok_with("Dragging", serde_json::json!({ "x": p.x, "y": p.y }))
        }
        Reply::Provisional(Some(Provisional::Size(s))) => IpcResponse::ok_with(
            "Resizing",
            serde_json::json!({ "width": s.width, "height": s.height }),
        ),
        Reply::Provisional(None) => IpcResponse::ok("No gesture in progress"),
        Reply::Committed(Some(Committed::Moved { window_id, position })) => IpcResponse::ok_with(
            "Moved",
            serde_json::json!({ "id": window_id, "x": position.x, "y": position.y }),
        ),
        Reply::Committed(Some(Committed::Resized { window_id, size })) => IpcResponse::ok_with(
            "Resized",
            serde_json::json!({ "id": window_id, "width": size.width, "height": size.height }),
        ),
        Reply::Committed(None) => IpcResponse::ok("Nothing to commit"),
        Reply::Windows(windows) => IpcResponse::ok_with(
            format!("{} window(s) open", windows.len()),
            serde_json::json!({ "windows": windows }),
        ),
        Reply::Page(page) => IpcResponse::ok_with("Rendered", serde_json::json!({ "html": page })),
        Reply::Stopping => IpcResponse::ok("Desktop session stopping"),
    }
}

pub struct IpcClient {
    socket_path: String,
}

impl IpcClient {
    pub fn new(socket_path: String) -> Self {
        Self { socket_path }
    }

    pub async fn send_command(&self, command: &str, args: Vec<String>) -> Result<IpcResponse> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (reader, mut writer) = stream.into_split();

        let message = IpcMessage {
            command: command.to_string(),
            args,
        };

        let message_json = serde_json::to_string(&message)?;

        writer.write_all(message_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut reader = BufReader::new(reader);
        let mut response_line = String::new();

        match timeout(Duration::from_secs(10), reader.read_line(&mut response_line)).await {
            Ok(Ok(_)) => {
                let response: IpcResponse = serde_json::from_str(&response_line)?;
                Ok(response)
            }
            Ok(Err(e)) => Err(anyhow::anyhow!("Failed to read response: {}", e)),
            Err(_) => Err(anyhow::anyhow!("Response timeout")),
        }
    }

    pub async fn ping(&self) -> Result<IpcResponse> {
        self.send_command("ping", vec![]).await
    }

    pub async fn open_panel(&self, id: &str) -> Result<IpcResponse> {
        self.send_command("open", vec![id.to_string()]).await
    }

    pub async fn list_windows(&self) -> Result<IpcResponse> {
        self.send_command("list", vec![]).await
    }

    pub async fn quit(&self) -> Result<IpcResponse> {
        self.send_command("quit", vec![]).await
    }

    /// Sends one command and prints the response, exiting non-zero on failure.
    pub async fn run_command(socket_path: &str, command: &str, args: Vec<String>) -> Result<()> {
        let client = IpcClient::new(socket_path.to_string());

        let response = client.send_command(command, args).await?;

        if response.success {
            println!("✓ {}", response.message);
            if let Some(data) = response.data {
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
        } else {
            eprintln!("✗ {}", response.message);
            std::process::exit(1);
        }

        Ok(())
    }

    pub async fn check_connection(socket_path: &str) -> bool {
        let client = IpcClient::new(socket_path.to_string());
        client.ping().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Catalog;
    use crate::session::DesktopSession;
    use crate::window_manager::{Bounds, WindowManager};
    use assert_matches::assert_matches;

    fn msg(command: &str, args: &[&str]) -> IpcMessage {
        IpcMessage {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn running_session() -> SessionHandle {
        let manager = WindowManager::new(Catalog::builtin(), Bounds::default(), 1000);
        let (session, handle) = DesktopSession::new(manager);
        tokio::spawn(session.run());
        handle
    }

    #[test]
    fn parses_geometry_commands() {
        assert_matches!(
            parse_action(&msg("move", &["skills", "40", "-10.5"])),
            Ok(Some(Action::Move { id, x, y })) if id == "skills" && x == 40.0 && y == -10.5
        );
        assert_matches!(
            parse_action(&msg("press", &["contact", "grip", "1", "2"])),
            Ok(Some(Action::Press { handle: Handle::ResizeGrip, .. }))
        );
        assert_matches!(
            parse_action(&msg("release", &["3", "4"])),
            Ok(Some(Action::Release { x, y })) if x == 3.0 && y == 4.0
        );
    }

    #[test]
    fn reports_usage_for_bad_arguments() {
        assert_eq!(
            parse_action(&msg("move", &["skills", "left"])),
            Err("move command requires: panel x y".to_string())
        );
        assert_eq!(
            parse_action(&msg("open", &[])),
            Err("open command requires a panel argument".to_string())
        );
        assert_matches!(parse_action(&msg("press", &["skills", "corner", "1", "1"])), Err(_));
        assert_matches!(parse_action(&msg("teleport", &[])), Err(e) if e.contains("Unknown command"));
        assert_matches!(parse_action(&msg("ping", &[])), Ok(None));
    }

    #[tokio::test]
    async fn open_and_list_through_session() {
        let session = running_session();

        let opened = IpcServer::process_message(msg("open", &["projects"]), &session).await;
        assert!(opened.success);
        assert_eq!(opened.message, "Panel opened");

        let again = IpcServer::process_message(msg("open", &["projects"]), &session).await;
        assert_eq!(again.message, "Panel already open, brought to front");

        let list = IpcServer::process_message(msg("list", &[]), &session).await;
        assert_eq!(list.message, "1 window(s) open");
        let data = list.data.unwrap();
        assert_eq!(data["windows"][0]["id"], "projects");
    }

    #[tokio::test]
    async fn ping_answers_without_session() {
        let manager = WindowManager::new(Catalog::builtin(), Bounds::default(), 1000);
        let (_session, handle) = DesktopSession::new(manager);

        let response = IpcServer::process_message(msg("ping", &[]), &handle).await;

        assert!(response.success);
        assert_eq!(response.message, "pong");
    }

    #[tokio::test]
    async fn round_trip_over_unix_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("deskfolio.sock").display().to_string();
        let config = IpcConfig {
            socket_path: socket_path.clone(),
        };
        let server = IpcServer::new(&config, running_session());
        server.start().await.unwrap();

        let client = IpcClient::new(socket_path.clone());
        let response = client.open_panel("contact").await.unwrap();
        assert!(response.success);

        let response = client.list_windows().await.unwrap();
        assert_eq!(response.data.unwrap()["windows"][0]["id"], "contact");
        assert!(IpcClient::check_connection(&socket_path).await);
    }
}
