use clap::{Parser, Subcommand};
use deskfolio::contact::{ContactClient, ContactForm};
use deskfolio::ipc::IpcClient;
use deskfolio::mail::ResendProvider;
use deskfolio::server::{self, AppState};
use deskfolio::session::DesktopSession;
use deskfolio::{Catalog, Config, Result, WindowManager};
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

#[derive(Parser)]
#[command(name = "deskfolio")]
#[command(about = "A desktop-style portfolio site")]
struct Cli {
    #[arg(short, long, help = "Configuration file path")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Serve the site and the desktop control socket")]
    Serve {
        #[arg(long, help = "Address to bind, overrides server.bind_addr")]
        bind: Option<String>,
    },
    #[command(about = "List the panels that can be opened")]
    Panels,
    #[command(about = "Check that an instance is running")]
    Status,
    #[command(about = "Show open windows of a running instance")]
    Windows,
    #[command(about = "Open or refocus a panel on a running instance")]
    Open { panel: String },
    #[command(about = "Stop a running instance")]
    Stop,
    #[command(about = "Submit the contact form to a running site")]
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        #[arg(long, help = "Site base URL, defaults to http://<server.bind_addr>")]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;
    let socket_path = config.ipc.socket_path.clone();

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind_addr.clone());
            serve(config, bind).await?;
        }
        Commands::Panels => {
            for panel in Catalog::builtin().iter() {
                println!(
                    "{:<10} {:<10} {}x{} at ({}, {})",
                    panel.id,
                    panel.menu_label,
                    panel.default_size.width,
                    panel.default_size.height,
                    panel.default_position.x,
                    panel.default_position.y
                );
            }
        }
        Commands::Status => {
            IpcClient::run_command(&socket_path, "ping", vec![]).await?;
        }
        Commands::Windows => {
            IpcClient::run_command(&socket_path, "list", vec![]).await?;
        }
        Commands::Open { panel } => {
            IpcClient::run_command(&socket_path, "open", vec![panel]).await?;
        }
        Commands::Stop => {
            info!("Stopping deskfolio");
            IpcClient::run_command(&socket_path, "quit", vec![]).await?;
        }
        Commands::Contact {
            name,
            email,
            subject,
            message,
            url,
        } => {
            let url = url.unwrap_or_else(|| format!("http://{}", config.server.bind_addr));
            let client = ContactClient::new(&url);
            let mut form = ContactForm::new();
            form.set_field("name", name)?;
            form.set_field("email", email)?;
            form.set_field("subject", subject)?;
            form.set_field("message", message)?;

            let status = form.submit(&client).await?;
            match status.message() {
                Some(text) => println!("{}", text),
                None => println!("Nothing sent"),
            }
        }
    }

    Ok(())
}

async fn serve(config: Config, bind: String) -> Result<()> {
    info!("Starting deskfolio");

    let catalog = Catalog::builtin();
    let manager = WindowManager::from_config(catalog.clone(), &config.desktop);
    let (session, handle) = DesktopSession::new(manager);
    let mut session_task = tokio::spawn(session.run());

    let ipc_server = deskfolio::ipc::IpcServer::new(&config.ipc, handle.clone());
    ipc_server.start().await?;

    let provider = Arc::new(ResendProvider::new(&config.mail.api_url));
    let api_key = config.mail.api_key();
    let state = AppState::new(handle, catalog, config.mail.clone(), api_key, provider);

    let listener = TcpListener::bind(&bind).await?;

    tokio::select! {
        result = server::serve(listener, state) => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        }
        _ = &mut session_task => {
            info!("Desktop session ended, shutting down");
        }
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
