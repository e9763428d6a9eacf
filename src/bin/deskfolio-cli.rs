use deskfolio::ipc::IpcClient;
use deskfolio::Config;

#[tokio::main]
async fn main() -> deskfolio::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: deskfolio-cli <command> [args...]");
        eprintln!("Commands: ping, help, open, close, focus, move, resize, press, drag, release, list, status, quit");
        std::process::exit(1);
    }

    let command = &args[1];
    let command_args = args[2..].to_vec();

    let socket_path = std::env::var("DESKFOLIO_SOCKET")
        .unwrap_or_else(|_| Config::default().ipc.socket_path);

    if let Err(e) = IpcClient::run_command(&socket_path, command, command_args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
