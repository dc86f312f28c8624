use std::io;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;

use crate::protocol::{self, SessionFlow, responses};
use crate::server::ServerConfig;
use crate::session::Session;

/// Runs one control connection to completion.
///
/// Spawned per accepted connection. All errors are absorbed here so a
/// failing session never takes the accept loop down.
pub async fn handle_session(stream: TcpStream, config: Arc<ServerConfig>) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| String::from("unknown"));
    info!("Session started for {}", peer);

    if let Err(err) = run_session(stream, &config).await {
        error!("Session for {} ended with error: {}", peer, err);
    }
    info!("Session ended for {}", peer);
}

async fn run_session(stream: TcpStream, config: &ServerConfig) -> io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut session = Session::new();

    responses::send_line(&mut write_half, responses::READY).await?;
    debug!("Greeting sent");

    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            debug!("Control connection closed by peer");
            break;
        }
        info!("Received command: {}", line.trim_end());

        match protocol::parse_command(&line) {
            Ok(command) => {
                let flow =
                    protocol::handle_command(&mut session, &mut write_half, command, config)
                        .await?;
                if flow == SessionFlow::Quit {
                    break;
                }
            }
            Err(err) => {
                // Malformed lines draw a syntax error and the loop keeps
                // reading; they never end the session.
                warn!("Rejected command line: {}", err);
                responses::send_line(&mut write_half, responses::SYNTAX_ERROR).await?;
            }
        }
    }
    Ok(())
}
