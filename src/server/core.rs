use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::fs;
use tokio::net::TcpListener;

use crate::server::ServerConfig;
use crate::session;

pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the control listener and prepares the storage root.
    ///
    /// A bind failure is fatal to startup. A storage-root creation
    /// failure only warns, since each upload creates its own directories.
    pub async fn bind(config: ServerConfig) -> io::Result<Server> {
        if let Err(err) = fs::create_dir_all(config.ftp_dir_path()).await {
            warn!("Could not create storage root {}: {}", config.ftp_dir, err);
        }

        let listener = TcpListener::bind(config.control_addr()).await?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Server {
            listener,
            config: Arc::new(config),
        })
    }

    /// Address the control listener actually bound.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts control connections forever.
    ///
    /// Sessions run on their own tasks and never block this loop; a
    /// failed accept is logged and the loop carries on.
    pub async fn run(&self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("Accepted control connection from {}", addr);
                    let config = Arc::clone(&self.config);
                    tokio::spawn(session::handle_session(stream, config));
                }
                Err(err) => {
                    error!("Failed to accept connection: {}", err);
                }
            }
        }
    }
}
