use std::process;

use log::{error, info};

use dropftp::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            process::exit(1);
        }
    };
    info!(
        "Starting FTP server on port {} storing under {}",
        config.port, config.ftp_dir
    );

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(err) => {
            error!("Failed to bind control listener: {}", err);
            process::exit(1);
        }
    };
    server.run().await;
}
