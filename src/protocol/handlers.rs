//! Command handlers
//!
//! One handler per verb plus the dispatcher that routes a parsed
//! command. Handlers write their own response lines; the returned flow
//! tells the session loop whether to keep reading. Errors out of this
//! module are control-channel write failures, which end the session.

use std::io;
use std::net::SocketAddrV4;

use chrono::Local;
use log::{debug, info, warn};
use tokio::io::AsyncWrite;
use tokio::net::TcpListener;

use crate::error::TransferError;
use crate::protocol::commands::Command;
use crate::protocol::responses::{self, send_line};
use crate::protocol::translators::transfer_failure_response;
use crate::server::ServerConfig;
use crate::session::Session;
use crate::transfer::{self, DataChannel};

/// Whether the session loop keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Quit,
}

/// Routes one parsed command to its handler.
pub async fn handle_command<W>(
    session: &mut Session,
    writer: &mut W,
    command: Command,
    config: &ServerConfig,
) -> io::Result<SessionFlow>
where
    W: AsyncWrite + Unpin,
{
    match command {
        Command::PWD => handle_cmd_pwd(session, writer).await?,
        Command::CWD(dir) => handle_cmd_cwd(session, writer, dir).await?,
        Command::TYPE(mode) => handle_cmd_type(session, writer, mode).await?,
        Command::PORT(addr) => handle_cmd_port(session, writer, addr).await?,
        Command::USER(name) => handle_cmd_user(session, writer, name).await?,
        Command::SIZE => handle_cmd_size(session, writer).await?,
        Command::EPSV => handle_cmd_epsv(session, writer, config).await?,
        Command::STOR(filename) => handle_cmd_stor(session, writer, filename, config).await?,
        Command::RETR => handle_cmd_retr(session, writer).await?,
        Command::QUIT => {
            send_line(writer, responses::GOODBYE).await?;
            return Ok(SessionFlow::Quit);
        }
        Command::OTHER(verb) => handle_cmd_other(session, writer, &verb).await?,
    }
    Ok(SessionFlow::Continue)
}

async fn handle_cmd_pwd<W>(session: &mut Session, writer: &mut W) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    send_line(writer, &responses::current_directory(session.current_dir())).await
}

async fn handle_cmd_cwd<W>(session: &mut Session, writer: &mut W, dir: String) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    // The argument is tracked verbatim; nothing checks it exists.
    session.set_current_dir(dir);
    send_line(writer, responses::DIRECTORY_CHANGED).await
}

async fn handle_cmd_type<W>(session: &mut Session, writer: &mut W, mode: String) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    // Only TYPE I is acknowledged. Any other mode draws no response at
    // all, which clients tolerate; kept as is.
    if mode == "I" {
        session.set_binary_mode(true);
        send_line(writer, responses::BINARY_MODE).await?;
    } else {
        debug!("TYPE {} ignored", mode);
    }
    Ok(())
}

async fn handle_cmd_port<W>(
    session: &mut Session,
    writer: &mut W,
    addr: SocketAddrV4,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    session.set_data_addr(addr);
    debug!("Client data address set to {}", addr);
    send_line(writer, responses::PORT_OK).await
}

async fn handle_cmd_user<W>(session: &mut Session, writer: &mut W, name: String) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    // The name is recorded for storage paths; no password is ever
    // checked.
    session.set_user(name);
    send_line(writer, responses::PASSWORD_REQUIRED).await
}

async fn handle_cmd_size<W>(session: &mut Session, writer: &mut W) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    send_line(writer, &responses::size_of(session.size())).await
}

async fn handle_cmd_epsv<W>(
    session: &mut Session,
    writer: &mut W,
    config: &ServerConfig,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let listener = match TcpListener::bind((config.host.as_str(), 0)).await {
        Ok(listener) => listener,
        Err(err) => {
            warn!("EPSV bind failed: {}", err);
            return send_line(writer, responses::CANT_OPEN_DATA_CONNECTION).await;
        }
    };
    let port = match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(err) => {
            warn!("EPSV local_addr failed: {}", err);
            return send_line(writer, responses::CANT_OPEN_DATA_CONNECTION).await;
        }
    };
    session.set_passive(listener);
    debug!("Passive listener opened on port {}", port);
    send_line(writer, &responses::passive_mode(port)).await
}

async fn handle_cmd_stor<W>(
    session: &mut Session,
    writer: &mut W,
    filename: String,
    config: &ServerConfig,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let channel = match session.take_passive() {
        Some(listener) => DataChannel::accept(listener).await,
        None => match session.data_addr() {
            Some(addr) => {
                send_line(writer, responses::OPENING_DATA_CONNECTION).await?;
                DataChannel::connect(addr).await
            }
            None => Err(TransferError::NoDataChannel),
        },
    };
    let mut channel = match channel {
        Ok(channel) => channel,
        Err(err) => {
            warn!("STOR {}: {}", filename, err);
            return send_line(writer, transfer_failure_response(&err)).await;
        }
    };

    // A layout that does not parse means there is nowhere to create the
    // file; the early return drops the channel like any other failure.
    let layout = match config.storage_layout() {
        Ok(layout) => layout,
        Err(err) => {
            warn!("STOR {}: {}", filename, err);
            return send_line(writer, responses::CANT_CREATE_FILE).await;
        }
    };
    let dest = layout.destination(
        &config.ftp_dir_path(),
        session.user(),
        &filename,
        Local::now().date_naive(),
    );
    if let Err(err) = transfer::prepare_destination(&dest).await {
        warn!("STOR {}: {}", dest.display(), err);
        return send_line(writer, transfer_failure_response(&err)).await;
    }
    send_line(writer, responses::OK_TO_SEND).await?;

    match transfer::receive_file(&mut channel, &dest).await {
        Ok(bytes) => {
            drop(channel);
            info!("Stored {} ({} bytes)", dest.display(), bytes);
            send_line(writer, responses::STOR_COMPLETE).await
        }
        Err(err) => {
            // The partial file stays in place; only the channel closes.
            drop(channel);
            warn!("STOR {}: {}", dest.display(), err);
            send_line(writer, transfer_failure_response(&err)).await
        }
    }
}

async fn handle_cmd_retr<W>(session: &mut Session, writer: &mut W) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let addr = match session.data_addr() {
        Some(addr) => addr,
        None => {
            warn!("RETR with no data address");
            return send_line(writer, responses::CANT_OPEN_DATA_CONNECTION).await;
        }
    };
    send_line(writer, responses::OPENING_DATA_CONNECTION).await?;
    match DataChannel::connect(addr).await {
        Ok(channel) => {
            // Downloads are not implemented; the channel opens and
            // closes without carrying bytes.
            drop(channel);
            send_line(writer, responses::RETR_COMPLETE).await
        }
        Err(err) => {
            warn!("RETR: {}", err);
            send_line(writer, transfer_failure_response(&err)).await
        }
    }
}

async fn handle_cmd_other<W>(session: &mut Session, writer: &mut W, verb: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    match session.canned_response(verb) {
        Some(line) => send_line(writer, line).await,
        None => {
            // Unknown verbs draw the greeting line again. Clients in the
            // field depend on getting some reply, so this stays.
            debug!("Unrecognized command {}", verb);
            send_line(writer, responses::READY).await
        }
    }
}
