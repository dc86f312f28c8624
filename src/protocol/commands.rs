//! Module `commands`
//!
//! Defines the FTP command enum and the parsing logic that turns raw
//! client lines into commands.

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::CommandError;

/// Represents an FTP command parsed from client input.
///
/// Each variant corresponds to a command the server acts on. Verbs the
/// server only answers from the canned response table (or not at all)
/// are carried as `OTHER` with the uppercased verb.
#[derive(Debug, PartialEq)]
pub enum Command {
    PWD,
    CWD(String),
    TYPE(String),
    PORT(SocketAddrV4),
    USER(String),
    SIZE,
    EPSV,
    STOR(String),
    RETR,
    QUIT,
    OTHER(String),
}

/// Parses a raw command line into the `Command` enum.
///
/// The verb is case-normalized; arguments are taken verbatim. Lines that
/// are empty, miss a required argument, or carry an unparseable PORT
/// tuple come back as `CommandError`, so the dispatcher can answer with
/// a syntax error instead of dropping the session.
pub fn parse_command(raw: &str) -> Result<Command, CommandError> {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let arg = parts.next().unwrap_or("").trim();

    if cmd.is_empty() {
        return Err(CommandError::EmptyLine);
    }

    let command = match cmd.as_str() {
        "PWD" => Command::PWD,
        "CWD" => Command::CWD(require_arg("CWD", arg)?.to_string()),
        "TYPE" => Command::TYPE(require_arg("TYPE", arg)?.to_string()),
        "PORT" => Command::PORT(parse_port_tuple(require_arg("PORT", arg)?)?),
        "USER" => Command::USER(require_arg("USER", arg)?.to_string()),
        "SIZE" => Command::SIZE,
        "EPSV" => Command::EPSV,
        "STOR" => Command::STOR(require_arg("STOR", arg)?.to_string()),
        "RETR" => Command::RETR,
        "QUIT" => Command::QUIT,
        _ => Command::OTHER(cmd),
    };

    Ok(command)
}

fn require_arg<'a>(verb: &'static str, arg: &'a str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument(verb))
    } else {
        Ok(arg)
    }
}

/// Decodes the standard FTP `h1,h2,h3,h4,p1,p2` tuple into the client's
/// data address; the port is `(p1 << 8) | p2`.
fn parse_port_tuple(arg: &str) -> Result<SocketAddrV4, CommandError> {
    let bad = || CommandError::BadPortTuple(arg.to_string());

    let octets: Vec<u8> = arg
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| bad())?;

    if octets.len() != 6 {
        return Err(bad());
    }

    let addr = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = (u16::from(octets[4]) << 8) | u16::from(octets[5]);

    Ok(SocketAddrV4::new(addr, port))
}
