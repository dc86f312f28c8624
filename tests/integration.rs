//! End-to-end tests over real sockets
//!
//! Each test starts a server on an ephemeral port with its own storage
//! directory, drives it with a plain TCP client, and checks the wire
//! responses and the files left on disk.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

use dropftp::{Server, ServerConfig};

static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

async fn start_server(layout: &str) -> (SocketAddr, PathBuf) {
    let storage = std::env::temp_dir().join(format!(
        "dropftp-test-{}-{}",
        std::process::id(),
        DIR_SEQ.fetch_add(1, Ordering::SeqCst)
    ));
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ftp_dir: storage.to_string_lossy().into_owned(),
        layout: layout.to_string(),
    };
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(async move { server.run().await });
    (addr, storage)
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> TestClient {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        let mut client = TestClient {
            reader: BufReader::new(read_half),
            writer,
        };
        assert_eq!(client.read_line().await, "220 Ftp Server Ready");
        client
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\r\n").await.unwrap();
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line.trim_end().to_string()
    }

    async fn cmd(&mut self, line: &str) -> String {
        self.send(line).await;
        self.read_line().await
    }
}

fn port_command(port: u16) -> String {
    format!("PORT 127,0,0,1,{},{}", port >> 8, port & 0xff)
}

fn epsv_port(reply: &str) -> u16 {
    let inner = reply
        .strip_prefix("229 Entering Extended Passive Mode (|||")
        .and_then(|rest| rest.strip_suffix("|)"))
        .unwrap_or_else(|| panic!("unexpected EPSV reply: {}", reply));
    inner.parse().unwrap()
}

fn pattern_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[tokio::test]
async fn quit_is_the_last_line_before_the_socket_closes() {
    let (addr, _dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(client.cmd("QUIT").await, "221 Goodbye.");

    let mut line = String::new();
    let n = client.reader.read_line(&mut line).await.unwrap();
    assert_eq!(n, 0, "expected end of stream after QUIT");
}

#[tokio::test]
async fn port_acknowledges_a_valid_tuple() {
    let (addr, _dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(
        client.cmd("PORT 127,0,0,1,20,21").await,
        "200 Port command successful"
    );
}

#[tokio::test]
async fn simple_verbs_reply_with_their_fixed_lines() {
    let (addr, _dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(client.cmd("USER bob").await, "331 Password required for User.");
    assert_eq!(client.cmd("PASS hunter2").await, "230 User logged in");
    assert_eq!(client.cmd("SIZE").await, "213 0");
    assert_eq!(
        client.cmd("CWD /incoming").await,
        "250 Directory successfully changed."
    );
    assert_eq!(
        client.cmd("PWD").await,
        "257 \"/incoming\" is the current directory"
    );
}

#[tokio::test]
async fn type_i_is_acknowledged_and_type_a_is_not() {
    let (addr, _dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(client.cmd("TYPE I").await, "200 Switching to Binary mode.");

    // TYPE A draws no reply at all; the next command answering PWD
    // proves nothing was queued for it.
    client.send("TYPE A").await;
    assert_eq!(
        client.cmd("PWD").await,
        "257 \"/\" is the current directory"
    );
}

#[tokio::test]
async fn unknown_commands_draw_the_greeting_line() {
    let (addr, _dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(client.cmd("FOO").await, "220 Ftp Server Ready");
    assert_eq!(
        client.cmd("PWD").await,
        "257 \"/\" is the current directory"
    );
}

#[tokio::test]
async fn malformed_commands_draw_a_syntax_error_and_the_session_survives() {
    let (addr, _dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    let syntax_error = "501 Syntax error in parameters or arguments";
    assert_eq!(client.cmd("CWD").await, syntax_error);
    assert_eq!(client.cmd("PORT 127,0,0,1").await, syntax_error);
    assert_eq!(client.cmd("PORT 127,0,0,1,999,1").await, syntax_error);
    assert_eq!(client.cmd("").await, syntax_error);
    assert_eq!(
        client.cmd("PWD").await,
        "257 \"/\" is the current directory"
    );
}

#[tokio::test]
async fn stor_without_a_channel_source_responds_425() {
    let (addr, _dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(
        client.cmd("STOR orphan.txt").await,
        "425 Can't open data connection"
    );
    assert_eq!(
        client.cmd("PWD").await,
        "257 \"/\" is the current directory"
    );
}

#[tokio::test]
async fn mid_stream_failure_aborts_with_426_and_the_session_survives() {
    let (addr, dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    let port = epsv_port(&client.cmd("EPSV").await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    client.send("STOR wedge.bin").await;
    assert_eq!(client.read_line().await, "150 Ok to send data.");

    // Reset the data connection mid-transfer instead of closing it
    // cleanly; the server must see an error, not end of stream.
    data.write_all(&pattern_bytes(1024)).await.unwrap();
    data.set_linger(Some(Duration::ZERO)).unwrap();
    drop(data);

    assert_eq!(
        client.read_line().await,
        "426 Connection closed; transfer aborted"
    );
    // The partial destination file stays in place; only the transfer
    // died.
    assert!(dir.join("wedge.bin").is_file());

    assert_eq!(
        client.cmd("PWD").await,
        "257 \"/\" is the current directory"
    );
    assert_eq!(client.cmd("QUIT").await, "221 Goodbye.");
}

#[tokio::test]
async fn create_failure_responds_550_and_the_session_survives() {
    let (addr, dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    // A regular file sits where the destination needs a directory.
    std::fs::write(dir.join("blocker"), b"plain file").unwrap();

    let port = epsv_port(&client.cmd("EPSV").await);
    let _data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    client.send("STOR blocker/inner.txt").await;
    assert_eq!(client.read_line().await, "550 Cannot create file");

    assert_eq!(
        client.cmd("PWD").await,
        "257 \"/\" is the current directory"
    );
}

#[tokio::test]
async fn stor_over_active_mode_writes_the_file() {
    let (addr, dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    let data_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let data_port = data_listener.local_addr().unwrap().port();
    assert_eq!(
        client.cmd(&port_command(data_port)).await,
        "200 Port command successful"
    );

    client.send("STOR upload.bin").await;
    assert_eq!(client.read_line().await, "150 Opening data connection");
    let (mut data, _) = data_listener.accept().await.unwrap();
    assert_eq!(client.read_line().await, "150 Ok to send data.");

    let payload = pattern_bytes(4096);
    data.write_all(&payload).await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);

    assert_eq!(client.read_line().await, "226 Transfer complete.");
    assert_eq!(std::fs::read(dir.join("upload.bin")).unwrap(), payload);
}

#[tokio::test]
async fn stor_over_passive_mode_writes_the_file() {
    let (addr, dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    let port = epsv_port(&client.cmd("EPSV").await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    client.send("STOR passive.bin").await;
    assert_eq!(client.read_line().await, "150 Ok to send data.");

    let payload = pattern_bytes(10_000);
    data.write_all(&payload).await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);

    assert_eq!(client.read_line().await, "226 Transfer complete.");
    assert_eq!(std::fs::read(dir.join("passive.bin")).unwrap(), payload);
}

#[tokio::test]
async fn stor_round_trips_buffer_boundary_sizes() {
    let (addr, dir) = start_server("flat").await;

    for (i, size) in [0usize, 1, 8192, 8193].into_iter().enumerate() {
        let mut client = TestClient::connect(addr).await;
        let port = epsv_port(&client.cmd("EPSV").await);
        let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

        let name = format!("chunk-{}.bin", i);
        client.send(&format!("STOR {}", name)).await;
        assert_eq!(client.read_line().await, "150 Ok to send data.");

        let payload = pattern_bytes(size);
        data.write_all(&payload).await.unwrap();
        data.shutdown().await.unwrap();
        drop(data);

        assert_eq!(client.read_line().await, "226 Transfer complete.");
        let stored = std::fs::read(dir.join(&name)).unwrap();
        assert_eq!(stored.len(), size);
        assert_eq!(stored, payload);

        assert_eq!(client.cmd("QUIT").await, "221 Goodbye.");
    }
}

#[tokio::test]
async fn uploads_land_under_user_and_date_segments() {
    let (addr, dir) = start_server("user-date").await;
    let mut client = TestClient::connect(addr).await;

    assert_eq!(
        client.cmd("USER alice").await,
        "331 Password required for User."
    );
    assert_eq!(client.cmd("PASS secret").await, "230 User logged in");

    let port = epsv_port(&client.cmd("EPSV").await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    // The server stamps the date during the upload, so a run straddling
    // midnight may land on either day.
    let before = Local::now().date_naive();
    client.send("STOR report.txt").await;
    assert_eq!(client.read_line().await, "150 Ok to send data.");
    data.write_all(b"quarterly numbers").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.read_line().await, "226 Transfer complete.");
    let after = Local::now().date_naive();

    let stored = [before, after]
        .iter()
        .map(|date| {
            dir.join("alice")
                .join(date.format("%Y/%m/%d").to_string())
                .join("report.txt")
        })
        .find(|path| path.is_file())
        .expect("upload missing under both candidate dates");
    assert_eq!(
        std::fs::read_to_string(&stored).unwrap(),
        "quarterly numbers"
    );
}

#[tokio::test]
async fn date_layout_skips_the_user_segment() {
    let (addr, dir) = start_server("date").await;
    let mut client = TestClient::connect(addr).await;

    let port = epsv_port(&client.cmd("EPSV").await);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    let before = Local::now().date_naive();
    client.send("STOR drop.bin").await;
    assert_eq!(client.read_line().await, "150 Ok to send data.");
    data.write_all(b"x").await.unwrap();
    data.shutdown().await.unwrap();
    drop(data);
    assert_eq!(client.read_line().await, "226 Transfer complete.");
    let after = Local::now().date_naive();

    let stored = [before, after]
        .iter()
        .map(|date| dir.join(date.format("%Y/%m/%d").to_string()).join("drop.bin"))
        .find(|path| path.is_file());
    assert!(stored.is_some());
}

#[tokio::test]
async fn repeated_epsv_closes_the_superseded_listener() {
    let (addr, _dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    let first = epsv_port(&client.cmd("EPSV").await);
    let second = epsv_port(&client.cmd("EPSV").await);
    assert_ne!(first, second);

    assert!(TcpStream::connect(("127.0.0.1", first)).await.is_err());
    assert!(TcpStream::connect(("127.0.0.1", second)).await.is_ok());
}

#[tokio::test]
async fn retr_opens_and_closes_the_data_connection_without_bytes() {
    let (addr, _dir) = start_server("flat").await;
    let mut client = TestClient::connect(addr).await;

    let data_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let data_port = data_listener.local_addr().unwrap().port();
    assert_eq!(
        client.cmd(&port_command(data_port)).await,
        "200 Port command successful"
    );

    client.send("RETR anything.txt").await;
    assert_eq!(client.read_line().await, "150 Opening data connection");
    let (mut data, _) = data_listener.accept().await.unwrap();
    assert_eq!(client.read_line().await, "226 Transfer complete");

    let mut received = Vec::new();
    data.read_to_end(&mut received).await.unwrap();
    assert!(received.is_empty());
}

#[tokio::test]
async fn sessions_keep_their_state_to_themselves() {
    let (addr, _dir) = start_server("flat").await;
    let mut first = TestClient::connect(addr).await;
    let mut second = TestClient::connect(addr).await;

    assert_eq!(
        first.cmd("CWD /one").await,
        "250 Directory successfully changed."
    );
    assert_eq!(
        second.cmd("PWD").await,
        "257 \"/\" is the current directory"
    );
    assert_eq!(
        first.cmd("PWD").await,
        "257 \"/one\" is the current directory"
    );
}
