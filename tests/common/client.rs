use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const QUIET_WINDOW: Duration = Duration::from_millis(200);

/// One TCP client speaking the line protocol.
pub struct TestClient {
    reader: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    /// Connect and consume the welcome banner.
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (read, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read).lines(),
            writer,
        };
        let banner = client.recv().await;
        assert!(
            banner.starts_with("SYSTEM|") && banner.contains("LOGIN:<username>"),
            "unexpected banner: {banner}"
        );
        client
    }

    /// Connect and log in, asserting the OK acknowledgement.
    pub async fn login(addr: SocketAddr, username: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client.send(&format!("LOGIN:{username}")).await;
        let ack = client.recv().await;
        assert!(
            ack.starts_with(&format!("OK|SYSTEM|{username}|")),
            "login failed: {ack}"
        );
        client
    }

    pub async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("write line");
    }

    /// Next line, failing the test after a timeout.
    pub async fn recv(&mut self) -> String {
        timeout(RECV_TIMEOUT, self.reader.next_line())
            .await
            .expect("timed out waiting for a line")
            .expect("read line")
            .expect("connection closed")
    }

    /// Send and return the first response line.
    pub async fn request(&mut self, line: &str) -> String {
        self.send(line).await;
        self.recv().await
    }

    /// Assert nothing arrives for a short window.
    pub async fn expect_silence(&mut self) {
        if let Ok(line) = timeout(QUIET_WINDOW, self.reader.next_line()).await {
            panic!("expected silence, got: {:?}", line.expect("read line"));
        }
    }

    /// Assert the server closed the connection.
    pub async fn expect_closed(&mut self) {
        let eof = timeout(RECV_TIMEOUT, async {
            loop {
                match self.reader.next_line().await {
                    Ok(Some(_)) => continue,
                    Ok(None) => break true,
                    Err(_) => break true,
                }
            }
        })
        .await
        .expect("timed out waiting for close");
        assert!(eof);
    }
}
