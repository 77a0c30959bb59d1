use std::net::SocketAddr;
use talkd::Config;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server running in-process on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn with the default configuration (seed room "general", id 100).
    pub async fn spawn() -> Self {
        Self::spawn_with(Config::default()).await
    }

    pub async fn spawn_with(config: Config) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            if let Err(error) = talkd::run_with_listener(config, listener).await {
                panic!("server exited: {error}");
            }
        });
        Self { addr, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
