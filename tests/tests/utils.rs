use mock_service::MockState;
use std::net::SocketAddr;
use std::sync::OnceLock;
use tokio::net::TcpListener;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

pub const TOKEN: &str = "integration-token";

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter("stampede=debug,mock_service=debug,axum::rejection=trace")
            .try_init();
    });
}

/// Serve a fresh mock API on an ephemeral port.
#[allow(unused)]
pub async fn spawn_mock(max_tps: u32) -> anyhow::Result<(SocketAddr, MockState)> {
    let state = MockState::new(TOKEN, max_tps);
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = state.clone();
    tokio::spawn(async move {
        if let Err(err) = mock_service::serve(listener, server).await {
            error!("Mock service failed: {err}");
        }
    });

    Ok((addr, state))
}
