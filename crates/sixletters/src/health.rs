//! Health-check listener for a load balancer agent.
//!
//! Each connection gets `drain\n` while the server is phasing out and
//! nothing otherwise, then the connection is closed.

use sixletters_room::HubHandle;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Accepts health probes until the task is aborted.
pub(crate) async fn run_health(listener: TcpListener, hub: HubHandle) {
    loop {
        let mut stream = match listener.accept().await {
            Ok((stream, _)) => stream,
            Err(e) => {
                tracing::error!(error = %e, "health accept failed");
                continue;
            }
        };
        let draining = hub.is_draining();
        tokio::spawn(async move {
            if draining {
                let _ = stream.write_all(b"drain\n").await;
            }
            let _ = stream.shutdown().await;
        });
    }
}
