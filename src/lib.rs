pub mod config;

use api::App;
use core::{convert::Infallible, future::Future, pin::pin};
use db::Store;
use hyper::{body::Incoming, server::conn::http1, service::service_fn, Request};
use hyper_util::rt::TokioIo;
use std::{io, sync::Arc};
use tokio::net::TcpListener;

/// Accepts connections until `shutdown` completes. Each connection is served
/// on its own task.
pub async fn serve<S, F>(listener: TcpListener, app: Arc<App<S>>, shutdown: F) -> io::Result<()>
where
    S: Store,
    F: Future<Output = ()>,
{
    log::info!("listening on {}", listener.local_addr()?);
    let mut shutdown = pin!(shutdown);
    loop {
        let accepted = tokio::select! {
            biased;
            _ = &mut shutdown => break,
            accepted = listener.accept() => accepted,
        };

        let (stream, addr) = match accepted {
            Ok(pair) => pair,
            Err(err) => {
                log::warn!("failed to accept connection: {err}");
                continue;
            }
        };

        let app = app.clone();
        let service = service_fn(move |req: Request<Incoming>| {
            let app = app.clone();
            async move { Ok::<_, Infallible>(app.respond(req).await) }
        });
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                log::error!("connection with {addr} failed: {err}");
            }
        });
    }

    log::info!("no longer accepting connections");
    Ok(())
}
