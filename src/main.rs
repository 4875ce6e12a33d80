use anyhow::Context;
use api::App;
use db::{Database, Memory, NoTls};
use mocktest::config::Config;
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::{net::TcpListener, runtime::Runtime, signal};

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenv::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let runtime = Runtime::new()?;
    runtime.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = (Ipv4Addr::UNSPECIFIED, config.port).into();
    let listener = TcpListener::bind(addr).await.with_context(|| format!("cannot bind to {addr}"))?;
    let origin = config.frontend_url;

    match config.postgres {
        Some(postgres) => {
            let (client, conn) =
                postgres.to_config().connect(NoTls).await.context("cannot connect to database")?;
            tokio::spawn(async move {
                if let Err(err) = conn.await {
                    log::error!("database connection closed: {err}");
                }
            });

            let db = Database::from(client);
            db.migrate().await.map_err(|err| anyhow::anyhow!("cannot apply schema: {err}"))?;
            log::info!("connected to database {} at {}", postgres.dbname, postgres.host);
            mocktest::serve(listener, Arc::new(App::new(db, origin)), shutdown()).await?;
        }
        None => {
            log::warn!("PG_HOSTNAME is not set, questions are kept in memory only");
            mocktest::serve(listener, Arc::new(App::new(Memory::default(), origin)), shutdown()).await?;
        }
    }

    Ok(())
}

/// Completes on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown() {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("cannot listen for Ctrl-C: {err}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                log::error!("cannot listen for SIGTERM: {err}");
                core::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
    log::info!("shutting down");
}
