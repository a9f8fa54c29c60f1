mod config;

use api::{Bot, Hook};
use config::{Backend, Config};
use core::pin::pin;
use db::{Database, MemoryStore, PollStore};
use hyper::{body::Incoming, server::conn::http1, service::service_fn, Request};
use hyper_util::rt::TokioIo;
use std::{
    convert::Infallible,
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::{net::TcpListener, runtime::Runtime};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::from_env()?;
    let runtime = Runtime::new()?;
    runtime.block_on(run(config))
}

async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = (Ipv4Addr::UNSPECIFIED, config.port).into();
    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on {addr}");

    match config.backend {
        Backend::Memory => {
            log::warn!("PG_HOSTNAME is not set; polls will not survive a restart");
            let hook = Hook::new(Bot::new(MemoryStore::new(), config.timeout), config.token);
            serve(listener, hook).await?;
        }
        Backend::Postgres(pg) => {
            let db = Database::open(&pg).await.map_err(|err| anyhow::anyhow!("cannot open the poll database: {err}"))?;
            let hook = Hook::new(Bot::new(db, config.timeout), config.token);
            match serve(listener, hook).await? {
                Some(hook) => hook
                    .into_bot()
                    .into_store()
                    .close()
                    .await
                    .map_err(|err| anyhow::anyhow!("cannot close the poll database: {err}"))?,
                None => log::warn!("connections are still in flight; dropping the database handle"),
            }
        }
    }

    Ok(())
}

/// Serves webhook posts until Ctrl-C. Hands the hook back if no connection still holds onto it.
async fn serve<S: PollStore + 'static>(listener: TcpListener, hook: Hook<S>) -> anyhow::Result<Option<Hook<S>>> {
    let hook = Arc::new(hook);
    let mut shutdown = pin!(tokio::signal::ctrl_c());
    loop {
        let (stream, peer) = tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(err) => {
                    log::error!("failed to accept connection: {err}");
                    continue;
                }
            },
        };

        let hook = hook.clone();
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let hook = hook.clone();
                async move { Ok::<_, Infallible>(hook.respond(req).await) }
            });
            if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                log::error!("connection with {peer} failed: {err}");
            }
        });
    }

    log::info!("shutting down");
    Ok(Arc::into_inner(hook))
}
