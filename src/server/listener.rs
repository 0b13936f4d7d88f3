use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionSettings, Outcome};
use crate::http::router::Router;
use crate::server::slots::{SlotStatus, SlotTable};
use crate::server::state::ServerState;

/// How shutdown went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers still serving a client when the server stopped
    pub aborted: usize,
    /// Workers whose join failed for a reason other than the abort
    pub failed: usize,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

struct Worker {
    id: u64,
    handle: JoinHandle<anyhow::Result<()>>,
}

/// Owns the listening socket and every worker task.
pub struct Supervisor {
    listener: TcpListener,
    slots: SlotTable,
    workers: HashMap<usize, Worker>,
    router: Arc<Router>,
    settings: ConnectionSettings,
    housekeeping_interval: Duration,
    state: watch::Receiver<ServerState>,
    next_worker_id: u64,
}

impl Supervisor {
    /// Binds the listening socket (with address reuse) and prepares an empty
    /// slot table of `max_connections` entries.
    pub async fn start(
        cfg: &Config,
        router: Router,
        state: watch::Receiver<ServerState>,
    ) -> anyhow::Result<Self> {
        let addr = tokio::net::lookup_host(&cfg.server.listen_addr)
            .await
            .with_context(|| format!("Invalid listen address {}", cfg.server.listen_addr))?
            .next()
            .with_context(|| format!("{} did not resolve", cfg.server.listen_addr))?;

        let listener = bind(addr, cfg.server.backlog)
            .with_context(|| format!("Cannot listen on {}", addr))?;

        info!(
            addr = %listener.local_addr()?,
            max_connections = cfg.server.max_connections,
            root = %router.root().display(),
            "Listening"
        );

        Ok(Self {
            listener,
            slots: SlotTable::new(cfg.server.max_connections),
            workers: HashMap::new(),
            router: Arc::new(router),
            settings: cfg.connection_settings(),
            housekeeping_interval: cfg.server.housekeeping_interval(),
            state,
            next_worker_id: 0,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle on the slot table, for observing connection state.
    pub fn slot_table(&self) -> SlotTable {
        self.slots.clone()
    }

    /// Accept loop. Runs until the server state becomes `Stopped` (or every
    /// control handle is gone), then shuts all workers down.
    ///
    /// An accept failure ends the loop and is returned as an error after the
    /// workers have been shut down.
    pub async fn run(mut self) -> anyhow::Result<ShutdownReport> {
        let mut fatal = None;

        loop {
            if *self.state.borrow() == ServerState::Stopped {
                break;
            }

            tokio::select! {
                changed = self.state.changed() => {
                    if changed.is_err() {
                        info!("Server control dropped");
                        break;
                    }
                }

                accepted = timeout(self.housekeeping_interval, self.listener.accept()) => {
                    match accepted {
                        Err(_) => self.housekeeping().await,
                        Ok(Ok((socket, peer))) => self.admit(socket, peer).await,
                        Ok(Err(e)) => {
                            error!(error = %e, "Accept failed");
                            fatal = Some(e);
                            break;
                        }
                    }
                }
            }
        }

        let report = self.shutdown().await;

        match fatal {
            Some(e) => Err(anyhow::Error::new(e).context("Cannot accept connections")),
            None => Ok(report),
        }
    }

    /// Claims a slot and spawns a worker, or drops the connection when the
    /// table is full.
    async fn admit(&mut self, socket: TcpStream, peer: SocketAddr) {
        let id = self.next_worker_id;

        let mut index = self.slots.claim(peer, id).await;
        if index.is_none() && self.reclaim().await > 0 {
            index = self.slots.claim(peer, id).await;
        }

        let Some(index) = index else {
            warn!(
                peer = %peer,
                max_connections = self.slots.capacity(),
                "Too many connections, dropping client"
            );
            drop(socket);
            return;
        };

        self.next_worker_id += 1;
        debug!(peer = %peer, slot = index, worker = id, "Accepted connection");

        let handle = tokio::spawn(serve(
            index,
            socket,
            peer,
            self.slots.clone(),
            self.router.clone(),
            self.settings.clone(),
        ));
        self.workers.insert(index, Worker { id, handle });
    }

    /// Reclaims finished slots and reports how many clients are being served.
    async fn housekeeping(&mut self) {
        self.reclaim().await;

        let active = self.slots.count(SlotStatus::Working).await;
        info!(active, capacity = self.slots.capacity(), "Connected clients");
    }

    /// Collects every worker that has already exited and frees its slot.
    /// Never waits on a running worker. Returns the number of freed slots.
    async fn reclaim(&mut self) -> usize {
        let done: Vec<usize> = self
            .workers
            .iter()
            .filter(|(_, w)| w.handle.is_finished())
            .map(|(index, _)| *index)
            .collect();

        let mut freed = 0;
        for index in done {
            let Some(worker) = self.workers.remove(&index) else {
                continue;
            };

            match worker.handle.await {
                Ok(Ok(())) => debug!(worker = worker.id, "Worker exited"),
                Ok(Err(e)) => debug!(worker = worker.id, error = %e, "Worker exited with error"),
                Err(e) => warn!(worker = worker.id, error = %e, "Worker terminated abnormally"),
            }

            match self.slots.status(index).await {
                Some(SlotStatus::Stopped) => {
                    self.slots.release(index).await;
                }
                status => {
                    warn!(slot = index, status = ?status, "Recovering slot of a dead worker");
                    self.slots.recover(index).await;
                }
            }
            freed += 1;
        }
        freed
    }

    async fn shutdown(mut self) -> ShutdownReport {
        info!(workers = self.workers.len(), "Stopping supervisor");

        self.slots.finish_all().await;

        let mut report = ShutdownReport::default();
        for (_, worker) in self.workers.drain() {
            if !worker.handle.is_finished() {
                worker.handle.abort();
                report.aborted += 1;
            }

            match worker.handle.await {
                Ok(_) => {}
                Err(e) if e.is_cancelled() => debug!(worker = worker.id, "Worker aborted"),
                Err(e) => {
                    error!(worker = worker.id, error = %e, "Worker failed during shutdown");
                    report.failed += 1;
                }
            }
        }

        drop(self.listener);

        info!(aborted = report.aborted, failed = report.failed, "Supervisor stopped");
        report
    }
}

fn bind(addr: SocketAddr, backlog: u32) -> std::io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };

    // a restarted server can rebind right away
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(backlog)
}

/// Worker body: serves one request on `socket`, keeping slot `index` up to date.
async fn serve(
    index: usize,
    socket: TcpStream,
    peer: SocketAddr,
    slots: SlotTable,
    router: Arc<Router>,
    settings: ConnectionSettings,
) -> anyhow::Result<()> {
    if !slots.transition(index, SlotStatus::Working).await {
        debug!(peer = %peer, slot = index, "Server stopping, connection not served");
        return Ok(());
    }

    let result = Connection::new(socket, router, settings).run().await;

    match &result {
        Ok(Outcome::Responded {
            method,
            path,
            status,
            bytes,
        }) => info!(
            peer = %peer,
            method = %method,
            path = %path,
            status = *status,
            bytes = *bytes,
            "Request served"
        ),
        Ok(Outcome::Closed) => debug!(peer = %peer, "Client closed without a request"),
        Err(e) => warn!(peer = %peer, error = %e, "Connection aborted"),
    }

    slots.transition(index, SlotStatus::Stopped).await;
    result.map(|_| ())
}
