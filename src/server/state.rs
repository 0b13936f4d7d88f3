use std::sync::Arc;

use tokio::sync::watch;

/// Whether the supervisor should keep accepting connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Running,
    Stopped,
}

/// Write side of the server state flag.
///
/// The flag only ever moves from `Running` to `Stopped`.
#[derive(Debug, Clone)]
pub struct ServerControl {
    tx: Arc<watch::Sender<ServerState>>,
}

impl ServerControl {
    /// Creates the flag in the `Running` state, with one receiver for the
    /// supervisor.
    pub fn new() -> (Self, watch::Receiver<ServerState>) {
        let (tx, rx) = watch::channel(ServerState::Running);
        (Self { tx: Arc::new(tx) }, rx)
    }

    pub fn state(&self) -> ServerState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.tx.subscribe()
    }

    /// Requests shutdown. Returns `true` only for the call that flipped the flag.
    pub fn stop(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == ServerState::Stopped {
                return false;
            }
            *state = ServerState::Stopped;
            true
        })
    }
}
