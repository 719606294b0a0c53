use tokio::sync::{Mutex, oneshot};

use crate::error::RefreshError;

type Waiter = oneshot::Sender<Result<String, RefreshError>>;

/// Coordinates the single-flight token refresh.
///
/// The first request to hit a 401 becomes the leader and performs the actual
/// refresh call; every other request arriving while that call is in flight
/// parks on a oneshot and is resolved in enqueue order when the leader
/// finishes. Owned by the client instance, not a process-wide static.
#[derive(Default)]
pub struct RefreshGate {
    inner: Mutex<GateInner>,
}

#[derive(Default)]
struct GateInner {
    in_flight: bool,
    waiters: Vec<Waiter>,
}

/// Outcome of [`RefreshGate::begin`].
pub enum Ticket {
    /// Caller owns the refresh; it must call [`RefreshGate::finish`].
    Leader,
    /// A refresh is already running; await the shared outcome.
    Follower(oneshot::Receiver<Result<String, RefreshError>>),
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn begin(&self) -> Ticket {
        let mut gate = self.inner.lock().await;
        if gate.in_flight {
            let (tx, rx) = oneshot::channel();
            gate.waiters.push(tx);
            Ticket::Follower(rx)
        } else {
            gate.in_flight = true;
            Ticket::Leader
        }
    }

    pub async fn in_flight(&self) -> bool {
        self.inner.lock().await.in_flight
    }

    /// Completes the current refresh: re-arms the gate and fans the outcome
    /// out to every parked waiter in FIFO order.
    pub async fn finish(&self, outcome: Result<String, RefreshError>) {
        let waiters = {
            let mut gate = self.inner.lock().await;
            gate.in_flight = false;
            std::mem::take(&mut gate.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}
