//! Owning handle for the cooperative per-task-class model (§5): each
//! `Table` partition, `SchedulingGroup` send loop, and the single
//! `PeerMembership`/`SendReadyTask` run as one of these. Dropping the
//! handle aborts the task unless `detach` was called, so tearing down a
//! table or scheduling group cannot leak a runaway loop.

use std::future::Future;
use tokio::task;

#[derive(Debug)]
pub struct Task<T> {
    join_handle: task::JoinHandle<T>,
    detached: bool,
}

impl<T> Task<T> {
    pub fn spawn<Fut>(future: Fut) -> Task<T>
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Task {
            join_handle: task::spawn(future),
            detached: false,
        }
    }

    pub fn detach(&mut self) {
        self.detached = true;
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        if !self.detached {
            self.join_handle.abort();
        }
    }
}
