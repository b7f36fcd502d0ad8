//! Partitioned per-family table (§4.D).
//!
//! A prefix hashes to exactly one of a fixed number of partitions; all
//! routes for that prefix live there, and all mutation of that
//! partition's state happens on one dedicated task draining a typed
//! request queue — "one task per partition at a time" falls directly
//! out of "only that task's loop ever touches the partition's map"
//! (§5). The mutation logic itself (`Partition::apply`) is a plain
//! synchronous function so it can be unit-tested without a Tokio
//! runtime; the per-partition `Task` in `spawn_partitions` is a thin
//! async loop around it, grounded on the `db::DBTable`
//! single-task-per-partition policy and the teacher's `Task<T>`
//! JoinHandle wrapper.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use bgp_packet::{AfiSafi, Prefix};

use crate::rib::instance::InstanceName;
use crate::rib::path::{Path, PathSource};
use crate::rib::route::Route;
use crate::task::Task;

pub const PARTITION_COUNT: usize = 16;

pub fn partition_of(prefix: &Prefix) -> usize {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    prefix.hash(&mut hasher);
    (hasher.finish() as usize) % PARTITION_COUNT
}

/// Request protocol per §4.D: modifications enter as typed requests on
/// a per-partition queue rather than through direct mutable access.
#[derive(Debug, Clone)]
pub enum TableRequest {
    AddChange { prefix: Prefix, path: Path },
    Delete { prefix: Prefix, source: PathSource },
}

#[derive(Clone, Copy, Default)]
pub struct ListenerCaps {
    pub on_entry_changed: bool,
    pub on_table_walk_done: bool,
}

#[derive(Debug, Clone)]
pub enum TableEvent {
    EntryChanged { partition: usize, prefix: Prefix },
    TableWalkDone,
}

pub type ListenerId = u64;

struct Listener {
    id: ListenerId,
    caps: ListenerCaps,
    tx: mpsc::UnboundedSender<TableEvent>,
}

/// One partition's state: a map of routes plus the listeners interested
/// in it. Shared behind a `Mutex` only so both the draining task and
/// (read-only) callers like the replicator can look at the same data;
/// the mutation path always goes through `apply`, invoked from the
/// single owning task.
pub struct Partition {
    pub routes: HashMap<Prefix, Route>,
    listeners: Vec<Listener>,
}

impl Partition {
    fn new() -> Self {
        Partition {
            routes: HashMap::new(),
            listeners: Vec::new(),
        }
    }

    /// Applies one request, returns the affected prefix if the best
    /// path changed (callers use this to decide whether to notify).
    fn apply(&mut self, req: TableRequest) -> Option<Prefix> {
        match req {
            TableRequest::AddChange { prefix, path } => {
                let route = self.routes.entry(prefix.clone()).or_insert_with(|| Route::new(prefix.clone()));
                if route.insert_path(path) { Some(prefix) } else { None }
            }
            TableRequest::Delete { prefix, source } => {
                let changed = match self.routes.get_mut(&prefix) {
                    Some(route) => route.delete_path(&source),
                    None => false,
                };
                if let Some(route) = self.routes.get(&prefix)
                    && route.is_reapable()
                {
                    self.routes.remove(&prefix);
                }
                if changed { Some(prefix) } else { None }
            }
        }
    }

    fn notify(&mut self, partition: usize, prefix: Prefix) {
        self.listeners.retain(|l| {
            if !l.caps.on_entry_changed {
                return true;
            }
            l.tx
                .send(TableEvent::EntryChanged {
                    partition,
                    prefix: prefix.clone(),
                })
                .is_ok()
        });
    }
}

/// One address-family table within a routing instance. Owns
/// `PARTITION_COUNT` partitions and a per-partition request channel;
/// when `spawn_partitions` has been called, a dedicated task drains
/// each channel. Tests that only need the mutation semantics can call
/// `Partition::apply` directly without spawning anything.
pub struct Table {
    pub instance: InstanceName,
    pub family: AfiSafi,
    partitions: Vec<Arc<Mutex<Partition>>>,
    senders: Vec<mpsc::UnboundedSender<TableRequest>>,
    tasks: Vec<Task<()>>,
    next_listener_id: ListenerId,
}

impl Table {
    pub fn new(instance: InstanceName, family: AfiSafi) -> Self {
        Table {
            instance,
            family,
            partitions: (0..PARTITION_COUNT).map(|_| Arc::new(Mutex::new(Partition::new()))).collect(),
            senders: Vec::new(),
            tasks: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Spawns the per-partition draining tasks. Call once; subsequent
    /// `enqueue` calls route requests to whichever partition owns the
    /// prefix, and only that partition's task ever mutates its map.
    pub fn spawn_partitions(&mut self) {
        if !self.senders.is_empty() {
            return;
        }
        for partition in &self.partitions {
            let (tx, mut rx) = mpsc::unbounded_channel::<TableRequest>();
            let partition = partition.clone();
            let idx = self.senders.len();
            let task = Task::spawn(async move {
                while let Some(req) = rx.recv().await {
                    let mut guard = partition.lock().unwrap();
                    if let Some(prefix) = guard.apply(req) {
                        guard.notify(idx, prefix);
                    }
                }
            });
            self.senders.push(tx);
            self.tasks.push(task);
        }
    }

    /// Enqueues a request on the partition that owns its prefix. Falls
    /// back to synchronous application when `spawn_partitions` hasn't
    /// been called (unit tests, or a table with no live subscribers).
    pub fn enqueue(&self, req: TableRequest) {
        let prefix = match &req {
            TableRequest::AddChange { prefix, .. } => prefix,
            TableRequest::Delete { prefix, .. } => prefix,
        };
        let idx = partition_of(prefix);
        if let Some(sender) = self.senders.get(idx) {
            let _ = sender.send(req);
        } else {
            let mut guard = self.partitions[idx].lock().unwrap();
            if let Some(prefix) = guard.apply(req) {
                guard.notify(idx, prefix);
            }
        }
    }

    pub fn register_listener(&mut self, caps: ListenerCaps) -> (ListenerId, mpsc::UnboundedReceiver<TableEvent>) {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        for partition in &self.partitions {
            partition.lock().unwrap().listeners.push(Listener { id, caps, tx: tx.clone() });
        }
        (id, rx)
    }

    pub fn partition(&self, idx: usize) -> Arc<Mutex<Partition>> {
        self.partitions[idx].clone()
    }

    /// Read-only access to a route without cloning the whole path list.
    pub fn with_route<R>(&self, prefix: &Prefix, f: impl FnOnce(Option<&Route>) -> R) -> R {
        let idx = partition_of(prefix);
        let guard = self.partitions[idx].lock().unwrap();
        f(guard.routes.get(prefix))
    }

    pub fn route_count(&self) -> usize {
        self.partitions.iter().map(|p| p.lock().unwrap().routes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr_db::{AttrDb, BgpAttrSpec};
    use std::net::{IpAddr, Ipv4Addr};
    use std::str::FromStr;

    fn prefix() -> Prefix {
        Prefix::Inet(bgp_packet::InetPrefix::from_str("10.0.0.0/24").unwrap())
    }

    fn peer_path(db: &AttrDb, peer: u8) -> Path {
        let attr = db.locate(BgpAttrSpec::default());
        Path::new(
            attr,
            None,
            PathSource::Peer {
                peer_addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, peer)),
                peer_as: 65000,
                router_id: Ipv4Addr::new(1, 1, 1, peer),
                ebgp: false,
                path_id: 0,
            },
        )
    }

    #[test]
    fn synchronous_apply_without_spawned_partitions() {
        let db = AttrDb::new();
        let table = Table::new(InstanceName::new("blue"), AfiSafi::new(bgp_packet::Afi::Ip, bgp_packet::Safi::Unicast));
        table.enqueue(TableRequest::AddChange { prefix: prefix(), path: peer_path(&db, 1) });
        assert_eq!(table.route_count(), 1);

        table.enqueue(TableRequest::Delete {
            prefix: prefix(),
            source: peer_path(&db, 1).source,
        });
        assert_eq!(table.route_count(), 0, "reapable route is removed");
    }

    #[tokio::test]
    async fn spawned_partitions_notify_listeners_on_best_path_change() {
        let db = AttrDb::new();
        let mut table = Table::new(InstanceName::new("blue"), AfiSafi::new(bgp_packet::Afi::Ip, bgp_packet::Safi::Unicast));
        table.spawn_partitions();
        let (_id, mut rx) = table.register_listener(ListenerCaps { on_entry_changed: true, ..Default::default() });

        table.enqueue(TableRequest::AddChange { prefix: prefix(), path: peer_path(&db, 1) });

        let event = rx.recv().await.expect("listener should see the change");
        match event {
            TableEvent::EntryChanged { prefix: p, .. } => assert_eq!(p, prefix()),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
