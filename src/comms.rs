//! Inter-chunk transport abstraction.
//!
//! The halo-exchange driver only needs blocking point-to-point send/recv
//! with FIFO ordering per directed chunk pair, plus a scalar all-reduce
//! for the convergence metrics. Which transport backs that is opaque to
//! the solver core; [`MemoryComm`] is the in-process implementation.

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use crate::chunk::ChunkId;
use crate::decomposition::Decomposition;
use crate::error::{HearthError, HearthResult};

pub trait Communicator: Send + Sync {
    /// Sends a packed boundary buffer from `from`'s owner to `to`'s owner.
    fn send(&self, from: ChunkId, to: ChunkId, buffer: &[f64]) -> HearthResult<()>;

    /// Receives the packed buffer sent from `from` to `to`, blocking until
    /// it is available. `buffer` must be exactly the sent length.
    fn recv(&self, from: ChunkId, to: ChunkId, buffer: &mut [f64]) -> HearthResult<()>;

    /// Sums a per-process scalar across all cooperating processes.
    fn reduce_sum(&self, local: f64) -> f64;
}

struct Route {
    tx: Sender<Vec<f64>>,
    rx: Mutex<Receiver<Vec<f64>>>,
}

/// Channel-backed transport for chunks that share a process. Messages are
/// moved, not shared: the sender copies the packed strip out of its comm
/// buffer and ownership transfers through the channel, so neither side can
/// observe a half-written buffer.
pub struct MemoryComm {
    routes: HashMap<(ChunkId, ChunkId), Route>,
}

impl MemoryComm {
    /// Builds one FIFO route per directed neighbour pair of the
    /// decomposition.
    pub fn new(decomposition: &Decomposition) -> Self {
        let mut routes = HashMap::new();
        for chunk in &decomposition.chunks {
            for neighbour in chunk.neighbours.iter().flatten() {
                let (tx, rx) = channel();
                routes.insert(
                    (chunk.id, *neighbour),
                    Route {
                        tx,
                        rx: Mutex::new(rx),
                    },
                );
            }
        }
        MemoryComm { routes }
    }

    fn route(&self, from: ChunkId, to: ChunkId) -> HearthResult<&Route> {
        self.routes
            .get(&(from, to))
            .ok_or(HearthError::Topology { from, to })
    }
}

impl Communicator for MemoryComm {
    fn send(&self, from: ChunkId, to: ChunkId, buffer: &[f64]) -> HearthResult<()> {
        let route = self.route(from, to)?;
        route
            .tx
            .send(buffer.to_vec())
            .map_err(|_| HearthError::Comms {
                from,
                to,
                reason: "receiver disconnected".into(),
            })
    }

    fn recv(&self, from: ChunkId, to: ChunkId, buffer: &mut [f64]) -> HearthResult<()> {
        let route = self.route(from, to)?;
        let message = {
            let rx = route.rx.lock().expect("route receiver poisoned");
            rx.recv().map_err(|_| HearthError::Comms {
                from,
                to,
                reason: "sender disconnected".into(),
            })?
        };
        if message.len() != buffer.len() {
            return Err(HearthError::Comms {
                from,
                to,
                reason: format!(
                    "message length {} does not match buffer length {}",
                    message.len(),
                    buffer.len()
                ),
            });
        }
        buffer.copy_from_slice(&message);
        Ok(())
    }

    fn reduce_sum(&self, local: f64) -> f64 {
        // All chunks of this decomposition share the process.
        local
    }
}
