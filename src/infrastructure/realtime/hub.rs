use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use crate::application::ports::realtime_port::{RealtimePort, SocketEvent};

const ROOM_CAPACITY: usize = 64;

/// Book-keyed rooms. Each room is a broadcast channel; connections hold
/// receivers and the hub keeps only the sender.
#[derive(Clone, Default)]
pub struct SocketHub {
    rooms: Arc<RwLock<HashMap<Uuid, broadcast::Sender<SocketEvent>>>>,
}

impl SocketHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, book_id: Uuid) -> broadcast::Receiver<SocketEvent> {
        if let Some(tx) = self.rooms.read().await.get(&book_id) {
            return tx.subscribe();
        }
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(book_id)
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Drops the room once nobody holds a receiver for it. Callers release
    /// after dropping their own receiver.
    pub async fn release(&self, book_id: Uuid) -> bool {
        let mut rooms = self.rooms.write().await;
        let idle = rooms
            .get(&book_id)
            .map(|tx| tx.receiver_count() == 0)
            .unwrap_or(false);
        if idle {
            rooms.remove(&book_id);
            tracing::debug!(%book_id, "socket_room_released");
        }
        idle
    }

    /// Returns how many receivers got the event.
    pub async fn broadcast(&self, book_id: Uuid, event: SocketEvent) -> usize {
        let delivered = {
            let rooms = self.rooms.read().await;
            match rooms.get(&book_id) {
                Some(tx) => tx.send(event).ok(),
                None => return 0,
            }
        };
        match delivered {
            Some(n) => n,
            None => {
                // All receivers dropped since the room was created.
                let mut rooms = self.rooms.write().await;
                if rooms
                    .get(&book_id)
                    .map(|tx| tx.receiver_count() == 0)
                    .unwrap_or(false)
                {
                    rooms.remove(&book_id);
                    tracing::debug!(%book_id, "socket_room_pruned");
                }
                0
            }
        }
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[async_trait]
impl RealtimePort for SocketHub {
    async fn publish(&self, book_id: Uuid, event: SocketEvent) -> anyhow::Result<()> {
        let n = self.broadcast(book_id, event).await;
        tracing::trace!(%book_id, receivers = n, "socket_event_published");
        Ok(())
    }
}
