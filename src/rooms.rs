// src/rooms.rs
use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::{debug, error};
use uuid::Uuid;

use crate::events::PollEvent;

const ROOM_CAPACITY: usize = 64;

/// Per-act broadcast rooms. Viewers subscribe on WebSocket upgrade and poll
/// state changes go to every current subscriber. Delivery is best-effort:
/// nothing is buffered for clients that are not connected, so a reconnecting
/// viewer resynchronizes through the read endpoints.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<Uuid, broadcast::Sender<String>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self, act_id: Uuid) -> broadcast::Receiver<String> {
        let mut rooms = self.rooms.write().unwrap();
        rooms
            .entry(act_id)
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Serialize the event once and push it to the act's room, if anyone is
    /// listening. A send failure means the last viewer left; the room is
    /// dropped so idle acts hold no channel.
    pub fn publish(&self, act_id: Uuid, event: &PollEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                error!("failed to serialize poll event: {e}");
                return;
            }
        };

        let mut rooms = self.rooms.write().unwrap();
        let abandoned = match rooms.get(&act_id) {
            Some(sender) => sender.send(payload).is_err(),
            None => false,
        };
        if abandoned {
            rooms.remove(&act_id);
            debug!("dropped empty room for act {act_id}");
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let rooms = RoomRegistry::new();
        let act_id = Uuid::new_v4();
        let mut rx = rooms.subscribe(act_id);

        rooms.publish(act_id, &PollEvent::Closed { poll_id: 3 });

        let payload = rx.recv().await.unwrap();
        assert!(payload.contains("poll:closed"));
    }

    #[test]
    fn publish_without_viewers_is_a_no_op() {
        let rooms = RoomRegistry::new();
        rooms.publish(Uuid::new_v4(), &PollEvent::Closed { poll_id: 3 });
    }

    #[tokio::test]
    async fn rooms_are_scoped_to_one_act() {
        let rooms = RoomRegistry::new();
        let act_a = Uuid::new_v4();
        let act_b = Uuid::new_v4();
        let mut rx_a = rooms.subscribe(act_a);
        let _rx_b = rooms.subscribe(act_b);

        rooms.publish(act_b, &PollEvent::Closed { poll_id: 9 });

        assert!(matches!(
            rx_a.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
