//! Room admission decided outside the realtime core.

use async_trait::async_trait;

use crate::result::AppResult;

/// Decides whether an upgrade request may join a room.
///
/// Consulted once per `GET /ws/{room_code}` before the connection is
/// created. `Ok(false)` and `Err(_)` both refuse the upgrade.
#[async_trait]
pub trait RoomGate: Send + Sync + std::fmt::Debug + 'static {
    /// Whether a new connection may start in `room_code`.
    async fn admit(&self, room_code: &str) -> AppResult<bool>;
}

/// Admits every room. Used when no membership service is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenRoomGate;

#[async_trait]
impl RoomGate for OpenRoomGate {
    async fn admit(&self, _room_code: &str) -> AppResult<bool> {
        Ok(true)
    }
}
