//! WebSocket connection management — lifecycle, pool, handles, heartbeat,
//! and the per-connection inbound/outbound loops.

pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod pool;
pub mod reader;
pub mod writer;

pub use handle::{Connection, ConnectionInfo};
pub use manager::{BroadcastOutcome, ConnectionManager};
