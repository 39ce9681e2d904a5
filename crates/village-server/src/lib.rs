//! Village Server - WebSocket server for lineage queries
//!
//! Serves the lineage graph of one loaded village over JSON-RPC 2.0, so a
//! browser canvas or any other client can lay out and explore a bloodline
//! without talking to the subgraph itself.
//!
//! The server supports:
//! - Multiple concurrent connections sharing one read-mostly graph
//! - Stateless `lineage.build` calls on caller-supplied characters
//! - Ancestor and descendant walks with an optional depth limit

use std::sync::Arc;
use tokio::sync::RwLock;
use village_graph::LineageGraph;

/// Shared graph state across connections.
pub type SharedGraph = Arc<RwLock<LineageGraph>>;

mod handlers;
mod protocol;
mod server;

pub use protocol::{Request, Response, RpcError};
pub use server::{ServerConfig, VillageServer};
