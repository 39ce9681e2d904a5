//! Village Graph - Bloodline construction and layout
//!
//! This crate turns a flat list of characters into a layered, positioned
//! parent → child graph for the bloodline view. Input order is free:
//! parents may appear after their children, references may dangle, and
//! lineages may loop. None of that is an error.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Id-based lookups
//! - Generation-based grouping (for layout and root queries)
//!
//! # Example
//!
//! ```
//! use village_core::{Character, ZERO_ADDRESS};
//! use village_graph::LineageBuilder;
//!
//! let characters = vec![
//!     Character::new("A", "Ada").with_parents([ZERO_ADDRESS, ZERO_ADDRESS]),
//!     Character::new("B", "Bram").with_parents([ZERO_ADDRESS, ZERO_ADDRESS]),
//!     Character::new("C", "Cora").with_parents(["A", "B"]),
//! ];
//!
//! let graph = LineageBuilder::new().build(&characters);
//! assert_eq!(graph.generation_of("C"), Some(1));
//! assert_eq!(graph.edge_count(), 2);
//! ```

mod builder;
mod edge;
mod graph;
mod layout;
mod lineage;
mod node;
mod render;
mod store;

pub use builder::{assign_generations, build_lineage, LineageBuilder};
pub use edge::{Edge, EdgeKind, GraphEdge};
pub use graph::{GraphStats, LineageGraph, NodeId};
pub use layout::{layout_levels, position_for, Position};
pub use lineage::{LineageDirection, LineageReport, Relative};
pub use node::{GraphNode, NodeInfo};
pub use render::{RenderGraph, RenderLink, RenderNode};
pub use store::{SnapshotStore, StoreError};
