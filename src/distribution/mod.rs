//! Explicit shard distribution: which node instances host which shard replicas.

pub mod assignment;
pub mod planning;
pub mod policy;
pub mod strategy;

pub use assignment::{AssignmentSnapshot, NodeShardsEntry, ShardAssignment};
pub use planning::candidate_layouts;
pub use policy::ShardDistributionPolicy;
pub use strategy::{CyclicWindowPlacement, PlacementKind, PlacementStrategy, StripedPlacement};
