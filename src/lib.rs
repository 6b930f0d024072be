// ============================================================================
// shardplan Library
// ============================================================================

pub mod cache;
pub mod config;
pub mod core;
pub mod distribution;

// Re-export main types for convenience
pub use cache::{PolicyCache, PolicyCacheStats};
pub use config::ShardLayoutConfig;
pub use crate::core::{
    LayoutIssue, MAX_PLACED_REPLICAS, NodeInstance, Result, ShardError, ShardId, ShardLayout,
};
pub use distribution::{
    AssignmentSnapshot, CyclicWindowPlacement, NodeShardsEntry, PlacementKind, PlacementStrategy,
    ShardAssignment, ShardDistributionPolicy, StripedPlacement, candidate_layouts,
};
