use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{Result, ShardError};

/// 0-based shard identifier.
pub type ShardId = i32;

/// 1-based node instance number.
pub type NodeInstance = i32;

/// Largest number of replicas a policy will place.
///
/// Shapes above this are well past realistic cluster sizes; they are refused
/// before anything is allocated.
pub const MAX_PLACED_REPLICAS: i64 = 1 << 24;

/// Reason a shard layout cannot be placed.
///
/// The first three variants describe degenerate parameters, the next two
/// describe shapes whose replicas cannot be spread evenly. The last one is a
/// placeable shape too large to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutIssue {
    NonPositiveShardCount { shard_count: i32 },
    NonPositiveReplicationFactor { replication_factor: i32 },
    NonPositiveNodeCount { node_count: i32 },
    ReplicationExceedsNodes { replication_factor: i32, node_count: i32 },
    UnevenReplicaLoad { total_replicas: i64, node_count: i32 },
    ExceedsPlacementLimit { total_replicas: i64, limit: i64 },
}

impl LayoutIssue {
    /// Returns true when one of the three parameters is zero or negative.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            LayoutIssue::NonPositiveShardCount { .. }
                | LayoutIssue::NonPositiveReplicationFactor { .. }
                | LayoutIssue::NonPositiveNodeCount { .. }
        )
    }
}

impl fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutIssue::NonPositiveShardCount { shard_count } => {
                write!(f, "shard_count must be >= 1 (got {})", shard_count)
            }
            LayoutIssue::NonPositiveReplicationFactor { replication_factor } => {
                write!(f, "replication_factor must be >= 1 (got {})", replication_factor)
            }
            LayoutIssue::NonPositiveNodeCount { node_count } => {
                write!(f, "node_count must be >= 1 (got {})", node_count)
            }
            LayoutIssue::ReplicationExceedsNodes {
                replication_factor,
                node_count,
            } => write!(
                f,
                "replication_factor {} exceeds node_count {}",
                replication_factor, node_count
            ),
            LayoutIssue::UnevenReplicaLoad {
                total_replicas,
                node_count,
            } => write!(
                f,
                "{} shard replicas cannot be spread evenly over {} nodes",
                total_replicas, node_count
            ),
            LayoutIssue::ExceedsPlacementLimit {
                total_replicas,
                limit,
            } => write!(
                f,
                "{} shard replicas exceed the placement limit of {}",
                total_replicas, limit
            ),
        }
    }
}

/// Cluster shape: how many shards, how many copies of each, how many nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardLayout {
    pub shard_count: i32,
    pub replication_factor: i32,
    pub node_count: i32,
}

impl ShardLayout {
    pub fn new(shard_count: i32, replication_factor: i32, node_count: i32) -> Self {
        Self {
            shard_count,
            replication_factor,
            node_count,
        }
    }

    /// Returns the first placement rule this layout breaks.
    ///
    /// Rules are checked in order:
    /// - every count is >= 1,
    /// - replication_factor <= node_count,
    /// - shard_count * replication_factor is divisible by node_count.
    pub fn issue(&self) -> Option<LayoutIssue> {
        if self.shard_count < 1 {
            return Some(LayoutIssue::NonPositiveShardCount {
                shard_count: self.shard_count,
            });
        }
        if self.replication_factor < 1 {
            return Some(LayoutIssue::NonPositiveReplicationFactor {
                replication_factor: self.replication_factor,
            });
        }
        if self.node_count < 1 {
            return Some(LayoutIssue::NonPositiveNodeCount {
                node_count: self.node_count,
            });
        }
        if self.replication_factor > self.node_count {
            return Some(LayoutIssue::ReplicationExceedsNodes {
                replication_factor: self.replication_factor,
                node_count: self.node_count,
            });
        }
        let total_replicas = self.total_replicas();
        if total_replicas % i64::from(self.node_count) != 0 {
            return Some(LayoutIssue::UnevenReplicaLoad {
                total_replicas,
                node_count: self.node_count,
            });
        }
        None
    }

    pub fn is_valid(&self) -> bool {
        self.issue().is_none()
    }

    /// Like [`ShardLayout::issue`], but also refuses shapes holding more than
    /// [`MAX_PLACED_REPLICAS`] replicas.
    pub fn placement_issue(&self) -> Option<LayoutIssue> {
        self.issue().or_else(|| {
            let total_replicas = self.total_replicas();
            (total_replicas > MAX_PLACED_REPLICAS).then_some(
                LayoutIssue::ExceedsPlacementLimit {
                    total_replicas,
                    limit: MAX_PLACED_REPLICAS,
                },
            )
        })
    }

    /// Strict form of [`ShardLayout::is_valid`].
    pub fn check(&self) -> Result<()> {
        match self.issue() {
            Some(issue) => Err(ShardError::InvalidLayout(issue)),
            None => Ok(()),
        }
    }

    /// Total number of shard replicas, `shard_count * replication_factor`.
    pub fn total_replicas(&self) -> i64 {
        i64::from(self.shard_count) * i64::from(self.replication_factor)
    }

    /// Number of shards each node hosts, or `None` for an invalid layout.
    pub fn shards_per_node(&self) -> Option<usize> {
        if !self.is_valid() {
            return None;
        }
        usize::try_from(self.total_replicas() / i64::from(self.node_count)).ok()
    }

    /// True when there is exactly one node per shard.
    pub fn is_square(&self) -> bool {
        self.shard_count == self.node_count
    }

    pub fn contains_node(&self, node_instance: NodeInstance) -> bool {
        node_instance >= 1 && node_instance <= self.node_count
    }

    pub fn contains_shard(&self, shard_id: ShardId) -> bool {
        shard_id >= 0 && shard_id < self.shard_count
    }
}

impl fmt::Display for ShardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} shards x {} replicas over {} nodes",
            self.shard_count, self.replication_factor, self.node_count
        )
    }
}
