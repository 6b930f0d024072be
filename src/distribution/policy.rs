use super::assignment::{AssignmentSnapshot, NodeShardsEntry, ShardAssignment};
use super::strategy::{CyclicWindowPlacement, PlacementStrategy};
use crate::core::{LayoutIssue, NodeInstance, Result, ShardId, ShardLayout};
use log::warn;
use tracing::{Level, event, info_span};

/// Explicit shard distribution policy.
///
/// Holds a cluster shape and, when the shape is placeable, the node/shard
/// assignment computed for it at construction. The value never changes after
/// it is built; a new topology means a new policy.
///
/// Lookups never fail: an invalid layout or an out-of-range argument yields an
/// empty slice.
///
/// # Examples
///
/// ```
/// use shardplan::ShardDistributionPolicy;
///
/// let policy = ShardDistributionPolicy::new(10, 2, 10);
/// assert!(policy.is_valid());
/// assert_eq!(policy.shards_for_node(1), &[0, 1]);
/// assert_eq!(policy.nodes_for_shard(0), &[1, 10]);
/// assert!(policy.shards_for_node(11).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ShardDistributionPolicy {
    layout: ShardLayout,
    issue: Option<LayoutIssue>,
    strategy: &'static str,
    assignment: Option<ShardAssignment>,
}

impl ShardDistributionPolicy {
    /// Builds the policy using cyclic-window placement.
    ///
    /// Layouts holding more than
    /// [`MAX_PLACED_REPLICAS`](crate::core::MAX_PLACED_REPLICAS) replicas are
    /// reported invalid with [`LayoutIssue::ExceedsPlacementLimit`] instead of
    /// being placed.
    pub fn new(shard_count: i32, replication_factor: i32, node_count: i32) -> Self {
        Self::from_layout(ShardLayout::new(shard_count, replication_factor, node_count))
    }

    pub fn from_layout(layout: ShardLayout) -> Self {
        match Self::build(layout, &CyclicWindowPlacement) {
            Ok(policy) => policy,
            // cyclic-window output passes validation for every layout under the ceiling
            Err(err) => {
                warn!("Shard placement for {} rejected: {}", layout, err);
                Self {
                    layout,
                    issue: layout.placement_issue(),
                    strategy: CyclicWindowPlacement.name(),
                    assignment: None,
                }
            }
        }
    }

    /// Builds the policy with a caller-chosen placement strategy.
    ///
    /// An invalid layout still yields `Ok` (with no assignment). A strategy whose
    /// output breaks a placement invariant is rejected.
    pub fn with_strategy(layout: ShardLayout, strategy: &dyn PlacementStrategy) -> Result<Self> {
        Self::build(layout, strategy)
    }

    fn build(layout: ShardLayout, strategy: &dyn PlacementStrategy) -> Result<Self> {
        let span = info_span!(
            "shard_placement",
            shards = layout.shard_count,
            replicas = layout.replication_factor,
            nodes = layout.node_count,
            strategy = strategy.name()
        );
        let _guard = span.enter();

        if let Some(found) = layout.placement_issue() {
            warn!("Shard layout {} is not placeable: {}", layout, found);
            return Ok(Self {
                layout,
                issue: Some(found),
                strategy: strategy.name(),
                assignment: None,
            });
        }

        let assignment = ShardAssignment::from_node_lists(layout, strategy.place(&layout))?;
        assignment.validate()?;
        event!(
            Level::DEBUG,
            replicas = assignment.len(),
            "shard assignment computed"
        );

        Ok(Self {
            layout,
            issue: None,
            strategy: strategy.name(),
            assignment: Some(assignment),
        })
    }

    /// True when every shard can be given `replication_factor` distinct nodes
    /// with an equal share per node.
    pub fn is_valid(&self) -> bool {
        self.assignment.is_some()
    }

    /// Why the layout is not placeable, if it is not.
    pub fn issue(&self) -> Option<LayoutIssue> {
        self.issue
    }

    pub fn layout(&self) -> &ShardLayout {
        &self.layout
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy
    }

    pub fn assignment(&self) -> Option<&ShardAssignment> {
        self.assignment.as_ref()
    }

    /// Shard ids (0-based, ascending) hosted by the 1-based `node_instance`.
    pub fn shards_for_node(&self, node_instance: NodeInstance) -> &[ShardId] {
        self.assignment
            .as_ref()
            .map(|assignment| assignment.shards_for_node(node_instance))
            .unwrap_or(&[])
    }

    /// Node instances (1-based, ascending) hosting `shard_id`.
    pub fn nodes_for_shard(&self, shard_id: ShardId) -> &[NodeInstance] {
        self.assignment
            .as_ref()
            .map(|assignment| assignment.nodes_for_shard(shard_id))
            .unwrap_or(&[])
    }

    pub fn shards_per_node(&self) -> Option<usize> {
        self.assignment.as_ref().and(self.layout.shards_per_node())
    }

    /// Number of placed replicas; zero for an invalid layout.
    pub fn replica_count(&self) -> usize {
        self.assignment.as_ref().map_or(0, ShardAssignment::len)
    }

    pub fn snapshot(&self) -> AssignmentSnapshot {
        AssignmentSnapshot {
            layout: self.layout,
            valid: self.is_valid(),
            issue: self.issue.map(|issue| issue.to_string()),
            strategy: self.strategy.to_string(),
            shards_per_node: self.shards_per_node(),
            nodes: self
                .assignment
                .iter()
                .flat_map(|assignment| assignment.nodes())
                .map(|(node, shards)| NodeShardsEntry {
                    node,
                    shards: shards.to_vec(),
                })
                .collect(),
        }
    }
}
