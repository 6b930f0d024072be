use crate::core::{NodeInstance, Result, ShardError, ShardId, ShardLayout};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Node/shard relation computed for one valid layout.
///
/// Both projections are stored sorted so lookups hand out slices without
/// allocating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardAssignment {
    layout: ShardLayout,
    // index = node instance - 1
    node_shards: Vec<Vec<ShardId>>,
    // index = shard id
    shard_nodes: Vec<Vec<NodeInstance>>,
}

impl ShardAssignment {
    /// Builds both projections from per-node shard lists (node index 0-based).
    ///
    /// Shard ids outside `[0, shard_count)` are rejected here; everything else
    /// is left to [`ShardAssignment::validate`].
    pub fn from_node_lists(layout: ShardLayout, node_lists: Vec<Vec<ShardId>>) -> Result<Self> {
        let shard_slots = usize::try_from(layout.shard_count).unwrap_or(0);
        let mut shard_nodes: Vec<Vec<NodeInstance>> = vec![Vec::new(); shard_slots];
        let mut node_shards = Vec::with_capacity(node_lists.len());

        for (index, mut shards) in node_lists.into_iter().enumerate() {
            let node = NodeInstance::try_from(index + 1).map_err(|_| {
                ShardError::InvariantViolation(format!(
                    "node index {} does not fit a node instance",
                    index
                ))
            })?;
            for &shard in &shards {
                if !layout.contains_shard(shard) {
                    return Err(ShardError::InvariantViolation(format!(
                        "Shard {} placed on node {} is out of range for shard_count {}",
                        shard, node, layout.shard_count
                    )));
                }
                shard_nodes[shard as usize].push(node);
            }
            shards.sort_unstable();
            node_shards.push(shards);
        }

        for nodes in &mut shard_nodes {
            nodes.sort_unstable();
        }

        Ok(Self {
            layout,
            node_shards,
            shard_nodes,
        })
    }

    /// Checks every placement invariant:
    /// - one entry per node,
    /// - each node holds exactly `S*R/N` distinct shards,
    /// - each shard lives on exactly `R` distinct nodes,
    /// - the relation holds `S*R` pairs in total.
    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        let per_node = layout
            .shards_per_node()
            .ok_or_else(|| match layout.check() {
                Err(err) => err,
                Ok(()) => ShardError::InvariantViolation(format!(
                    "{} is valid but its per-node share does not fit in memory",
                    layout
                )),
            })?;

        if self.node_shards.len() != layout.node_count as usize {
            return Err(ShardError::InvariantViolation(format!(
                "Placement produced {} node entries for node_count {}",
                self.node_shards.len(),
                layout.node_count
            )));
        }

        for (node, shards) in self.nodes() {
            if shards.len() != per_node {
                return Err(ShardError::InvariantViolation(format!(
                    "Node {} holds {} shards, expected {}",
                    node,
                    shards.len(),
                    per_node
                )));
            }
            if let Some(duplicate) = first_duplicate(shards) {
                return Err(ShardError::InvariantViolation(format!(
                    "Node {} holds shard {} more than once",
                    node, duplicate
                )));
            }
        }

        let replicas = layout.replication_factor as usize;
        for (shard, nodes) in self.shard_nodes.iter().enumerate() {
            if nodes.len() != replicas {
                return Err(ShardError::InvariantViolation(format!(
                    "Shard {} has {} replicas, expected {}",
                    shard,
                    nodes.len(),
                    replicas
                )));
            }
            if let Some(duplicate) = first_duplicate(nodes) {
                return Err(ShardError::InvariantViolation(format!(
                    "Shard {} is placed on node {} more than once",
                    shard, duplicate
                )));
            }
        }

        let total = self.len() as i64;
        if total != layout.total_replicas() {
            return Err(ShardError::InvariantViolation(format!(
                "Assignment holds {} replicas, expected {}",
                total,
                layout.total_replicas()
            )));
        }

        Ok(())
    }

    pub fn layout(&self) -> &ShardLayout {
        &self.layout
    }

    /// Shards hosted by `node_instance`, empty when out of range.
    pub fn shards_for_node(&self, node_instance: NodeInstance) -> &[ShardId] {
        if !self.layout.contains_node(node_instance) {
            return &[];
        }
        self.node_shards
            .get(node_instance as usize - 1)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Nodes hosting `shard_id`, empty when out of range.
    pub fn nodes_for_shard(&self, shard_id: ShardId) -> &[NodeInstance] {
        if !self.layout.contains_shard(shard_id) {
            return &[];
        }
        self.shard_nodes
            .get(shard_id as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterates `(node_instance, shards)` in node order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeInstance, &[ShardId])> + '_ {
        self.node_shards
            .iter()
            .enumerate()
            .map(|(index, shards)| (index as NodeInstance + 1, shards.as_slice()))
    }

    /// Iterates every `(node_instance, shard_id)` pair of the relation.
    pub fn pairs(&self) -> impl Iterator<Item = (NodeInstance, ShardId)> + '_ {
        self.nodes()
            .flat_map(|(node, shards)| shards.iter().map(move |shard| (node, *shard)))
    }

    /// Total number of placed replicas.
    pub fn len(&self) -> usize {
        self.node_shards.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn first_duplicate<T: Copy + Eq + std::hash::Hash>(items: &[T]) -> Option<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().copied().find(|item| !seen.insert(*item))
}

/// Serializable view of a policy, used by tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSnapshot {
    pub layout: ShardLayout,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    pub strategy: String,
    #[serde(default)]
    pub shards_per_node: Option<usize>,
    #[serde(default)]
    pub nodes: Vec<NodeShardsEntry>,
}

/// One node's row in an [`AssignmentSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeShardsEntry {
    pub node: NodeInstance,
    pub shards: Vec<ShardId>,
}
