use crate::core::ShardLayout;

/// Lists every placeable layout for `shard_count` shards at
/// `replication_factor`, trying node counts `1..=max_nodes` in ascending order.
///
/// Used when planning a topology change: each returned layout can be handed to
/// [`ShardDistributionPolicy::from_layout`](super::ShardDistributionPolicy::from_layout).
pub fn candidate_layouts(
    shard_count: i32,
    replication_factor: i32,
    max_nodes: i32,
) -> Vec<ShardLayout> {
    (1..=max_nodes.max(0))
        .map(|nodes| ShardLayout::new(shard_count, replication_factor, nodes))
        .filter(ShardLayout::is_valid)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_for_24_shards_3_replicas() {
        let nodes: Vec<i32> = candidate_layouts(24, 3, 100)
            .iter()
            .map(|layout| layout.node_count)
            .collect();
        assert_eq!(nodes, vec![3, 4, 6, 8, 9, 12, 18, 24, 36, 72]);
    }

    #[test]
    fn test_candidates_respect_max_nodes() {
        let layouts = candidate_layouts(10, 1, 5);
        let nodes: Vec<i32> = layouts.iter().map(|layout| layout.node_count).collect();
        assert_eq!(nodes, vec![1, 2, 5]);
    }

    #[test]
    fn test_degenerate_inputs_have_no_candidates() {
        assert!(candidate_layouts(0, 2, 10).is_empty());
        assert!(candidate_layouts(10, 0, 10).is_empty());
        assert!(candidate_layouts(10, 2, -1).is_empty());
    }
}
