use crate::core::{ShardId, ShardLayout};
use serde::{Deserialize, Serialize};

/// Decides which shards each node hosts.
///
/// `place` is only called for valid layouts. It returns one entry per node,
/// indexed from zero, listing that node's shard ids. Implementations must be
/// deterministic; the policy verifies their output before accepting it.
pub trait PlacementStrategy {
    fn name(&self) -> &'static str;

    fn place(&self, layout: &ShardLayout) -> Vec<Vec<ShardId>>;
}

/// Cyclic sliding-window placement.
///
/// Node `i` (0-based) hosts the window of `S*R/N` consecutive shard ids that
/// starts at `floor(i*S/N)` and wraps around the shard ring. Window starts are
/// spaced exactly `S/N` apart, so every shard falls into the windows of exactly
/// `R` consecutive nodes. With one node per shard this is the classic window
/// `{i, i+1, .., i+R-1} mod S`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CyclicWindowPlacement;

impl PlacementStrategy for CyclicWindowPlacement {
    fn name(&self) -> &'static str {
        "cyclic-window"
    }

    fn place(&self, layout: &ShardLayout) -> Vec<Vec<ShardId>> {
        let Some(per_node) = layout.shards_per_node() else {
            return Vec::new();
        };
        let shards = i64::from(layout.shard_count);
        let nodes = i64::from(layout.node_count);

        (0..nodes)
            .map(|node| {
                let start = node * shards / nodes;
                (0..per_node as i64)
                    .map(|offset| ((start + offset) % shards) as ShardId)
                    .collect()
            })
            .collect()
    }
}

/// Replica-major striping.
///
/// Replica tokens are numbered `t = copy*S + shard` and dealt out in contiguous
/// runs of `S*R/N` tokens per node. A run is never longer than `S`, so no node
/// sees the same shard twice, and the copies of one shard sit `S` tokens apart,
/// so they always land on different nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripedPlacement;

impl PlacementStrategy for StripedPlacement {
    fn name(&self) -> &'static str {
        "striped"
    }

    fn place(&self, layout: &ShardLayout) -> Vec<Vec<ShardId>> {
        let Some(per_node) = layout.shards_per_node() else {
            return Vec::new();
        };
        let shards = i64::from(layout.shard_count);
        let run = per_node as i64;

        (0..i64::from(layout.node_count))
            .map(|node| {
                let first_token = node * run;
                (first_token..first_token + run)
                    .map(|token| (token % shards) as ShardId)
                    .collect()
            })
            .collect()
    }
}

/// Named placement choice used by configuration and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    #[default]
    CyclicWindow,
    Striped,
}

impl PlacementKind {
    pub fn strategy(&self) -> &'static dyn PlacementStrategy {
        match self {
            PlacementKind::CyclicWindow => &CyclicWindowPlacement,
            PlacementKind::Striped => &StripedPlacement,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.strategy().name()
    }

    /// Parses `cyclic-window` / `striped` (underscores accepted).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cyclic-window" | "cyclic" | "window" => Some(PlacementKind::CyclicWindow),
            "striped" | "stripe" => Some(PlacementKind::Striped),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_window_square_layout() {
        let placed = CyclicWindowPlacement.place(&ShardLayout::new(10, 2, 10));
        assert_eq!(placed.len(), 10);
        assert_eq!(placed[0], vec![0, 1]);
        assert_eq!(placed[9], vec![9, 0]);
    }

    #[test]
    fn test_cyclic_window_uneven_starts() {
        // starts at 0, 2, 5, 7 with windows of five
        let placed = CyclicWindowPlacement.place(&ShardLayout::new(10, 2, 4));
        assert_eq!(placed[0], vec![0, 1, 2, 3, 4]);
        assert_eq!(placed[1], vec![2, 3, 4, 5, 6]);
        assert_eq!(placed[2], vec![5, 6, 7, 8, 9]);
        assert_eq!(placed[3], vec![7, 8, 9, 0, 1]);
    }

    #[test]
    fn test_striped_runs() {
        let placed = StripedPlacement.place(&ShardLayout::new(10, 2, 4));
        assert_eq!(placed[0], vec![0, 1, 2, 3, 4]);
        assert_eq!(placed[1], vec![5, 6, 7, 8, 9]);
        assert_eq!(placed[2], vec![0, 1, 2, 3, 4]);
        assert_eq!(placed[3], vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_invalid_layout_places_nothing() {
        assert!(CyclicWindowPlacement.place(&ShardLayout::new(10, 2, 11)).is_empty());
        assert!(StripedPlacement.place(&ShardLayout::new(0, 2, 10)).is_empty());
    }

    #[test]
    fn test_placement_kind_parse() {
        assert_eq!(PlacementKind::parse("striped"), Some(PlacementKind::Striped));
        assert_eq!(
            PlacementKind::parse("Cyclic_Window"),
            Some(PlacementKind::CyclicWindow)
        );
        assert_eq!(PlacementKind::parse("random"), None);
        assert_eq!(PlacementKind::Striped.as_str(), "striped");
        assert_eq!(PlacementKind::default(), PlacementKind::CyclicWindow);
    }
}
