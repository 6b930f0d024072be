use crate::core::{Result, ShardError, ShardLayout};
use crate::distribution::{PlacementKind, ShardDistributionPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const URL_SCHEME: &str = "shardplan://";

/// Cluster shape configuration
///
/// The coordinator reads this from wherever it keeps cluster settings and
/// builds one policy per topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardLayoutConfig {
    /// Number of logical shards
    pub shard_count: i32,

    /// Copies kept of each shard
    pub replication_factor: i32,

    /// Node instances in the cluster
    pub node_count: i32,

    /// Placement construction
    #[serde(default)]
    pub placement: PlacementKind,
}

impl ShardLayoutConfig {
    /// Create a new layout configuration
    pub fn new(shard_count: i32, replication_factor: i32, node_count: i32) -> Self {
        Self {
            shard_count,
            replication_factor,
            node_count,
            placement: PlacementKind::default(),
        }
    }

    /// Set the shard count
    pub fn shard_count(mut self, shard_count: i32) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Set the replication factor
    pub fn replication_factor(mut self, replication_factor: i32) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    /// Set the node count
    pub fn node_count(mut self, node_count: i32) -> Self {
        self.node_count = node_count;
        self
    }

    /// Set the placement construction
    pub fn placement(mut self, placement: PlacementKind) -> Self {
        self.placement = placement;
        self
    }

    /// Parse from a layout URL
    ///
    /// Format: "shardplan://<shards>x<replicas>@<nodes>[/<placement>]"
    ///
    /// # Examples
    ///
    /// ```
    /// use shardplan::{PlacementKind, ShardLayoutConfig};
    ///
    /// let config = ShardLayoutConfig::from_url("shardplan://24x3@8/striped").unwrap();
    /// assert_eq!(config.node_count, 8);
    /// assert_eq!(config.placement, PlacementKind::Striped);
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        let rest = url.trim().strip_prefix(URL_SCHEME).ok_or_else(|| {
            ShardError::ParseError(format!("URL must start with '{}'", URL_SCHEME))
        })?;

        let (shape, placement) = match rest.split_once('/') {
            Some((shape, placement)) => {
                let kind = PlacementKind::parse(placement).ok_or_else(|| {
                    ShardError::ParseError(format!("Unknown placement '{}'", placement))
                })?;
                (shape, kind)
            }
            None => (rest, PlacementKind::default()),
        };

        let (counts, nodes) = shape
            .split_once('@')
            .ok_or_else(|| ShardError::ParseError("Invalid layout format".to_string()))?;
        let (shards, replicas) = counts
            .split_once('x')
            .ok_or_else(|| ShardError::ParseError("Invalid shard/replica format".to_string()))?;

        Ok(Self::new(
            parse_count("shard count", shards)?,
            parse_count("replication factor", replicas)?,
            parse_count("node count", nodes)?,
        )
        .placement(placement))
    }

    /// Convert to layout URL
    pub fn to_url(&self) -> String {
        let mut url = format!(
            "{}{}x{}@{}",
            URL_SCHEME, self.shard_count, self.replication_factor, self.node_count
        );
        if self.placement != PlacementKind::default() {
            url.push('/');
            url.push_str(self.placement.as_str());
        }
        url
    }

    /// Parse from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            ShardError::IoError(format!("Failed to read '{}': {}", path.display(), err))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn layout(&self) -> ShardLayout {
        ShardLayout::new(self.shard_count, self.replication_factor, self.node_count)
    }

    /// Validate configuration
    ///
    /// Also refuses layouts above [`MAX_PLACED_REPLICAS`](crate::core::MAX_PLACED_REPLICAS).
    pub fn validate(&self) -> Result<()> {
        match self.layout().placement_issue() {
            Some(issue) => Err(ShardError::InvalidLayout(issue)),
            None => Ok(()),
        }
    }

    /// Validate and build the distribution policy
    pub fn build_policy(&self) -> Result<ShardDistributionPolicy> {
        self.validate()?;
        ShardDistributionPolicy::with_strategy(self.layout(), self.placement.strategy())
    }
}

impl Default for ShardLayoutConfig {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

fn parse_count(what: &str, raw: &str) -> Result<i32> {
    raw.trim()
        .parse()
        .map_err(|_| ShardError::ParseError(format!("Invalid {} '{}'", what, raw)))
}
