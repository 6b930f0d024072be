pub mod error;
pub mod types;

pub use error::{Result, ShardError};
pub use types::{LayoutIssue, MAX_PLACED_REPLICAS, NodeInstance, ShardId, ShardLayout};
