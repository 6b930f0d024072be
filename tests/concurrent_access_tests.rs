//! Concurrent access tests
//!
//! A built policy is shared by reference between many readers.
//! Run with: cargo test --test concurrent_access_tests

use shardplan::{PlacementKind, PolicyCache, ShardDistributionPolicy, ShardLayout};
use std::sync::Arc;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_policy_is_send_and_sync() {
    assert_send_sync::<ShardDistributionPolicy>();
    assert_send_sync::<PolicyCache>();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reads() {
    let policy = Arc::new(ShardDistributionPolicy::new(24, 3, 8));
    let expected: Vec<Vec<i32>> = (1..=8)
        .map(|node| policy.shards_for_node(node).to_vec())
        .collect();
    let expected = Arc::new(expected);

    let mut handles = vec![];
    for task_id in 0..16 {
        let policy = Arc::clone(&policy);
        let expected = Arc::clone(&expected);

        handles.push(tokio::spawn(async move {
            for _ in 0..200 {
                for node in 1..=8 {
                    assert_eq!(
                        policy.shards_for_node(node),
                        expected[(node - 1) as usize].as_slice(),
                        "Task {} saw a different assignment",
                        task_id
                    );
                }
                for shard in 0..24 {
                    assert_eq!(policy.nodes_for_shard(shard).len(), 3);
                }
                assert!(policy.is_valid());
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cache_lookups_share_one_layout() {
    let cache = Arc::new(PolicyCache::new(8).unwrap());
    let layout = ShardLayout::new(36, 2, 12);

    let mut handles = vec![];
    for _ in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            let policy = cache
                .get_or_build_with(layout, PlacementKind::CyclicWindow)
                .unwrap();
            assert_eq!(policy.shards_per_node(), Some(6));
            policy.shards_for_node(1).to_vec()
        }));
    }

    let mut results = vec![];
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));

    let stats = cache.stats().unwrap();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits + stats.misses, 10);
}
