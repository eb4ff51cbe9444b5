use leadpilot_query::{listener, CacheEntry, QueryCache, QueryStatus};
use leadpilot_test_utils::generators::arb_cache_key;
use leadpilot_test_utils::{CountingLoader, GatedLoader};
use proptest::prelude::*;
use tokio::sync::oneshot;

type Cache = QueryCache<String, String>;

#[derive(Debug, Clone)]
enum Op {
    Fetch,
    Resolve(usize),
    Invalidate,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Fetch),
        3 => any::<usize>().prop_map(Op::Resolve),
        1 => Just(Op::Invalidate),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// However loads interleave and resolve, the cached value ends up being
    /// the result of the load that started last.
    #[test]
    fn newest_load_decides_the_cached_value(
        key in arb_cache_key(),
        subscribed in any::<bool>(),
        ops in prop::collection::vec(arb_op(), 1..24),
    ) {
        runtime().block_on(async {
            let cache = Cache::default();
            let counting = CountingLoader::new("sub".to_string());
            let _sub = subscribed.then(|| {
                cache.subscribe(
                    key.clone(),
                    counting.loader(),
                    listener(|_: CacheEntry<String, String>| {}),
                )
            });
            settle().await;

            let mut expected = subscribed.then(|| "sub".to_string());
            let mut invalidations = 0;
            let mut pending: Vec<(oneshot::Sender<Result<String, String>>, String)> = Vec::new();

            for (i, op) in ops.iter().enumerate() {
                match op {
                    Op::Fetch => {
                        let value = format!("fetch-{i}");
                        let (tx, gated) = GatedLoader::loader("gate reused".to_string());
                        tokio::spawn({
                            let cache = cache.clone();
                            let key = key.clone();
                            async move {
                                let _ = cache.fetch(key, gated).await;
                            }
                        });
                        pending.push((tx, value.clone()));
                        expected = Some(value);
                    }
                    Op::Resolve(idx) => {
                        if !pending.is_empty() {
                            let (tx, value) = pending.remove(idx % pending.len());
                            let _ = tx.send(Ok(value));
                        }
                    }
                    Op::Invalidate => {
                        cache.invalidate(&[key.clone()]);
                        invalidations += 1;
                        expected = subscribed.then(|| "sub".to_string());
                    }
                }
                settle().await;
            }

            for (tx, value) in pending.drain(..) {
                let _ = tx.send(Ok(value));
            }
            settle().await;

            prop_assert_eq!(cache.data(&key), expected);
            if subscribed {
                prop_assert_eq!(cache.get(&key).status, QueryStatus::Success);
                prop_assert_eq!(counting.calls(), 1 + invalidations);
            }
            Ok(())
        })?;
    }
}
