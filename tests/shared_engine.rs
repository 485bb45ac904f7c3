// ==============================================
// SHARED ENGINE LOCKING TESTS (integration)
// ==============================================

#![cfg(feature = "concurrency")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use evictkit::builder::{EngineBuilder, EngineConfig, EngineKind};
use evictkit::error::CacheError;
use evictkit::sync::SharedEngine;
use evictkit::traits::CacheEntry;

#[test]
fn concurrent_adds_of_one_key_admit_exactly_one() {
    const THREADS: usize = 8;
    for kind in [EngineKind::Lru, EngineKind::Lfu] {
        let engine: Arc<SharedEngine<String, String>> =
            Arc::new(SharedEngine::with_config(EngineConfig { capacity: 0, kind }));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let engine = Arc::clone(&engine);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    engine.add("contended".into(), format!("writer-{i}"))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let admitted = results.iter().filter(|r| r.is_ok()).count();
        let rejected = results
            .iter()
            .filter(|r| matches!(r, Err(CacheError::DuplicateKey { .. })))
            .count();
        assert_eq!(admitted, 1, "{kind}");
        assert_eq!(rejected, THREADS - 1, "{kind}");
        assert_eq!(engine.len(), 1, "{kind}");
    }
}

#[test]
fn lru_size_stays_bounded_under_parallel_writers() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 500;
    // Keys "t{t}-{i:04}" are 7 bytes and values 1 byte, so entries are 8 bytes.
    let capacity = 8 * 32;
    let engine: Arc<SharedEngine<String, String>> =
        Arc::new(SharedEngine::new(EngineBuilder::new(capacity).build()));
    let evictions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evictions);
    engine.on_evict(Box::new(move |_: CacheEntry<String, String>| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    engine.add(format!("t{t}-{i:04}"), "x".into()).unwrap();
                    assert!(engine.size() <= capacity);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.size(), capacity);
    assert_eq!(engine.len(), 32);
    assert_eq!(evictions.load(Ordering::SeqCst), THREADS * PER_THREAD - 32);
}

#[test]
fn readers_and_writers_interleave() {
    let engine: Arc<SharedEngine<u64, u64>> = Arc::new(SharedEngine::new(
        EngineBuilder::new(64).kind(EngineKind::Lfu).build(),
    ));
    for k in 0..64 {
        engine.add(k, k * 2).unwrap();
    }

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut hits = 0;
                for k in 0..64 {
                    if engine.get(&k) == Ok(k * 2) {
                        hits += 1;
                    }
                    let _ = engine.peek(&k);
                    let _ = engine.snapshot();
                }
                hits
            })
        })
        .collect();

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for k in 1000..1032 {
                engine.add(k, k).unwrap();
            }
        })
    };

    writer.join().unwrap();
    for reader in readers {
        let hits = reader.join().unwrap();
        assert!(hits <= 64);
    }
    assert_eq!(engine.len(), 64);
    assert_eq!(engine.snapshot().len(), 64);
}

#[test]
fn get_reports_not_found_with_key() {
    let engine: SharedEngine<String, String> = SharedEngine::default();
    let err = engine.get(&"ghost".to_string()).unwrap_err();
    assert_eq!(
        err,
        CacheError::NotFound {
            key: "\"ghost\"".to_string()
        }
    );
    assert_eq!(err.to_string(), "key \"ghost\" not found");
}
