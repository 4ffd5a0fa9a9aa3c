#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use lumen_core::Registry;

const THREADS: usize = 8;
const PER_THREAD: usize = 5_000;

#[test]
fn concurrent_increments_lose_nothing() {
    let reg = Arc::new(Registry::default());
    thread::scope(|s| {
        for t in 0..THREADS {
            let reg = Arc::clone(&reg);
            s.spawn(move || {
                // Every thread registers independently; all must share one family.
                let c = reg.counter("hits_total", "Hits.", &["route"]).unwrap();
                let own = format!("/t{t}");
                for _ in 0..PER_THREAD {
                    c.inc(&["/shared"]).unwrap();
                    c.inc(&[own.as_str()]).unwrap();
                }
            });
        }
    });

    let c = reg.counter("hits_total", "Hits.", &["route"]).unwrap();
    assert_eq!(c.get(&["/shared"]).unwrap(), (THREADS * PER_THREAD) as u64);
    for t in 0..THREADS {
        assert_eq!(c.get(&[format!("/t{t}").as_str()]).unwrap(), PER_THREAD as u64);
    }
}

#[test]
fn concurrent_observations_keep_sum_and_count() {
    let reg = Registry::default();
    let h = reg
        .histogram_with_buckets("work_seconds", "Work.", &[], &[0.5, 1.5])
        .unwrap();
    thread::scope(|s| {
        for _ in 0..THREADS {
            let h = h.clone();
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    h.observe(&[], (i % 3) as f64).unwrap();
                }
            });
        }
    });

    let snap = h.snapshot(&[]).unwrap().unwrap();
    let total = (THREADS * PER_THREAD) as u64;
    assert_eq!(snap.count, total);
    let placed: u64 = snap.buckets.iter().map(|(_, c)| c).sum::<u64>() + snap.overflow;
    assert_eq!(placed, total);

    let per_thread_sum: f64 = (0..PER_THREAD).map(|i| (i % 3) as f64).sum();
    assert!((snap.sum - per_thread_sum * THREADS as f64).abs() < 1e-6);
}

#[test]
fn snapshot_runs_alongside_writers() {
    let reg = Registry::default();
    let c = reg.counter("bg_total", "Background.", &["k"]).unwrap();
    thread::scope(|s| {
        let writer = c.clone();
        s.spawn(move || {
            for i in 0..PER_THREAD {
                writer.inc(&[(i % 50).to_string().as_str()]).unwrap();
            }
        });
        for _ in 0..50 {
            let text = reg.snapshot();
            assert!(lumen_core::exposition::parse(&text).is_ok());
        }
    });
    assert_eq!(lumen_core::exposition::parse(&reg.snapshot()).unwrap().len(), 50);
}
