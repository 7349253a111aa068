//! Concurrency tests for the single-flight raster cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use overlay_common::{OverlayError, Raster, RasterKey};
use storage::{EntryState, RasterCache};
use test_utils::{berlin_3x3, create_constant_raster, grid};
use tokio::sync::oneshot;

fn key(year: i32, month: u32) -> RasterKey {
    RasterKey::new(year, month).unwrap()
}

/// A loader that counts invocations and takes a little while to finish.
fn slow_loader(
    loads: Arc<AtomicUsize>,
    raster: Raster,
) -> impl FnOnce() -> futures::future::BoxFuture<'static, Result<Raster, OverlayError>> {
    use futures::FutureExt;
    move || {
        async move {
            loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(raster)
        }
        .boxed()
    }
}

// ============================================================================
// Single-flight
// ============================================================================

#[tokio::test]
async fn test_concurrent_gets_share_one_decode() {
    let cache = RasterCache::new();
    let loads = Arc::new(AtomicUsize::new(0));

    let requests = (0..16).map(|_| cache.get(key(2020, 4), slow_loader(loads.clone(), berlin_3x3())));
    let results = join_all(requests).await;

    assert_eq!(loads.load(Ordering::SeqCst), 1, "loader must run exactly once");
    assert_eq!(results.len(), 16);

    let first = results[0].as_ref().unwrap();
    for result in &results {
        let raster = result.as_ref().unwrap();
        assert!(Arc::ptr_eq(first, raster), "every caller gets the same raster");
    }

    let stats = cache.stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.coalesced, 15);
    assert_eq!(cache.state(&key(2020, 4)).await, Some(EntryState::Ready));
}

#[tokio::test]
async fn test_different_keys_decode_independently() {
    let cache = RasterCache::new();
    let loads = Arc::new(AtomicUsize::new(0));
    let gt = grid::SIMPLE_10X10.geotransform();

    let requests = (1..=6).map(|month| {
        cache.get(
            key(2020, month),
            slow_loader(loads.clone(), create_constant_raster(10, 10, gt, month as f32)),
        )
    });
    let results = join_all(requests).await;

    assert_eq!(loads.load(Ordering::SeqCst), 6);
    for (month, result) in (1..=6).zip(results) {
        let raster = result.unwrap();
        assert_eq!(raster.value(0, 0), Some(month as f64));
    }
    assert_eq!(cache.len().await, 6);
}

#[tokio::test]
async fn test_pending_state_visible_while_decoding() {
    let cache = RasterCache::new();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (started_tx, started_rx) = oneshot::channel::<()>();

    let get = cache.get(key(2020, 5), move || async move {
        let _ = started_tx.send(());
        let _ = release_rx.await;
        Ok(berlin_3x3())
    });

    let observe = async {
        started_rx.await.unwrap();
        let state = cache.state(&key(2020, 5)).await;
        let peeked = cache.peek(&key(2020, 5)).await;
        release_tx.send(()).unwrap();
        (state, peeked)
    };

    let (result, (state, peeked)) = tokio::join!(get, observe);
    assert!(result.is_ok());
    assert_eq!(state, Some(EntryState::Pending));
    assert!(peeked.is_none(), "pending entries are not readable");
    assert_eq!(cache.state(&key(2020, 5)).await, Some(EntryState::Ready));
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_failure_delivered_to_all_waiters_then_retried() {
    let cache = RasterCache::new();
    let loads = Arc::new(AtomicUsize::new(0));

    let requests = (0..5).map(|_| {
        let loads = loads.clone();
        cache.get(key(2020, 6), move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(OverlayError::decode_failure(key(2020, 6), "HTTP 503"))
        })
    });
    let results = join_all(requests).await;

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    for result in &results {
        assert_eq!(
            result.as_ref().unwrap_err(),
            &OverlayError::decode_failure(key(2020, 6), "HTTP 503")
        );
    }
    assert_eq!(cache.state(&key(2020, 6)).await, None);

    // The next request runs the loader again
    let retried = cache
        .get(key(2020, 6), slow_loader(loads.clone(), berlin_3x3()))
        .await;
    assert!(retried.is_ok());
    assert_eq!(loads.load(Ordering::SeqCst), 2);
    assert_eq!(cache.stats().await.failures, 1);
}

#[tokio::test]
async fn test_failure_does_not_touch_other_keys() {
    let cache = RasterCache::new();
    cache.get(key(2019, 6), || async { Ok(berlin_3x3()) }).await.unwrap();

    let _ = cache
        .get(key(2020, 6), || async {
            Err(OverlayError::Decode("bad magic bytes".into()))
        })
        .await;

    assert_eq!(cache.state(&key(2019, 6)).await, Some(EntryState::Ready));
    assert_eq!(cache.len().await, 1);
}

// ============================================================================
// Generations
// ============================================================================

#[tokio::test]
async fn test_clear_during_decode_discards_result() {
    let cache = RasterCache::new();
    let loads = Arc::new(AtomicUsize::new(0));
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (started_tx, started_rx) = oneshot::channel::<()>();

    let get = {
        let loads = loads.clone();
        cache.get(key(2020, 3), move || async move {
            loads.fetch_add(1, Ordering::SeqCst);
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok(berlin_3x3())
        })
    };

    let clear_then_release = async {
        started_rx.await.unwrap();
        let dropped = cache.clear().await;
        release_tx.send(()).unwrap();
        dropped
    };

    let (result, dropped) = tokio::join!(get, clear_then_release);

    // The caller still gets its raster...
    assert_eq!(result.unwrap().value(1, 1), Some(50.0));
    assert_eq!(dropped, 1);

    // ...but it was not inserted into the new generation
    assert_eq!(cache.generation().await, 1);
    assert!(cache.is_empty().await);
    assert_eq!(cache.stats().await.stale_discards, 1);

    cache
        .get(key(2020, 3), slow_loader(loads.clone(), berlin_3x3()))
        .await
        .unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 2, "cleared key decodes again");
}

#[tokio::test]
async fn test_stale_decode_does_not_clobber_new_generation() {
    let cache = RasterCache::new();
    let gt = grid::SIMPLE_10X10.geotransform();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let (started_tx, started_rx) = oneshot::channel::<()>();

    let stale = cache.get(key(2020, 7), move || async move {
        let _ = started_tx.send(());
        let _ = release_rx.await;
        Ok(create_constant_raster(10, 10, gt, 1.0))
    });

    let refresh = async {
        started_rx.await.unwrap();
        cache.clear().await;
        let fresh = cache
            .get(key(2020, 7), move || async move {
                Ok(create_constant_raster(10, 10, gt, 2.0))
            })
            .await
            .unwrap();
        release_tx.send(()).unwrap();
        fresh
    };

    let (stale, fresh) = tokio::join!(stale, refresh);
    assert_eq!(stale.unwrap().value(0, 0), Some(1.0));
    assert_eq!(fresh.value(0, 0), Some(2.0));

    let cached = cache.peek(&key(2020, 7)).await.unwrap();
    assert_eq!(cached.value(0, 0), Some(2.0), "new generation keeps its own raster");
}
