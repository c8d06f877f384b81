//! Waveform loading and reveal tests
//!
//! Chunked appends, the reveal timer, generation cancellation, payload
//! fallback and the pre-fetch cache.

mod common;

use common::{path, player, settle, track, RecordingEngine};
use harmonia_playback::PlayerEvent;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn progress(events: &mut tokio::sync::broadcast::Receiver<PlayerEvent>) -> Vec<(usize, usize)> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PlayerEvent::WaveformProgress { loaded, total } = event {
            seen.push((loaded, total));
        }
    }
    seen
}

// ===== Chunking and reveal =====

#[tokio::test(start_paused = true)]
async fn test_waveform_is_appended_in_chunks() {
    let engine = RecordingEngine::new();
    let player = player(&engine);
    let mut events = player.subscribe();

    player.transport().initialize(track(1, "a")).await.unwrap();

    assert_eq!(
        progress(&mut events),
        vec![(30, 150), (60, 150), (90, 150), (120, 150), (150, 150)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_short_final_chunk() {
    let engine = RecordingEngine::new();
    engine.set_waveform(path("a"), vec![0.2; 45]);
    let player = player(&engine);
    let mut events = player.subscribe();

    player.transport().initialize(track(1, "a")).await.unwrap();

    assert_eq!(progress(&mut events), vec![(30, 45), (45, 45)]);
    assert_eq!(player.waveform().snapshot().total, 45);
}

#[tokio::test(start_paused = true)]
async fn test_reveal_never_outruns_loaded_samples() {
    let engine = RecordingEngine::new();
    let player = player(&engine);

    let transport = player.transport().clone();
    let load = tokio::spawn(async move { transport.initialize(track(1, "a")).await });

    for _ in 0..40 {
        settle(Duration::from_millis(3)).await;
        let snapshot = player.waveform().snapshot();
        assert!(
            snapshot.revealed <= snapshot.samples.len(),
            "revealed {} of {} loaded",
            snapshot.revealed,
            snapshot.samples.len()
        );
    }
    load.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_reveal_completes_loading() {
    let engine = RecordingEngine::new();
    let player = player(&engine);
    let mut events = player.subscribe();

    player.transport().initialize(track(1, "a")).await.unwrap();
    assert!(player.waveform().snapshot().loading);

    settle(Duration::from_secs(2)).await;

    let snapshot = player.waveform().snapshot();
    assert_eq!(snapshot.revealed, 150);
    assert_eq!(snapshot.total, 150);
    assert!(!snapshot.loading);

    let mut revealed = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PlayerEvent::WaveformRevealed { fingerprint } = event {
            revealed.push(fingerprint);
        }
    }
    assert_eq!(revealed, vec![track(1, "a").fingerprint()]);
}

// ===== Generations =====

#[tokio::test(start_paused = true)]
async fn test_superseded_chunks_never_mix() {
    let engine = RecordingEngine::new();
    engine.set_waveform(path("a"), vec![0.2; 150]);
    engine.set_waveform(path("b"), vec![0.8; 60]);
    let player = player(&engine);

    let transport = player.transport().clone();
    let first = tokio::spawn(async move { transport.initialize(track(1, "a")).await });

    // First track is mid-way through its chunks
    settle(Duration::from_millis(20)).await;
    player.transport().initialize(track(2, "b")).await.unwrap();
    first.await.unwrap().unwrap();

    settle(Duration::from_secs(2)).await;

    let snapshot = player.waveform().snapshot();
    assert_eq!(snapshot.samples, vec![0.8; 60]);
    assert_eq!(snapshot.revealed, 60);
    assert_eq!(snapshot.total, 60);
    assert!(!snapshot.loading);
}

// ===== Sources =====

#[tokio::test(start_paused = true)]
async fn test_payload_skips_extraction() {
    let engine = RecordingEngine::new();
    let player = player(&engine);

    player
        .transport()
        .initialize(track(1, "a").with_waveform("[0.1, 0.9, 2.0]"))
        .await
        .unwrap();

    assert!(engine.extracted().is_empty());
    assert_eq!(player.waveform().snapshot().samples, vec![0.1, 0.9, 1.0]);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payload_falls_back_to_extraction() {
    let engine = RecordingEngine::new();
    let player = player(&engine);

    player
        .transport()
        .initialize(track(1, "a").with_waveform("peaks: oops"))
        .await
        .unwrap();

    assert_eq!(engine.extracted(), vec![path("a")]);
    assert_eq!(player.waveform().snapshot().samples.len(), 150);
}

#[tokio::test(start_paused = true)]
async fn test_extraction_failure_still_starts_playback() {
    let engine = RecordingEngine::new();
    engine.fail_waveform.store(true, Ordering::SeqCst);
    let player = player(&engine);

    player.transport().initialize(track(1, "a")).await.unwrap();

    assert_eq!(engine.started(), vec![path("a")]);
    let snapshot = player.waveform().snapshot();
    assert!(snapshot.samples.is_empty());
    assert_eq!(snapshot.total, 0);
    assert!(!snapshot.loading);
}

#[tokio::test(start_paused = true)]
async fn test_replaying_uses_cached_waveform() {
    let engine = RecordingEngine::new();
    let player = player(&engine);

    player.transport().initialize(track(1, "a")).await.unwrap();
    player.transport().initialize(track(1, "a")).await.unwrap();

    assert_eq!(engine.extracted(), vec![path("a")]);
    assert!(player.waveform().is_cached(&track(1, "a").fingerprint()));
}

// ===== Pre-fetch =====

#[tokio::test(start_paused = true)]
async fn test_enqueue_prefetches_upcoming_waveforms() {
    let engine = RecordingEngine::new();
    let player = player(&engine);
    let queue = player.queue();

    queue.enqueue(track(1, "a"), None);
    queue.enqueue(track(2, "b"), None);
    queue.enqueue(track(3, "c"), None);
    settle(Duration::from_millis(10)).await;

    for (id, name) in [(1, "a"), (2, "b"), (3, "c")] {
        assert!(player.waveform().is_cached(&track(id, name).fingerprint()));
    }

    engine.clear_calls();
    queue.play_at_index(1).await.unwrap();
    assert!(engine.extracted().is_empty());
    assert_eq!(engine.started(), vec![path("b")]);
}

#[tokio::test(start_paused = true)]
async fn test_prefetch_skips_tracks_with_payload() {
    let engine = RecordingEngine::new();
    let player = player(&engine);

    player
        .queue()
        .enqueue(track(1, "a").with_waveform("[0.3, 0.4]"), None);
    settle(Duration::from_millis(10)).await;

    assert!(engine.extracted().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_prefetch_failure_is_silent() {
    let engine = RecordingEngine::new();
    engine.fail_waveform.store(true, Ordering::SeqCst);
    let player = player(&engine);

    let index = player.queue().enqueue(track(1, "a"), None);
    settle(Duration::from_millis(10)).await;

    assert_eq!(index, 0);
    assert_eq!(player.queue().len(), 1);
    assert!(!player.waveform().is_cached(&track(1, "a").fingerprint()));
}
