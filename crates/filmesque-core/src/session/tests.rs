use super::*;

use std::sync::mpsc::{self, Receiver};
use std::sync::{OnceLock, Weak};
use std::thread;
use std::time::{Duration, Instant};

use crate::catalog::ids;
use crate::events::{CallbackSink, NullSink};
use crate::pipeline::apply;

const TIMEOUT: Duration = Duration::from_secs(30);

fn config() -> EngineConfig {
    EngineConfig {
        worker_threads: Some(2),
        ..EngineConfig::default()
    }
}

fn photo() -> Image {
    let (w, h) = (64u32, 48u32);
    let mut pixels = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            pixels.extend_from_slice(&[(x * 4) as u8, (y * 5) as u8, 90, 255]);
        }
    }
    Image::from_rgba8(w, h, pixels).unwrap()
}

fn session() -> (EditSession, Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let session =
        EditSession::new(Arc::new(Catalog::standard()), &config(), Arc::new(tx)).unwrap();
    (session, rx)
}

/// Collect events up to and including the `ResultReady` of `generation`.
fn events_until_result(rx: &Receiver<EngineEvent>, generation: u64) -> Vec<EngineEvent> {
    let deadline = Instant::now() + TIMEOUT;
    let mut events = Vec::new();
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(left) {
            Ok(event) => {
                let done = matches!(
                    event,
                    EngineEvent::ResultReady { generation: g, .. } if g == generation
                );
                events.push(event);
                if done {
                    return events;
                }
            }
            Err(err) => panic!("no result for generation {}: {}", generation, err),
        }
    }
}

fn wait_for_result(rx: &Receiver<EngineEvent>, generation: u64) -> Image {
    match events_until_result(rx, generation).pop() {
        Some(EngineEvent::ResultReady { image, .. }) => image,
        other => panic!("expected ResultReady, got {:?}", other),
    }
}

fn count_results(events: &[EngineEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, EngineEvent::ResultReady { .. }))
        .count()
}

fn expected(filter_id: &str, intensity: f32) -> Image {
    let filter = Catalog::builtin().get(filter_id).unwrap();
    apply(&photo(), filter, intensity, &RenderContext::new(&config())).unwrap()
}

#[test]
fn test_new_session_is_idle() {
    let (session, _rx) = session();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.selected.as_str(), ids::ORIGINAL);
    assert_eq!(snapshot.intensity, 1.0);
    assert!(!snapshot.is_processing);
    assert!(!snapshot.has_source);
    assert!(snapshot.result.is_none());
}

#[test]
fn test_changes_without_image_do_not_render() {
    let (session, rx) = session();
    session.select_filter(ids::WARM).unwrap();
    session.set_intensity(0.4);

    assert!(!session.is_processing());
    assert_eq!(session.snapshot().generation, 0);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_unknown_filter_is_rejected() {
    let (session, _rx) = session();
    assert!(matches!(
        session.select_filter("nope"),
        Err(EngineError::UnknownFilter(_))
    ));
    assert_eq!(session.snapshot().selected.as_str(), ids::ORIGINAL);
}

#[test]
fn test_load_renders_identity_result() {
    let (session, rx) = session();
    session.load_image(photo());

    let image = wait_for_result(&rx, 1);
    assert_eq!(image, photo());
    assert!(!session.is_processing());
    assert_eq!(session.result(), Some(photo()));
}

#[test]
fn test_select_and_intensity_render_blended_result() {
    let (session, rx) = session();
    session.load_image(photo());
    session.select_filter(ids::POLAROID).unwrap();
    let full = wait_for_result(&rx, 2);
    assert_eq!(full, expected(ids::POLAROID, 1.0));

    session.set_intensity(0.5);
    let half = wait_for_result(&rx, 3);
    assert_eq!(half, expected(ids::POLAROID, 0.5));
    assert_eq!(session.snapshot().intensity, 0.5);
}

#[test]
fn test_intensity_is_clamped() {
    let (session, _rx) = session();
    session.set_intensity(3.0);
    assert_eq!(session.snapshot().intensity, 1.0);
    session.set_intensity(-1.0);
    assert_eq!(session.snapshot().intensity, 0.0);
}

#[test]
fn test_stale_renders_are_discarded() {
    let (tx, rx) = mpsc::channel();
    let pool = Arc::new(ThreadPoolBuilder::new().num_threads(1).build().unwrap());
    let previews = PreviewScheduler::new(&config()).unwrap();
    let session = EditSession::with_pools(
        Arc::new(Catalog::standard()),
        &config(),
        Arc::new(tx),
        Arc::clone(&pool),
        previews,
    );

    // Hold the only render thread so all three requests queue up
    let (release_tx, release_rx) = mpsc::channel::<()>();
    pool.spawn(move || {
        let _ = release_rx.recv();
    });

    session.load_image(photo());
    session.select_filter(ids::VINTAGE).unwrap();
    session.set_intensity(0.5);
    assert!(session.is_processing());
    drop(release_tx);

    let before = events_until_result(&rx, 3);
    assert_eq!(count_results(&before), 1, "stale renders must not publish results");

    // Runs after the queued renders on the single thread
    let (done_tx, done_rx) = mpsc::channel();
    pool.spawn(move || {
        let _ = done_tx.send(());
    });
    done_rx.recv_timeout(TIMEOUT).unwrap();

    let after: Vec<EngineEvent> = rx.try_iter().collect();
    assert_eq!(count_results(&after), 0, "stale renders must not publish results");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.generation, 3);
    assert!(!snapshot.is_processing);
    assert_eq!(snapshot.result, Some(expected(ids::VINTAGE, 0.5)));
}

#[test]
fn test_processing_events_are_ordered() {
    let (tx, rx) = mpsc::channel();
    let session = EditSession::new(Arc::new(Catalog::standard()), &config(), Arc::new(tx)).unwrap();
    session.load_image(photo());
    session.select_filter(ids::SEPIA).unwrap();
    session.set_intensity(0.2);

    let started: Vec<u64> = rx
        .try_iter()
        .filter_map(|e| match e {
            EngineEvent::ProcessingStarted { generation, .. } => Some(generation),
            _ => None,
        })
        .collect();
    assert_eq!(started, [1, 2, 3]);
}

// ============================================================================
// Sinks that call back into the session
// ============================================================================

type SessionSlot = Arc<OnceLock<Weak<EditSession>>>;

fn session_with_sink<S: EventSink + 'static>(slot: &SessionSlot, sink: S) -> Arc<EditSession> {
    let session = Arc::new(
        EditSession::new(Arc::new(Catalog::standard()), &config(), Arc::new(sink)).unwrap(),
    );
    assert!(slot.set(Arc::downgrade(&session)).is_ok());
    session
}

#[test]
fn test_sink_can_read_session_while_handling_events() {
    let slot: SessionSlot = Arc::new(OnceLock::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let slot = Arc::clone(&slot);
        let seen = Arc::clone(&seen);
        CallbackSink(move |event: EngineEvent| {
            let Some(session) = slot.get().and_then(Weak::upgrade) else {
                return;
            };
            let label = match event {
                EngineEvent::ProcessingStarted { generation, .. } => format!("started {}", generation),
                EngineEvent::ResultReady { generation, .. } => format!("result {}", generation),
                EngineEvent::PreviewReady { filter, .. } if filter.as_str() == ids::ORIGINAL => {
                    "identity preview".to_string()
                }
                _ => return,
            };
            let generation = session.snapshot().generation;
            seen.lock().unwrap().push((label, generation));
        })
    };
    let session = session_with_sink(&slot, sink);

    let driver = Arc::clone(&session);
    let (done_tx, done_rx) = mpsc::channel();
    thread::spawn(move || {
        driver.load_image(photo());
        driver.select_filter(ids::SEPIA).unwrap();
        let _ = done_tx.send(());
    });
    done_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("session calls blocked while the sink read the session");

    let deadline = Instant::now() + TIMEOUT;
    let events = loop {
        let events = seen.lock().unwrap().clone();
        if events.iter().any(|(label, _)| label == "result 2") {
            break events;
        }
        assert!(Instant::now() < deadline, "no result for generation 2: {:?}", events);
        thread::sleep(Duration::from_millis(5));
    };

    let position = |label: &str| events.iter().position(|(l, _)| l == label);
    let generation_at = |label: &str| events.iter().find(|(l, _)| l == label).map(|(_, g)| *g);
    assert!(position("identity preview").is_some());
    assert!(position("started 1") < position("started 2"));
    assert!(position("started 2") < position("result 2"));
    assert!(generation_at("started 1") >= Some(1));
    assert!(generation_at("started 2") >= Some(2));
    assert_eq!(generation_at("result 2"), Some(2));
}

#[test]
fn test_sink_can_change_selection_from_result() {
    let slot: SessionSlot = Arc::new(OnceLock::new());
    let (tx, rx) = mpsc::channel();
    let sink = {
        let slot = Arc::clone(&slot);
        let tx = Mutex::new(tx);
        CallbackSink(move |event: EngineEvent| {
            let first_result = matches!(event, EngineEvent::ResultReady { generation: 1, .. });
            let _ = tx.lock().unwrap().send(event);
            if first_result {
                if let Some(session) = slot.get().and_then(Weak::upgrade) {
                    session.select_filter(ids::NEGATIVE).unwrap();
                }
            }
        })
    };
    let session = session_with_sink(&slot, sink);
    session.load_image(photo());

    let events = events_until_result(&rx, 2);
    let started: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::ProcessingStarted { generation, .. } => Some(*generation),
            _ => None,
        })
        .collect();
    assert_eq!(started, [1, 2]);
    match events.last() {
        Some(EngineEvent::ResultReady { image, .. }) => assert_eq!(image, &expected(ids::NEGATIVE, 1.0)),
        other => panic!("expected ResultReady, got {:?}", other),
    }
    assert_eq!(session.snapshot().selected.as_str(), ids::NEGATIVE);
}

#[test]
fn test_with_catalog_uses_global_config() {
    let session = EditSession::with_catalog(Arc::new(Catalog::standard()), Arc::new(NullSink)).unwrap();
    assert_eq!(session.ctx.parallel_threshold(), config::global_engine_config().parallel_threshold);
}

// ============================================================================
// Save and clear
// ============================================================================

#[test]
fn test_save_without_result_fails() {
    let (session, _rx) = session();
    let sink = |_: &Image| -> std::result::Result<(), ExportError> { Ok(()) };
    let err = session.save_result(&sink).unwrap_err();
    assert!(matches!(err, ExportError::NothingToSave));
    assert_eq!(err.to_string(), "No filtered image to save");
}

#[test]
fn test_save_hands_result_to_sink() {
    let (session, rx) = session();
    session.load_image(photo());
    session.select_filter(ids::NEGATIVE).unwrap();
    let result = wait_for_result(&rx, 2);

    let saved = Mutex::new(None);
    let sink = |image: &Image| -> std::result::Result<(), ExportError> {
        *saved.lock().unwrap() = Some(image.clone());
        Ok(())
    };
    session.save_result(&sink).unwrap();
    assert_eq!(saved.into_inner().unwrap(), Some(result));
}

#[test]
fn test_save_returns_sink_failure() {
    let (session, rx) = session();
    session.load_image(photo());
    wait_for_result(&rx, 1);

    let sink = |_: &Image| -> std::result::Result<(), ExportError> {
        Err(ExportError::rejected("photo library access denied"))
    };
    match session.save_result(&sink) {
        Err(ExportError::Rejected { cause }) => assert_eq!(cause, "photo library access denied"),
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[test]
fn test_clear_image_drops_result() {
    let (session, rx) = session();
    session.load_image(photo());
    wait_for_result(&rx, 1);

    session.clear_image();
    let snapshot = session.snapshot();
    assert!(!snapshot.has_source);
    assert!(snapshot.result.is_none());
    assert!(!snapshot.is_processing);
    assert!(session.previews().is_none());
}

#[test]
fn test_load_image_starts_previews() {
    let (session, _rx) = session();
    let job = session.load_image(photo());
    let summary = job.wait_timeout(TIMEOUT).expect("previews timed out");
    assert_eq!(summary.ready, Catalog::builtin().len());
    assert!(session.previews().is_some());
}
