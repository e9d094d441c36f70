use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Local};
use game_api_types::Detection;
use rand::rngs::StdRng;
use tokio::sync::{RwLock, oneshot};

use crate::{
    catalog::Item,
    config::GameConfig,
    detector::Detector,
    error::{GameError, Result},
    game::state::{GameState, Round, is_target_detected},
    observer::{GameEvent, GameObserver},
};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// State shared between the loop (sole writer) and the query side.
#[derive(Default)]
pub(crate) struct SharedGame {
    new_game_requested: AtomicBool,
    state: RwLock<GameState>,
}

impl SharedGame {
    pub(crate) fn request_new_game(&self) {
        self.new_game_requested.store(true, Ordering::Release);
    }

    fn take_new_game_request(&self) -> bool {
        self.new_game_requested.swap(false, Ordering::AcqRel)
    }

    pub(crate) async fn snapshot(&self) -> GameState {
        self.state.read().await.clone()
    }

    async fn publish(&self, state: GameState) {
        *self.state.write().await = state;
    }

    pub(crate) async fn reset(&self) {
        self.new_game_requested.store(false, Ordering::Release);
        self.publish(GameState::default()).await;
    }
}

/// What the loop talks to: the camera by name, the detector by handle.
#[derive(Clone)]
pub(crate) struct Binding {
    pub(crate) camera_name: String,
    pub(crate) detector_name: String,
    pub(crate) detector: Arc<dyn Detector>,
    pub(crate) detection_timeout: Option<Duration>,
}

impl Binding {
    pub(crate) fn new(config: &GameConfig, detector: Arc<dyn Detector>) -> Self {
        Self {
            camera_name: config.camera_name.clone(),
            detector_name: config.detector_name.clone(),
            detector,
            detection_timeout: config.detection_timeout,
        }
    }
}

pub(crate) struct GameLoop {
    shared: Arc<SharedGame>,
    binding: Binding,
    observer: Arc<dyn GameObserver>,
    rng: StdRng,
}

impl GameLoop {
    pub(crate) fn new(
        shared: Arc<SharedGame>,
        binding: Binding,
        observer: Arc<dyn GameObserver>,
        rng: StdRng,
    ) -> Self {
        Self {
            shared,
            binding,
            observer,
            rng,
        }
    }

    /// Runs ticks until `shutdown` fires or its sender is dropped. An
    /// in-flight tick is abandoned at its current await point.
    pub(crate) async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.tick(Local::now()) => {}
            }

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(TICK_INTERVAL) => {}
            }
        }

        self.observer.on_event(&GameEvent::LoopStopped);
    }

    /// One pass of the state machine. Never fails; errors are reported to
    /// the observer and the tick ends early.
    pub(crate) async fn tick(&mut self, now: DateTime<Local>) {
        if let Err(error) = self.process(now).await {
            self.observer.on_event(&GameEvent::TickFailed {
                error: error.to_string(),
            });
        }
    }

    async fn process(&mut self, now: DateTime<Local>) -> Result<()> {
        let mut state = self.shared.snapshot().await;

        if self.shared.take_new_game_request() {
            let item = Item::random(&mut self.rng);
            state = state.new_game(now, item);
            self.shared.publish(state.clone()).await;
            self.observer.on_event(&GameEvent::GameStarted { at: now, item });
        }

        match state.round {
            Some(round) if round.is_active(now) => {
                self.check_for_detection(&state, round, now).await
            }
            Some(_) => {
                let final_score = state.score;
                self.shared.publish(state.round_over()).await;
                self.observer.on_event(&GameEvent::RoundOver {
                    at: now,
                    final_score,
                });
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn check_for_detection(
        &mut self,
        state: &GameState,
        round: Round,
        now: DateTime<Local>,
    ) -> Result<()> {
        tracing::debug!(item = %round.item, "checking for item detection");
        let detections = self.detect().await?;

        if !is_target_detected(&detections, round.item) {
            self.observer
                .on_event(&GameEvent::NotDetected { item: round.item });
            return Ok(());
        }

        let item = Item::random(&mut self.rng);
        let next = state.scored(now, item);
        let score = next.score;
        self.shared.publish(next).await;

        self.observer.on_event(&GameEvent::Detected {
            item: round.item,
            score,
        });
        self.observer
            .on_event(&GameEvent::RoundStarted { at: now, item });
        Ok(())
    }

    async fn detect(&self) -> Result<Vec<Detection>> {
        let call = self
            .binding
            .detector
            .detections_from_camera(&self.binding.camera_name);

        match self.binding.detection_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GameError::DetectionTimeout(limit))?
                .map_err(GameError::from),
            None => Ok(call.await?),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{TimeDelta, TimeZone};
    use futures_util::{FutureExt, future::BoxFuture};
    use rand::SeedableRng;
    use strum::VariantArray;

    use super::*;
    use crate::error::DetectionError;

    /// Answers with whatever the test put in `next`, counting calls.
    #[derive(Default)]
    struct ScriptedDetector {
        next: Mutex<Option<std::result::Result<Vec<Detection>, String>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedDetector {
        fn answer(&self, detections: Vec<Detection>) {
            *self.next.lock().unwrap() = Some(Ok(detections));
        }

        fn fail(&self, message: &str) {
            *self.next.lock().unwrap() = Some(Err(message.to_owned()));
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Detector for ScriptedDetector {
        fn detections_from_camera<'a>(
            &'a self,
            camera_name: &'a str,
        ) -> BoxFuture<'a, std::result::Result<Vec<Detection>, DetectionError>> {
            self.calls.lock().unwrap().push(camera_name.to_owned());
            let answer = self.next.lock().unwrap().clone().unwrap_or(Ok(Vec::new()));
            async move { answer.map_err(DetectionError::Other) }.boxed()
        }
    }

    struct HangingDetector;

    impl Detector for HangingDetector {
        fn detections_from_camera<'a>(
            &'a self,
            _camera_name: &'a str,
        ) -> BoxFuture<'a, std::result::Result<Vec<Detection>, DetectionError>> {
            futures_util::future::pending::<std::result::Result<Vec<Detection>, DetectionError>>().boxed()
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<GameEvent>>,
    }

    impl RecordingObserver {
        fn take(&self) -> Vec<GameEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl GameObserver for RecordingObserver {
        fn on_event(&self, event: &GameEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    struct Harness {
        shared: Arc<SharedGame>,
        observer: Arc<RecordingObserver>,
        game_loop: GameLoop,
    }

    fn harness(detector: Arc<dyn Detector>, detection_timeout: Option<Duration>) -> Harness {
        let shared = Arc::new(SharedGame::default());
        let observer = Arc::new(RecordingObserver::default());
        let binding = Binding {
            camera_name: "webcam".to_owned(),
            detector_name: "vision".to_owned(),
            detector,
            detection_timeout,
        };
        let game_loop = GameLoop::new(
            shared.clone(),
            binding,
            observer.clone(),
            StdRng::seed_from_u64(42),
        );

        Harness {
            shared,
            observer,
            game_loop,
        }
    }

    fn at(secs: i64) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    fn assert_round_invariant(state: &GameState) {
        let status = state.status();
        assert_eq!(status.round_start.is_none(), status.item_to_detect.is_empty());
    }

    fn round_item(state: &GameState) -> Item {
        state.round.expect("a round should be running").item
    }

    #[tokio::test]
    async fn test_new_game_request_starts_round() {
        let detector = Arc::new(ScriptedDetector::default());
        let mut h = harness(detector.clone(), None);

        h.shared.request_new_game();
        h.game_loop.tick(at(0)).await;

        let state = h.shared.snapshot().await;
        assert_eq!(state.score, 0);
        assert_eq!(state.status().round_start, Some(at(0)));
        assert!(Item::VARIANTS.contains(&round_item(&state)));
        assert_round_invariant(&state);
        // the fresh round is checked in the same tick
        assert_eq!(detector.calls(), 1);
        assert_eq!(detector.calls.lock().unwrap()[0], "webcam");
        assert!(!h.shared.take_new_game_request());
    }

    #[tokio::test]
    async fn test_new_game_resets_running_score() {
        let detector = Arc::new(ScriptedDetector::default());
        let mut h = harness(detector, None);
        h.shared
            .publish(GameState {
                score: 7,
                round: Some(Round::new(at(0), Item::Cup)),
            })
            .await;

        h.shared.request_new_game();
        h.game_loop.tick(at(10)).await;

        let state = h.shared.snapshot().await;
        assert_eq!(state.score, 0);
        assert_eq!(state.status().round_start, Some(at(10)));
    }

    #[tokio::test]
    async fn test_confident_detection_scores_and_rerolls() {
        let detector = Arc::new(ScriptedDetector::default());
        let mut h = harness(detector.clone(), None);
        h.shared.request_new_game();
        h.game_loop.tick(at(0)).await;
        let item = round_item(&h.shared.snapshot().await);
        h.observer.take();

        detector.answer(vec![Detection::new(item.label(), 0.9)]);
        h.game_loop.tick(at(5)).await;

        let state = h.shared.snapshot().await;
        assert_eq!(state.score, 1);
        assert_eq!(state.status().round_start, Some(at(5)));
        assert_round_invariant(&state);

        let events = h.observer.take();
        assert_eq!(events[0], GameEvent::Detected { item, score: 1 });
        assert_eq!(
            events[1],
            GameEvent::RoundStarted {
                at: at(5),
                item: round_item(&state)
            }
        );
    }

    #[tokio::test]
    async fn test_weak_detection_changes_nothing() {
        let detector = Arc::new(ScriptedDetector::default());
        let mut h = harness(detector.clone(), None);
        h.shared.request_new_game();
        h.game_loop.tick(at(0)).await;
        let before = h.shared.snapshot().await;
        let item = round_item(&before);
        h.observer.take();

        detector.answer(vec![Detection::new(item.label(), 0.3)]);
        h.game_loop.tick(at(5)).await;

        assert_eq!(h.shared.snapshot().await, before);
        assert_eq!(h.observer.take(), vec![GameEvent::NotDetected { item }]);
    }

    #[tokio::test]
    async fn test_expired_round_ends_once() {
        let detector = Arc::new(ScriptedDetector::default());
        let mut h = harness(detector.clone(), None);
        h.shared
            .publish(GameState {
                score: 3,
                round: Some(Round::new(at(0), Item::Mouse)),
            })
            .await;

        h.game_loop.tick(at(61)).await;

        let state = h.shared.snapshot().await;
        assert_eq!(state, GameState { score: 3, round: None });
        assert_round_invariant(&state);
        assert_eq!(detector.calls(), 0);
        assert_eq!(
            h.observer.take(),
            vec![GameEvent::RoundOver {
                at: at(61),
                final_score: 3
            }]
        );

        h.game_loop.tick(at(62)).await;
        assert_eq!(h.shared.snapshot().await, state);
        assert!(h.observer.take().is_empty());
    }

    #[tokio::test]
    async fn test_idle_tick_is_a_no_op() {
        let detector = Arc::new(ScriptedDetector::default());
        let mut h = harness(detector.clone(), None);

        h.game_loop.tick(at(0)).await;
        h.game_loop.tick(at(1)).await;

        assert_eq!(h.shared.snapshot().await, GameState::default());
        assert!(h.observer.take().is_empty());
        assert_eq!(detector.calls(), 0);
    }

    #[tokio::test]
    async fn test_detector_failure_is_recovered() {
        let detector = Arc::new(ScriptedDetector::default());
        let mut h = harness(detector.clone(), None);
        h.shared.request_new_game();
        h.game_loop.tick(at(0)).await;
        let before = h.shared.snapshot().await;
        h.observer.take();

        detector.fail("model offline");
        h.game_loop.tick(at(1)).await;

        assert_eq!(h.shared.snapshot().await, before);
        assert_eq!(
            h.observer.take(),
            vec![GameEvent::TickFailed {
                error: "model offline".to_owned()
            }]
        );

        let item = round_item(&before);
        detector.answer(vec![Detection::new(item.label(), 0.8)]);
        h.game_loop.tick(at(2)).await;
        assert_eq!(h.shared.snapshot().await.score, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detection_timeout_ends_tick() {
        let mut h = harness(Arc::new(HangingDetector), Some(Duration::from_secs(2)));
        h.shared.request_new_game();

        h.game_loop.tick(at(0)).await;

        let events = h.observer.take();
        assert!(matches!(events[0], GameEvent::GameStarted { .. }));
        assert_eq!(
            events[1],
            GameEvent::TickFailed {
                error: GameError::DetectionTimeout(Duration::from_secs(2)).to_string()
            }
        );
        assert_eq!(h.shared.snapshot().await.score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_reports_loop_stopped() {
        let detector = Arc::new(ScriptedDetector::default());
        let h = harness(detector, None);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        h.shared.request_new_game();

        let handle = tokio::spawn(h.game_loop.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();

        let events = h.observer.take();
        assert!(matches!(events.first(), Some(GameEvent::GameStarted { .. })));
        assert_eq!(events.last(), Some(&GameEvent::LoopStopped));
        assert_eq!(
            events
                .iter()
                .filter(|event| **event == GameEvent::LoopStopped)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_invariant_holds_across_a_session() {
        let detector = Arc::new(ScriptedDetector::default());
        let mut h = harness(detector.clone(), None);
        h.shared.request_new_game();

        for second in 0..200 {
            if second % 7 == 0 {
                if let Some(round) = h.shared.snapshot().await.round {
                    detector.answer(vec![Detection::new(round.item.label(), 0.6)]);
                }
            } else {
                detector.answer(Vec::new());
            }
            if second == 150 {
                h.shared.request_new_game();
            }

            h.game_loop.tick(at(second)).await;
            assert_round_invariant(&h.shared.snapshot().await);
        }
    }
}
