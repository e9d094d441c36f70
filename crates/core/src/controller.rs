use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use tokio::{
    sync::{Mutex, oneshot},
    task::JoinHandle,
};
use tracing::Instrument;

use crate::{
    config::GameConfig,
    detector::Dependencies,
    error::Result,
    game::{
        GameStatus,
        runner::{Binding, GameLoop, SharedGame},
    },
    observer::{GameObserver, TracingObserver},
};

/// Owns one game session and the background loop that drives it.
pub struct GameController {
    shared: Arc<SharedGame>,
    observer: Arc<dyn GameObserver>,
    lifecycle: Mutex<Lifecycle>,
}

struct Lifecycle {
    binding: Binding,
    task: Option<LoopTask>,
}

struct LoopTask {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl GameController {
    /// Binds the configured camera and detector. The loop is not started.
    pub fn new(config: &GameConfig, dependencies: &Dependencies) -> Result<Self> {
        Self::with_observer(config, dependencies, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        config: &GameConfig,
        dependencies: &Dependencies,
        observer: Arc<dyn GameObserver>,
    ) -> Result<Self> {
        let detector = dependencies.detector(&config.detector_name)?;

        Ok(Self {
            shared: Arc::new(SharedGame::default()),
            observer,
            lifecycle: Mutex::new(Lifecycle {
                binding: Binding::new(config, detector),
                task: None,
            }),
        })
    }

    pub async fn start(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        self.start_locked(&mut lifecycle);
    }

    /// Stops the loop and waits for it to exit. No state changes once this
    /// returns.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        Self::stop_locked(&mut lifecycle).await;
    }

    pub async fn close(&self) {
        self.stop().await;
    }

    /// Re-binds camera and detector and restarts the loop with a fresh game.
    /// On error the current binding and loop are left as they were.
    pub async fn reconfigure(&self, config: &GameConfig, dependencies: &Dependencies) -> Result<()> {
        let detector = dependencies.detector(&config.detector_name)?;

        let mut lifecycle = self.lifecycle.lock().await;
        Self::stop_locked(&mut lifecycle).await;
        self.shared.reset().await;
        lifecycle.binding = Binding::new(config, detector);
        self.start_locked(&mut lifecycle);

        Ok(())
    }

    /// Picked up by the next tick. Repeated requests before that collapse
    /// into one.
    pub fn request_new_game(&self) {
        self.shared.request_new_game();
    }

    pub async fn status(&self) -> GameStatus {
        self.shared.snapshot().await.status()
    }

    pub async fn is_running(&self) -> bool {
        self.lifecycle
            .lock()
            .await
            .task
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    fn start_locked(&self, lifecycle: &mut Lifecycle) {
        if lifecycle
            .task
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
        {
            tracing::info!("game loop already running");
            return;
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let span = tracing::info_span!(
            "game_loop",
            camera = %lifecycle.binding.camera_name,
            detector = %lifecycle.binding.detector_name,
        );
        let game_loop = GameLoop::new(
            self.shared.clone(),
            lifecycle.binding.clone(),
            self.observer.clone(),
            StdRng::from_os_rng(),
        );
        let handle = tokio::spawn(game_loop.run(shutdown_rx).instrument(span));

        lifecycle.task = Some(LoopTask {
            shutdown_tx,
            handle,
        });
        tracing::info!("game loop started");
    }

    async fn stop_locked(lifecycle: &mut Lifecycle) {
        let Some(task) = lifecycle.task.take() else {
            tracing::debug!("game loop not running");
            return;
        };

        let _ = task.shutdown_tx.send(());
        if let Err(error) = task.handle.await {
            tracing::error!(%error, "game loop ended abnormally");
        }
        tracing::info!("game loop stopped");
    }
}

impl Drop for GameController {
    fn drop(&mut self) {
        if let Some(task) = self.lifecycle.get_mut().task.take() {
            let _ = task.shutdown_tx.send(());
        }
    }
}
