use crate::app_config::AppConfig;
use crate::domain::{Color, Dimming, DisplayBounds};
use crate::frame_source::FrameSource;
use crate::sampler::{SampleConfig, sample};
use crate::ticks::TickSource;
use crate::wiz::{BulbTarget, ProtocolError, WizClient};
use std::ops::ControlFlow;
use image::RgbImage;
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, error, info, instrument, warn};

const PROBE_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Mirrors the screen onto a bulb, one sample and one update per tick.
pub struct Session<F, T> {
    client: WizClient,
    target: BulbTarget,
    dimming: Dimming,
    interval: Duration,
    transition_steps: u32,
    sample_config: SampleConfig,
    bounds: DisplayBounds,
    frame_source: Arc<Mutex<F>>,
    ticks: T,
    running: Arc<AtomicBool>,
    stop_rx: watch::Receiver<bool>,
    failures: FailureTracker,
    previous: Option<Color>,
    tick_count: u64,
}

impl<F: FrameSource + 'static, T: TickSource> Session<F, T> {
    /// Probes the bulb and, once it answered, starts ticking in the background.
    /// The socket is only kept when the bulb is reachable.
    pub async fn start(config: &AppConfig, frame_source: F, ticks: T) -> Result<SessionHandle, SessionError>
    where
        T: 'static,
    {
        let target = config.bulb().target();
        info!("🚦 Starting session with bulb {}...", target);

        let client = WizClient::bind().await?;
        if !probe(&client, &target, config.bulb().probe_timeout(), config.bulb().probe_retries()).await {
            warn!("🚦 Starting session with bulb {}... failed, bulb is unreachable", target);
            return Err(SessionError::Unreachable { target: target.to_string() });
        }

        let running = Arc::new(AtomicBool::new(true));
        let (stop_tx, stop_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);

        let session = Session::new(config, client, frame_source, ticks, running.clone(), stop_rx);
        let task = tokio::spawn(async move {
            session.run().await;
            done_tx.send_replace(true);
        });

        info!(interval = ?config.session().interval(), dimming = %config.session().dimming(), "🚦 Starting session with bulb {}... OK", target);
        Ok(SessionHandle {
            running,
            stop_tx,
            done_rx,
            task,
        })
    }

    fn new(config: &AppConfig, client: WizClient, frame_source: F, ticks: T, running: Arc<AtomicBool>, stop_rx: watch::Receiver<bool>) -> Self {
        Session {
            client,
            target: config.bulb().target(),
            dimming: config.session().dimming(),
            interval: config.session().interval(),
            transition_steps: config.session().transition_steps(),
            sample_config: *config.sampler(),
            bounds: *config.display(),
            frame_source: Arc::new(Mutex::new(frame_source)),
            ticks,
            running,
            stop_rx,
            failures: FailureTracker::new(config.session().max_consecutive_failures()),
            previous: None,
            tick_count: 0,
        }
    }

    #[instrument(skip_all, fields(bulb = %self.target))]
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                _ = wait_until_set(&mut self.stop_rx) => break,
                tick = self.ticks.tick() => {
                    if tick.is_none() {
                        info!("🛑 Tick source is exhausted");
                        break;
                    }
                }
            }

            if self.tick().await.is_break() {
                break;
            }
        }

        self.running.store(false, Ordering::Release);
        info!("🛑 Session ended after {} tick(s)", self.tick_count);
    }

    async fn tick(&mut self) -> ControlFlow<()> {
        if !self.running.load(Ordering::Acquire) {
            debug!("Ignoring tick, the session is stopped");
            return ControlFlow::Continue(());
        }

        let Some(frame) = capture(self.frame_source.clone(), self.bounds).await else {
            return ControlFlow::Continue(());
        };
        let color = sample(&frame, &self.sample_config);
        self.tick_count += 1;

        match self.send(color).await {
            Ok(()) => {
                self.failures.record_success();
                info!(tick = self.tick_count, "🎨 Color updated: {} (R={}, G={}, B={})", color, color.r, color.g, color.b);
                ControlFlow::Continue(())
            }
            Err(e) => {
                warn!(tick = self.tick_count, "⚠️ Unable to update the bulb: {}", e);
                if self.failures.record_failure() {
                    error!("❌ Giving up after {} consecutive failed updates", self.failures.consecutive);
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            }
        }
    }

    /// Sends `color`, fading in from the previous color over the configured number of steps.
    async fn send(&mut self, color: Color) -> Result<(), ProtocolError> {
        let from = self.previous.unwrap_or(color);
        let steps = if from == color { 1 } else { self.transition_steps };
        let pause = self.interval / steps;

        for step in 1..=steps {
            if step > 1 && !self.pause(pause).await {
                return Ok(());
            }

            let intermediate = from.lerp(color, step as f32 / steps as f32);
            self.client.set_color(&self.target, intermediate, self.dimming).await?;
            self.previous = Some(intermediate);
        }

        Ok(())
    }

    /// Returns false when the session was stopped while sleeping.
    async fn pause(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = sleep(duration) => self.running.load(Ordering::Acquire),
            _ = wait_until_set(&mut self.stop_rx) => false,
        }
    }
}

/// Decoding a frame is synchronous, so it runs on the blocking pool.
async fn capture<F: FrameSource + 'static>(source: Arc<Mutex<F>>, bounds: DisplayBounds) -> Option<RgbImage> {
    let captured = tokio::task::spawn_blocking(move || source.lock().unwrap_or_else(PoisonError::into_inner).capture(&bounds)).await;

    match captured {
        Ok(Ok(frame)) => Some(frame),
        Ok(Err(e)) => {
            warn!("⚠️ Skipping tick, {}", e);
            None
        }
        Err(e) => {
            warn!("⚠️ Skipping tick, frame capture panicked: {}", e);
            None
        }
    }
}

async fn probe(client: &WizClient, target: &BulbTarget, wait: Duration, retries: u32) -> bool {
    let strategy = FixedInterval::new(PROBE_RETRY_DELAY).take(retries as usize);

    Retry::start(strategy, || async move {
        if client.test_connection(target, wait).await { Ok(()) } else { Err(()) }
    })
    .await
    .is_ok()
}

/// Resolves once the flag is set, or once nobody can set it anymore.
async fn wait_until_set(rx: &mut watch::Receiver<bool>) {
    loop {
        let set = *rx.borrow_and_update();
        if set || rx.changed().await.is_err() {
            return;
        }
    }
}

/// Owns a running session. Dropping it without [`SessionHandle::stop`] also ends the session.
#[derive(Debug)]
pub struct SessionHandle {
    running: Arc<AtomicBool>,
    stop_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Resolves once the session ended on its own.
    pub async fn finished(&self) {
        wait_until_set(&mut self.done_rx.clone()).await;
    }

    /// Stops ticking and waits for the session to release its socket.
    /// A datagram already handed to the OS may still go out.
    pub async fn stop(self) {
        info!("🛑 Stopping session...");
        self.running.store(false, Ordering::Release);
        self.stop_tx.send_replace(true);

        if let Err(e) = self.task.await {
            error!("❌ Session task failed: {}", e);
        }
        info!("🛑 Stopping session... OK");
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("bulb {target} did not answer")]
    Unreachable { target: String },
    #[error(transparent)]
    Client(#[from] ProtocolError),
}

#[derive(Debug)]
struct FailureTracker {
    limit: u32,
    consecutive: u32,
}

impl FailureTracker {
    fn new(limit: u32) -> Self {
        FailureTracker { limit, consecutive: 0 }
    }

    fn record_success(&mut self) {
        self.consecutive = 0;
    }

    /// Returns true once the limit is reached, never when the limit is 0.
    fn record_failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.limit > 0 && self.consecutive >= self.limit
    }
}
