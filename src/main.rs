use crate::app_config::AppConfig;
use crate::frame_source::ImageFileSource;
use crate::session::{Session, SessionError};
use crate::ticks::IntervalTicker;
use tokio::signal;
use tracing::{error, info, warn};

mod app_config;
mod domain;
mod extensions;
mod frame_source;
mod sampler;
mod session;
mod ticks;
mod wiz;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    tracing_subscriber::fmt().with_max_level(config.log().level()).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!("✅  Loaded configuration");

    let target = config.bulb().target();
    info!(
        dimming = config.session().dimming().value(),
        stride = config.sampler().stride.get(),
        "💡 Mirroring '{}' onto bulb {} (port {})",
        config.frame_source().path().display(),
        target.host(),
        target.port()
    );

    let frame_source = ImageFileSource::new(config.frame_source().path());
    let ticker = IntervalTicker::new(config.session().interval());

    let handle = match Session::start(&config, frame_source, ticker).await {
        Ok(handle) => handle,
        Err(e @ SessionError::Unreachable { .. }) => {
            error!("❌ {}, check the address and make sure the bulb is on the same network", e);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                error!("❌ Unable to listen for Ctrl-C: {}", e);
            }
        }
        _ = handle.finished() => {}
    }

    if !handle.is_running() {
        warn!("⚠️ Session ended on its own");
    }
    handle.stop().await;

    Ok(())
}
