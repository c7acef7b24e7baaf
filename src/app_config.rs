use crate::domain::{Dimming, DisplayBounds};
use crate::sampler::SampleConfig;
use crate::wiz::BulbTarget;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::de::{Error, Unexpected};
use serde::{Deserialize, Deserializer};
use std::num::NonZeroU32;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

const INTERVAL_RANGE: RangeInclusive<Duration> = Duration::from_millis(100)..=Duration::from_millis(5000);

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    bulb: Bulb,
    session: Session,
    sampler: SampleConfig,
    display: DisplayBounds,
    frame_source: FrameFile,
    log: Log,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppConfigError> {
        Self::build(
            Config::builder()
                .add_source(File::with_name("config").required(true))
                .add_source(File::with_name("config_local").required(false))
                .add_source(Environment::with_prefix("MOODLIGHT").separator("__").try_parsing(true)),
        )
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppConfigError> {
        let config: AppConfig = builder
            .set_default("bulb.port", i64::from(BulbTarget::DEFAULT_PORT))?
            .set_default("bulb.probe_timeout", "1000ms")?
            .set_default("bulb.probe_retries", 0_i64)?
            .set_default("session.interval", "1500ms")?
            .set_default("session.dimming", i64::from(Dimming::MAX))?
            .set_default("session.smooth_transitions", false)?
            .set_default("session.transition_steps", 4_i64)?
            .set_default("session.max_consecutive_failures", 0_i64)?
            .set_default("sampler.stride", 5_i64)?
            .set_default("sampler.brightness_floor", 0.1)?
            .set_default("display.x", 0_i64)?
            .set_default("display.y", 0_i64)?
            .set_default("display.width", 1920_i64)?
            .set_default("display.height", 1080_i64)?
            .set_default("frame_source.path", "frame.png")?
            .set_default("log.level", "info")?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppConfigError> {
        if !INTERVAL_RANGE.contains(&self.session.interval) {
            return Err(AppConfigError::IntervalOutOfRange(self.session.interval));
        }

        let floor = self.sampler.brightness_floor;
        if !(0.0..1.0).contains(&floor) {
            return Err(AppConfigError::BrightnessFloorOutOfRange(floor));
        }

        Ok(())
    }

    pub fn bulb(&self) -> &Bulb {
        &self.bulb
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sampler(&self) -> &SampleConfig {
        &self.sampler
    }

    pub fn display(&self) -> &DisplayBounds {
        &self.display
    }

    pub fn frame_source(&self) -> &FrameFile {
        &self.frame_source
    }

    pub fn log(&self) -> &Log {
        &self.log
    }
}

#[derive(Error, Debug)]
pub enum AppConfigError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("session.interval must be between 100ms and 5s, got {0:?}")]
    IntervalOutOfRange(Duration),
    #[error("sampler.brightness_floor must be at least 0 and below 1, got {0}")]
    BrightnessFloorOutOfRange(f32),
}

#[derive(Debug, Deserialize)]
pub struct Bulb {
    host: String,
    port: u16,
    #[serde(with = "humantime_serde")]
    probe_timeout: Duration,
    probe_retries: u32,
}

impl Bulb {
    pub fn target(&self) -> BulbTarget {
        BulbTarget::new(&self.host).with_port(self.port)
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn probe_retries(&self) -> u32 {
        self.probe_retries
    }
}

#[derive(Debug, Deserialize)]
pub struct Session {
    #[serde(with = "humantime_serde")]
    interval: Duration,
    dimming: Dimming,
    smooth_transitions: bool,
    transition_steps: NonZeroU32,
    max_consecutive_failures: u32,
}

impl Session {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn dimming(&self) -> Dimming {
        self.dimming
    }

    /// Number of datagrams used to fade into a new color, 1 when transitions are off.
    pub fn transition_steps(&self) -> u32 {
        if self.smooth_transitions { self.transition_steps.get() } else { 1 }
    }

    /// 0 keeps the session alive whatever happens.
    pub fn max_consecutive_failures(&self) -> u32 {
        self.max_consecutive_failures
    }
}

#[derive(Debug, Deserialize)]
pub struct FrameFile {
    path: PathBuf,
}

impl FrameFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Deserialize)]
pub struct Log {
    #[serde(deserialize_with = "deserialize_level")]
    level: Level,
}

impl Log {
    pub fn level(&self) -> Level {
        self.level
    }
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    value
        .parse()
        .map_err(|_| D::Error::invalid_value(Unexpected::Str(&value), &"one of trace, debug, info, warn or error"))
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                bulb: Bulb {
                    host: "127.0.0.1".to_string(),
                    port: BulbTarget::DEFAULT_PORT,
                    probe_timeout: Duration::from_millis(500),
                    probe_retries: 0,
                },
                session: Session {
                    interval: Duration::from_millis(100),
                    dimming: Dimming::default(),
                    smooth_transitions: false,
                    transition_steps: NonZeroU32::MIN,
                    max_consecutive_failures: 0,
                },
                sampler: SampleConfig::default(),
                display: DisplayBounds::default(),
                frame_source: FrameFile {
                    path: PathBuf::from("frame.png"),
                },
                log: Log { level: Level::INFO },
            },
        }
    }

    pub fn bulb(mut self, target: &BulbTarget) -> Self {
        self.config.bulb.host = target.host().to_string();
        self.config.bulb.port = target.port();
        self
    }

    pub fn probe(mut self, timeout: Duration, retries: u32) -> Self {
        self.config.bulb.probe_timeout = timeout;
        self.config.bulb.probe_retries = retries;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.session.interval = interval;
        self
    }

    pub fn dimming(mut self, dimming: Dimming) -> Self {
        self.config.session.dimming = dimming;
        self
    }

    pub fn smooth_transitions(mut self, steps: u32) -> Self {
        self.config.session.smooth_transitions = true;
        self.config.session.transition_steps = NonZeroU32::new(steps).expect("steps must not be 0");
        self
    }

    pub fn max_consecutive_failures(mut self, max: u32) -> Self {
        self.config.session.max_consecutive_failures = max;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn from_toml(toml: &str) -> Result<AppConfig, AppConfigError> {
        AppConfig::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn applies_defaults() -> Result<(), AppConfigError> {
        let config = from_toml(
            r#"
            [bulb]
            host = "192.168.0.107"
            "#,
        )?;

        assert_eq!(config.bulb().target(), BulbTarget::new("192.168.0.107"));
        assert_eq!(config.bulb().probe_timeout(), Duration::from_millis(1000));
        assert_eq!(config.bulb().probe_retries(), 0);
        assert_eq!(config.session().interval(), Duration::from_millis(1500));
        assert_eq!(config.session().dimming(), Dimming::default());
        assert_eq!(config.session().transition_steps(), 1);
        assert_eq!(config.session().max_consecutive_failures(), 0);
        assert_eq!(config.sampler(), &SampleConfig::default());
        assert_eq!(config.display(), &DisplayBounds::default());
        assert_eq!(config.frame_source().path(), Path::new("frame.png"));
        assert_eq!(config.log().level(), Level::INFO);
        Ok(())
    }

    #[test]
    fn reads_all_sections() -> Result<(), AppConfigError> {
        let config = from_toml(
            r#"
            [bulb]
            host = "bulb.local"
            port = 4000
            probe_timeout = "250ms"
            probe_retries = 2

            [session]
            interval = "2s"
            dimming = 40
            smooth_transitions = true
            transition_steps = 8
            max_consecutive_failures = 10

            [sampler]
            stride = 20
            brightness_floor = 0.25

            [display]
            x = 1920
            y = 0
            width = 2560
            height = 1440

            [frame_source]
            path = "/tmp/screen.png"

            [log]
            level = "debug"
            "#,
        )?;

        assert_eq!(config.bulb().target(), BulbTarget::new("bulb.local").with_port(4000));
        assert_eq!(config.bulb().probe_timeout(), Duration::from_millis(250));
        assert_eq!(config.bulb().probe_retries(), 2);
        assert_eq!(config.session().interval(), Duration::from_secs(2));
        assert_eq!(config.session().dimming().value(), 40);
        assert_eq!(config.session().transition_steps(), 8);
        assert_eq!(config.session().max_consecutive_failures(), 10);
        assert_eq!(config.sampler().stride.get(), 20);
        assert_eq!(config.sampler().brightness_floor, 0.25);
        assert_eq!(
            config.display(),
            &DisplayBounds {
                x: 1920,
                y: 0,
                width: 2560,
                height: 1440
            }
        );
        assert_eq!(config.frame_source().path(), Path::new("/tmp/screen.png"));
        assert_eq!(config.log().level(), Level::DEBUG);
        Ok(())
    }

    #[test]
    fn requires_a_bulb_host() {
        assert!(matches!(from_toml(""), Err(AppConfigError::Config(_))));
    }

    #[rstest]
    #[case("[session]\ndimming = 5")]
    #[case("[session]\ndimming = 101")]
    #[case("[sampler]\nstride = 0")]
    #[case("[session]\ntransition_steps = 0")]
    #[case("[log]\nlevel = \"loud\"")]
    fn rejects_invalid_values(#[case] section: &str) {
        let result = from_toml(&format!("[bulb]\nhost = \"bulb\"\n{}", section));

        assert!(matches!(result, Err(AppConfigError::Config(_))), "got {:?}", result);
    }

    #[rstest]
    #[case("99ms")]
    #[case("5001ms")]
    fn rejects_intervals_out_of_range(#[case] interval: &str) {
        let result = from_toml(&format!("[bulb]\nhost = \"bulb\"\n[session]\ninterval = \"{}\"", interval));

        assert!(matches!(result, Err(AppConfigError::IntervalOutOfRange(_))), "got {:?}", result);
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.0)]
    fn rejects_brightness_floors_out_of_range(#[case] floor: f32) {
        let result = from_toml(&format!("[bulb]\nhost = \"bulb\"\n[sampler]\nbrightness_floor = {:?}", floor));

        assert!(matches!(result, Err(AppConfigError::BrightnessFloorOutOfRange(_))), "got {:?}", result);
    }
}
