use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::keypoint::KeypointLayout;
use crate::status::Status;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub classifier: ClassifierConfig,
    pub smoother: SmootherConfig,
    pub alert: AlertConfig,
    pub session: SessionConfig,
    pub source: SourceConfig,
    pub dataset: DatasetConfig,
    pub display: DisplayConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub layout: KeypointLayout,
    /// Keypoints at or below this confidence count as undetected.
    pub confidence_threshold: f32,
    /// How far (in detector units) the nose must sit above the shoulder line.
    pub raise_margin: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            layout: KeypointLayout::BlazePose33,
            confidence_threshold: 0.5,
            raise_margin: 10.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SmootherConfig {
    pub sleep_after_secs: f64,
    /// Forget tracks unseen for this long. Unset keeps them for the whole run.
    pub track_ttl_secs: Option<f64>,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            sleep_after_secs: 120.0,
            track_ttl_secs: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    pub engagement_threshold_pct: f64,
    pub hold_secs: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            engagement_threshold_pct: 60.0,
            hold_secs: 60.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub log_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("data").join("session_log.csv"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Time step assumed for replay lines that carry no timestamp.
    pub frame_interval_secs: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            frame_interval_secs: 1.0 / 30.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    pub label_map: BTreeMap<String, Status>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        let label_map = [
            ("sit", Status::Attentive),
            ("lookup", Status::Attentive),
            ("bow", Status::Inattentive),
            ("down", Status::Sleeping),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self { label_map }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub window_name: String,
    pub fullscreen: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_name: "Classroom Attentiveness Classification".to_string(),
            fullscreen: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        if !(0.0..=1.0).contains(&c.confidence_threshold) {
            return Err(Error::InvalidConfig(format!(
                "classifier.confidence_threshold must be within [0, 1], got {}",
                c.confidence_threshold
            )));
        }

        if !(c.raise_margin >= 0.0) {
            return Err(Error::InvalidConfig(
                "classifier.raise_margin must be non-negative".into(),
            ));
        }

        if !(self.smoother.sleep_after_secs > 0.0) {
            return Err(Error::InvalidConfig(
                "smoother.sleep_after_secs must be positive".into(),
            ));
        }

        if let Some(ttl) = self.smoother.track_ttl_secs {
            if !(ttl > 0.0) {
                return Err(Error::InvalidConfig(
                    "smoother.track_ttl_secs must be positive".into(),
                ));
            }
        }

        if !(0.0..=100.0).contains(&self.alert.engagement_threshold_pct) {
            return Err(Error::InvalidConfig(
                "alert.engagement_threshold_pct must be within [0, 100]".into(),
            ));
        }

        if !(self.alert.hold_secs >= 0.0) {
            return Err(Error::InvalidConfig(
                "alert.hold_secs must be non-negative".into(),
            ));
        }

        if !(self.source.frame_interval_secs > 0.0) {
            return Err(Error::InvalidConfig(
                "source.frame_interval_secs must be positive".into(),
            ));
        }

        Ok(())
    }
}
