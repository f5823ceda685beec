use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::DEFAULT_FRAME_STEP;
use crate::error::{Error, Result};
use crate::search::Algorithm;
use crate::timeline::DEFAULT_TIME_SCALE;

pub const ALGORITHM_ENV: &str = "ROUTEVIZ_ALGORITHM";
pub const SPEED_ENV: &str = "ROUTEVIZ_SPEED";
pub const RADIUS_ENV: &str = "ROUTEVIZ_RADIUS_KM";
pub const TIME_SCALE_ENV: &str = "ROUTEVIZ_TIME_SCALE";

/// Tunables for a visualization session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub algorithm: Algorithm,
    /// Search steps performed per animation frame.
    pub speed: usize,
    /// Radius of the selection circle around the start point.
    pub radius_km: f64,
    /// Animation time units per degree of segment length.
    pub time_scale: f64,
    /// Playback distance covered by one discrete frame step.
    pub frame_step: f64,
    /// Maximum distance between a picked point and the node it snaps to.
    pub snap_radius_km: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Dijkstra,
            speed: 5,
            radius_km: 4.0,
            time_scale: DEFAULT_TIME_SCALE,
            frame_step: DEFAULT_FRAME_STEP,
            snap_radius_km: 0.5,
        }
    }
}

impl SessionConfig {
    /// Load a JSON configuration file. Missing fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: SessionConfig = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), "loaded session config");
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from the `ROUTEVIZ_*` environment variables.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    pub fn apply_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ALGORITHM_ENV) {
            self.algorithm = value.parse()?;
        }
        if let Some(value) = lookup(SPEED_ENV) {
            self.speed = parse_number(SPEED_ENV, &value)?;
        }
        if let Some(value) = lookup(RADIUS_ENV) {
            self.radius_km = parse_number(RADIUS_ENV, &value)?;
        }
        if let Some(value) = lookup(TIME_SCALE_ENV) {
            self.time_scale = parse_number(TIME_SCALE_ENV, &value)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.speed == 0 {
            return Err(invalid("speed", "must be at least 1"));
        }
        for (key, value) in [
            ("radius_km", self.radius_km),
            ("time_scale", self.time_scale),
            ("frame_step", self.frame_step),
            ("snap_radius_km", self.snap_radius_km),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(key, format!("must be a positive number (got {value})")));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(key, format!("'{value}' is not a valid number")))
}

fn invalid(key: &str, message: impl Into<String>) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        message: message.into(),
    }
}
