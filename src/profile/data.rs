// Profile data and validation
// Holds the distance axis and elevation variants of one survey line

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to read profile file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse profile JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{what} has {actual} samples, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Profile needs at least 2 samples, got {0}")]
    TooShort(usize),

    #[error("Distance is not finite at index {0}")]
    NonFiniteDistance(usize),

    #[error("Distance is not strictly increasing at index {0}")]
    NonIncreasingDistance(usize),
}

/// A bed elevation profile along one survey line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Identifier used in logs and traces (e.g. line id plus survey date)
    #[serde(default)]
    pub id: String,

    /// Distance along the line in metres (`M`), strictly increasing
    pub distance: Vec<f64>,

    /// Raw bed elevation (`Zbed`), may contain NaN for missing samples
    pub elevation: Vec<f64>,

    /// Bed elevation with ripples filtered out (`Zfilt`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered: Option<Vec<f64>>,
}

impl Profile {
    /// Build a profile and validate its distance axis
    pub fn new(
        id: impl Into<String>,
        distance: Vec<f64>,
        elevation: Vec<f64>,
    ) -> Result<Self, ProfileError> {
        let profile = Profile {
            id: id.into(),
            distance,
            elevation,
            filtered: None,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Attach a ripple-filtered elevation series
    pub fn with_filtered(mut self, filtered: Vec<f64>) -> Result<Self, ProfileError> {
        if filtered.len() != self.distance.len() {
            return Err(ProfileError::LengthMismatch {
                what: "filtered elevation",
                expected: self.distance.len(),
                actual: filtered.len(),
            });
        }
        self.filtered = Some(filtered);
        Ok(self)
    }

    /// Parse a profile from JSON and validate it
    pub fn from_json_str(json: &str) -> Result<Self, ProfileError> {
        let profile: Profile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Read a profile from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ProfileError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check lengths and the distance axis
    pub fn validate(&self) -> Result<(), ProfileError> {
        let n = self.distance.len();
        if n < 2 {
            return Err(ProfileError::TooShort(n));
        }

        if self.elevation.len() != n {
            return Err(ProfileError::LengthMismatch {
                what: "elevation",
                expected: n,
                actual: self.elevation.len(),
            });
        }

        if let Some(filtered) = &self.filtered {
            if filtered.len() != n {
                return Err(ProfileError::LengthMismatch {
                    what: "filtered elevation",
                    expected: n,
                    actual: filtered.len(),
                });
            }
        }

        if let Some(i) = self.distance.iter().position(|d| !d.is_finite()) {
            return Err(ProfileError::NonFiniteDistance(i));
        }

        if let Some(i) = self.distance.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ProfileError::NonIncreasingDistance(i + 1));
        }

        Ok(())
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }

    /// Ripple-filtered elevation, or the raw elevation when none was supplied
    pub fn filtered_elevation(&self) -> &[f64] {
        self.filtered.as_deref().unwrap_or(&self.elevation)
    }

    /// Mean distance between consecutive samples (`dM`)
    pub fn mean_spacing(&self) -> Result<f64, ProfileError> {
        let n = self.distance.len();
        if n < 2 {
            return Err(ProfileError::TooShort(n));
        }
        Ok((self.distance[n - 1] - self.distance[0]) / (n - 1) as f64)
    }

    /// Total length of the profile in metres
    pub fn span(&self) -> f64 {
        match (self.distance.first(), self.distance.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}
