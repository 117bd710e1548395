//! The closed set of crops a fitted yield model understands.

use crate::error::YieldError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix shared by every crop indicator column in a feature schema.
pub const CROP_INDICATOR_PREFIX: &str = "Crop_";

/// A crop the predictor was trained on.
///
/// Adding a variant requires retraining the model, since every variant owns
/// one indicator column in the fitted schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Chickpea,
    Cotton,
    Maize,
    Rice,
}

impl CropType {
    /// Every crop, in indicator column order.
    pub const ALL: [CropType; 4] = [
        CropType::Chickpea,
        CropType::Cotton,
        CropType::Maize,
        CropType::Rice,
    ];

    /// Lowercase identifier, as used in indicator column names.
    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Chickpea => "chickpea",
            CropType::Cotton => "cotton",
            CropType::Maize => "maize",
            CropType::Rice => "rice",
        }
    }

    /// Capitalized form for titles.
    pub fn title(&self) -> &'static str {
        match self {
            CropType::Chickpea => "Chickpea",
            CropType::Cotton => "Cotton",
            CropType::Maize => "Maize",
            CropType::Rice => "Rice",
        }
    }

    /// Name of this crop's indicator column, e.g. `Crop_maize`.
    pub fn indicator_column(&self) -> String {
        format!("{CROP_INDICATOR_PREFIX}{}", self.as_str())
    }

    /// Case-insensitive comparison against a stored crop label.
    pub fn matches_label(&self, label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(self.as_str())
    }

    /// Resolve an indicator column name back to its crop, if it names one.
    pub fn from_indicator_column(column: &str) -> Option<CropType> {
        let id = column.strip_prefix(CROP_INDICATOR_PREFIX)?;
        CropType::ALL.into_iter().find(|c| c.as_str() == id)
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CropType {
    type Err = YieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CropType::ALL
            .into_iter()
            .find(|c| c.matches_label(s))
            .ok_or_else(|| {
                let known: Vec<&str> = CropType::ALL.iter().map(|c| c.as_str()).collect();
                YieldError::encoding(format!(
                    "unknown crop '{}' (expected one of: {})",
                    s.trim(),
                    known.join(", ")
                ))
            })
    }
}
