//! Panel regression model: predicted panel-amperage classes and how they
//! map onto a single amperage.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use super::rounding::standard_panel_amp;
use crate::building::record::{BuildingRecord, CHARACTERISTIC_PREFIX};
use crate::error::{PanelError, Result};

/// Lower bound of the open-ended top class (A).
pub const TOP_BAND_FLOOR_AMP: f64 = 201.0;
/// Representative amperage of the "101-199" class.
pub const MID_BAND_AMP: f64 = 150.0;

/// A predicted panel-amperage class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelClass {
    /// A specific rating, e.g. `"100"` or `"200"`.
    Amps(u32),
    /// `"101-199"`.
    Band101To199,
    /// `"200+"`.
    Band200Plus,
}

impl FromStr for PanelClass {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "101-199" => Ok(Self::Band101To199),
            "200+" => Ok(Self::Band200Plus),
            other => other
                .parse()
                .map(Self::Amps)
                .map_err(|_| PanelError::Model(format!("unsupported panel class \"{other}\""))),
        }
    }
}

impl fmt::Display for PanelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amps(amp) => write!(f, "{amp}"),
            Self::Band101To199 => f.write_str("101-199"),
            Self::Band200Plus => f.write_str("200+"),
        }
    }
}

/// Representative amperage of a predicted class.
///
/// The top class is open-ended: it resolves to the standard size covering
/// `max(201, peak_amp, nec_amp)`, so the other two estimates act as a floor.
/// Unknown estimates are left out of the max.
pub fn class_amp(class: PanelClass, peak_amp: Option<f64>, nec_amp: Option<f64>) -> Option<f64> {
    match class {
        PanelClass::Amps(amp) => Some(f64::from(amp)),
        PanelClass::Band101To199 => Some(MID_BAND_AMP),
        PanelClass::Band200Plus => {
            let floor = [peak_amp, nec_amp]
                .into_iter()
                .flatten()
                .fold(TOP_BAND_FLOOR_AMP, f64::max);
            standard_panel_amp(Some(floor))
        }
    }
}

/// A trained model predicting a building's panel-amperage class.
pub trait PanelModel {
    fn predict(&self, record: &BuildingRecord) -> PanelClass;
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelFile {
    classes: Vec<String>,
    intercepts: Vec<f64>,
    #[serde(default)]
    categorical: Vec<CategoricalFeature>,
    #[serde(default)]
    numeric: Vec<NumericFeature>,
}

/// One-hot weights of a characteristic: level -> per-class weights.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoricalFeature {
    characteristic: String,
    levels: BTreeMap<String, Vec<f64>>,
}

/// Standardized numeric feature: `(x - mean) / scale` times per-class weights.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct NumericFeature {
    column: String,
    weights: Vec<f64>,
    #[serde(default)]
    mean: f64,
    #[serde(default = "unit_scale")]
    scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

/// Multinomial logistic panel model loaded from JSON.
///
/// ```json
/// {
///   "classes": ["100", "101-199", "200", "200+"],
///   "intercepts": [0.2, 0.5, 0.1, -0.4],
///   "categorical": [
///     {"characteristic": "vintage", "levels": {"<1940": [0.9, 0.1, -0.3, -0.7]}}
///   ],
///   "numeric": [
///     {"column": "qoi_report.qoi_peak_magnitude_use_kw", "weights": [-0.5, 0.0, 0.2, 0.3],
///      "mean": 5.0, "scale": 2.0}
///   ]
/// }
/// ```
///
/// Characteristics a record lacks contribute nothing; a missing numeric
/// value counts as the feature mean.
#[derive(Debug, Clone)]
pub struct LogisticPanelModel {
    classes: Vec<PanelClass>,
    intercepts: Vec<f64>,
    categorical: Vec<CategoricalFeature>,
    numeric: Vec<NumericFeature>,
}

impl LogisticPanelModel {
    /// Loads a model file.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::Io` if the file cannot be read and
    /// `PanelError::Model` if it is not a consistent model.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| PanelError::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// Parses a model from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `PanelError::Model` on malformed JSON, unknown class labels,
    /// or weight vectors whose length differs from the class count.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let file: ModelFile =
            serde_json::from_str(s).map_err(|e| PanelError::Model(e.to_string()))?;

        if file.classes.is_empty() {
            return Err(PanelError::Model("model has no classes".to_string()));
        }
        let classes = file
            .classes
            .iter()
            .map(|c| c.parse())
            .collect::<Result<Vec<PanelClass>>>()?;

        let n = classes.len();
        let check = |what: &str, len: usize| {
            if len == n {
                Ok(())
            } else {
                Err(PanelError::Model(format!(
                    "{what} has {len} weights, expected {n}"
                )))
            }
        };
        check("intercepts", file.intercepts.len())?;
        for feature in &file.categorical {
            for (level, weights) in &feature.levels {
                check(&format!("{}={level}", feature.characteristic), weights.len())?;
            }
        }
        for feature in &file.numeric {
            check(&feature.column, feature.weights.len())?;
            if feature.scale == 0.0 {
                return Err(PanelError::Model(format!("{} has zero scale", feature.column)));
            }
        }

        Ok(Self {
            classes,
            intercepts: file.intercepts,
            categorical: file.categorical,
            numeric: file.numeric,
        })
    }

    pub fn classes(&self) -> &[PanelClass] {
        &self.classes
    }

    /// Linear score of every class, in class order.
    pub fn scores(&self, record: &BuildingRecord) -> Vec<f64> {
        let mut scores = self.intercepts.clone();
        for feature in &self.categorical {
            let weights = record
                .characteristic(&feature.characteristic)
                .and_then(|level| feature.levels.get(level));
            if let Some(weights) = weights {
                add_scaled(&mut scores, weights, 1.0);
            }
        }
        for feature in &self.numeric {
            if let Some(x) = numeric_feature(record, &feature.column) {
                add_scaled(&mut scores, &feature.weights, (x - feature.mean) / feature.scale);
            }
        }
        scores
    }

    /// Class probabilities (softmax of the scores), in class order.
    pub fn predict_proba(&self, record: &BuildingRecord) -> Vec<(PanelClass, f64)> {
        let scores = self.scores(record);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        self.classes
            .iter()
            .copied()
            .zip(exp.into_iter().map(|e| e / total))
            .collect()
    }
}

impl PanelModel for LogisticPanelModel {
    fn predict(&self, record: &BuildingRecord) -> PanelClass {
        let scores = self.scores(record);
        let best = scores
            .iter()
            .enumerate()
            .fold(0, |best, (i, s)| if *s > scores[best] { i } else { best });
        self.classes[best]
    }
}

fn add_scaled(scores: &mut [f64], weights: &[f64], factor: f64) {
    for (score, w) in scores.iter_mut().zip(weights) {
        *score += w * factor;
    }
}

fn numeric_feature(record: &BuildingRecord, column: &str) -> Option<f64> {
    match column.strip_prefix(CHARACTERISTIC_PREFIX) {
        Some(name) => record.characteristic(name)?.trim().parse().ok(),
        None => record.number(column),
    }
}
