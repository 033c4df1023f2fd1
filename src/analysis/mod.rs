use crate::cures;
use crate::error::AppError;
use crate::models::classify::ClassificationResult;
use crate::upstream::ClassifierClient;
use log::info;
use std::sync::Arc;

/// Keys the classifier space mixes into its reply that are not disease
/// labels.
const METADATA_KEYS: [&str; 4] = ["error", "warnings", "duration", "average_duration"];

/// Classification flow: one image in, one disease/confidence record out.
pub struct Analyzer {
    classifier: Arc<dyn ClassifierClient>,
}

impl Analyzer {
    pub fn new(classifier: Arc<dyn ClassifierClient>) -> Self {
        Self { classifier }
    }

    /// Issues exactly one call to the classifier and reshapes its
    /// label -> probability map into the advisory record. An empty map
    /// after metadata filtering is a no-data error, never an undefined
    /// label.
    pub async fn analyze(&self, image: &str) -> Result<ClassificationResult, AppError> {
        let raw = self.classifier.classify(image).await?;

        let predictions: Vec<(String, f64)> = raw
            .into_iter()
            .filter(|(key, _)| !METADATA_KEYS.contains(&key.as_str()))
            .collect();

        let (label, prob) = top_prediction(&predictions)
            .ok_or_else(|| AppError::NoData("no prediction data received".to_string()))?;

        let disease = strip_plant_prefix(label);
        info!("analysis verdict: {} ({:.4})", disease, prob);

        Ok(ClassificationResult {
            recommendations: cures::recommendations_for(&disease),
            confidence: format_confidence(prob),
            label: disease,
        })
    }
}

/// Maximum-probability entry, ties broken by first occurrence in upstream
/// order.
pub fn top_prediction(predictions: &[(String, f64)]) -> Option<(&str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for (label, prob) in predictions {
        match best {
            Some((_, best_prob)) if *prob <= best_prob => {}
            _ => best = Some((label.as_str(), *prob)),
        }
    }
    best
}

/// Labels arrive as "<plant>-<disease>"; everything up to and including the
/// first separator goes, the remainder is trimmed. Unseparated labels pass
/// through unchanged.
pub fn strip_plant_prefix(label: &str) -> String {
    match label.split_once('-') {
        Some((_, disease)) => disease.trim().to_string(),
        None => label.trim().to_string(),
    }
}

/// Probability as a percentage string rounded to one decimal.
pub fn format_confidence(prob: f64) -> String {
    format!("{:.1}%", prob * 100.0)
}
