use crate::error::AppError;
use crate::upstream::ClassifierClient;
use async_trait::async_trait;
use log::info;
use serde_json::{json, Map, Value};
use std::time::Duration;

/// Client for the hosted Gradio classifier space. Canonical contract:
/// `POST {base}/api/predict` with `{ "data": [<image>] }`, answered by a
/// JSON object mapping disease label -> probability. Non-numeric values
/// are metadata, not predictions, and are dropped here.
pub struct GradioClassifier {
    http: reqwest::Client,
    base_url: String,
}

impl GradioClassifier {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::from)?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/predict", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ClassifierClient for GradioClassifier {
    async fn classify(&self, image: &str) -> Result<Vec<(String, f64)>, AppError> {
        info!("GradioClassifier::classify() -> {}", self.endpoint());

        let resp = self
            .http
            .post(self.endpoint())
            .json(&json!({ "data": [image] }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(Some(status.as_u16()), body));
        }

        let body: Map<String, Value> = resp.json().await?;
        Ok(collect_predictions(body))
    }
}

/// Keeps upstream insertion order; serde_json's preserve_order feature
/// makes the Map order-stable, which the tie-break in analysis relies on.
fn collect_predictions(body: Map<String, Value>) -> Vec<(String, f64)> {
    body.into_iter()
        .filter_map(|(label, value)| value.as_f64().map(|prob| (label, prob)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_numeric_metadata_values() {
        let body: Map<String, Value> = serde_json::from_str(
            r#"{
                "Tomato-Leaf blight": 0.91,
                "error": "none",
                "Tomato-Healthy": 0.09
            }"#,
        )
        .unwrap();

        let predictions = collect_predictions(body);
        assert_eq!(
            predictions,
            vec![
                ("Tomato-Leaf blight".to_string(), 0.91),
                ("Tomato-Healthy".to_string(), 0.09),
            ]
        );
    }

    #[test]
    fn preserves_upstream_ordering() {
        let body: Map<String, Value> =
            serde_json::from_str(r#"{ "Zebra": 0.5, "Apple": 0.5 }"#).unwrap();
        let predictions = collect_predictions(body);
        assert_eq!(predictions[0].0, "Zebra");
    }
}
