use serde::{Deserialize, Serialize};

/// Body of `POST /predict`. The image is either a data URL (inline base64
/// capture from the camera/upload flow) or a plain http(s) URL.
#[derive(Clone, Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

/// Per-request analysis verdict. Ephemeral; superseded by the next request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: String,
    /// Percentage string rounded to one decimal, e.g. "92.3%".
    pub confidence: String,
    pub recommendations: Vec<String>,
}
