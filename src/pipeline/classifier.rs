//! Image classification service client.
//!
//! The service returns a ranked `[{label, score}]` list. When it cannot be
//! reached, answers with a non-200 status, or returns an unreadable body,
//! the pipeline substitutes a fixed demo list instead of failing. That
//! choice is visible to callers through [`ClassificationOutcome`].

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::models::Prediction;

/// Request timeout for the classification call.
pub const CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(30);

/// Literal stand-in data used whenever the classifier is unavailable.
pub const FALLBACK_PREDICTIONS: &[(&str, f64)] = &[
    ("Normal", 0.65),
    ("Pneumonia", 0.20),
    ("Infiltration", 0.10),
    ("Opacity", 0.05),
];

pub fn fallback_predictions() -> Vec<Prediction> {
    FALLBACK_PREDICTIONS
        .iter()
        .map(|(label, score)| Prediction::new(label, *score))
        .collect()
}

/// Primary prediction: the first entry, or `Unknown` at 0.0 for an empty list.
pub fn primary_prediction(predictions: &[Prediction]) -> Prediction {
    predictions
        .first()
        .cloned()
        .unwrap_or_else(|| Prediction::new("Unknown", 0.0))
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Classifier request timed out after {0}s")]
    Timeout(u64),

    #[error("Classifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed classifier response: {0}")]
    ResponseParsing(String),
}

/// Something that turns encoded image bytes into ranked predictions.
pub trait ImageClassifier: Send + Sync {
    fn classify<'a>(
        &'a self,
        image: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<Prediction>, ClassifierError>>;
}

/// Which branch produced the predictions used for an analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    /// Predictions returned by the live service.
    Live(Vec<Prediction>),
    /// Service unavailable; the fixed fallback list applies.
    Fallback { reason: String },
}

impl ClassificationOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ClassificationOutcome::Fallback { .. })
    }

    pub fn into_predictions(self) -> Vec<Prediction> {
        match self {
            ClassificationOutcome::Live(predictions) => predictions,
            ClassificationOutcome::Fallback { .. } => fallback_predictions(),
        }
    }
}

/// Classify, absorbing every failure into the fallback branch.
pub async fn classify_with_fallback(
    classifier: &dyn ImageClassifier,
    image: &[u8],
) -> ClassificationOutcome {
    match classifier.classify(image).await {
        Ok(predictions) => ClassificationOutcome::Live(predictions),
        Err(e) => {
            tracing::warn!(error = %e, "Classifier unavailable, using fallback predictions");
            ClassificationOutcome::Fallback {
                reason: e.to_string(),
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// HTTP client
// ═══════════════════════════════════════════════════════════

/// Hosted inference endpoint (HuggingFace-compatible) for image classification.
pub struct HttpImageClassifier {
    url: String,
    token: String,
    client: reqwest::Client,
    timeout: Duration,
}

/// Some deployments wrap the list in a batch dimension.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifierResponse {
    Flat(Vec<Prediction>),
    Batched(Vec<Vec<Prediction>>),
}

impl ClassifierResponse {
    fn into_predictions(self) -> Vec<Prediction> {
        match self {
            ClassifierResponse::Flat(predictions) => predictions,
            ClassifierResponse::Batched(batches) => {
                batches.into_iter().next().unwrap_or_default()
            }
        }
    }
}

impl HttpImageClassifier {
    pub fn new(url: &str, token: &str) -> Result<Self, ClassifierError> {
        Self::with_timeout(url, token, CLASSIFIER_TIMEOUT)
    }

    pub fn with_timeout(url: &str, token: &str, timeout: Duration) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::HttpClient(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            token: token.to_string(),
            client,
            timeout,
        })
    }

    async fn post_image(&self, image: &[u8]) -> Result<Vec<Prediction>, ClassifierError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout(self.timeout.as_secs())
                } else {
                    ClassifierError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ClassifierResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::ResponseParsing(e.to_string()))?;

        Ok(parsed.into_predictions())
    }
}

impl ImageClassifier for HttpImageClassifier {
    fn classify<'a>(
        &'a self,
        image: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<Prediction>, ClassifierError>> {
        Box::pin(self.post_image(image))
    }
}

/// Mock classifier for testing: returns a configured list or fails.
#[cfg(test)]
pub(crate) struct MockClassifier {
    result: Result<Vec<Prediction>, String>,
}

#[cfg(test)]
impl MockClassifier {
    pub fn returning(predictions: Vec<Prediction>) -> Self {
        Self {
            result: Ok(predictions),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
        }
    }
}

#[cfg(test)]
impl ImageClassifier for MockClassifier {
    fn classify<'a>(
        &'a self,
        _image: &'a [u8],
    ) -> BoxFuture<'a, Result<Vec<Prediction>, ClassifierError>> {
        let result = self
            .result
            .clone()
            .map_err(ClassifierError::HttpClient);
        Box::pin(async move { result })
    }
}
