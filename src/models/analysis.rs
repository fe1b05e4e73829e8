use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::patient::Patient;

/// Maximum number of ranked predictions kept on an analysis.
pub const MAX_STORED_PREDICTIONS: usize = 5;

/// One label/score pair from the classification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

impl Prediction {
    pub fn new(label: &str, score: f64) -> Self {
        Self {
            label: label.to_string(),
            score,
        }
    }
}

/// A completed X-ray analysis. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: String,
    pub doctor_id: String,
    pub patient_id: String,
    /// Base64 of the normalized 224x224 JPEG.
    pub image_data: String,
    pub prediction: String,
    pub confidence: f64,
    pub all_predictions: Vec<Prediction>,
    pub report: String,
    pub created_at: DateTime<Utc>,
}

impl Analysis {
    /// Build a new analysis. `primary` supplies prediction/confidence and
    /// `predictions` is cut down to [`MAX_STORED_PREDICTIONS`].
    pub fn new(
        doctor_id: &str,
        patient_id: &str,
        image_data: String,
        primary: &Prediction,
        mut predictions: Vec<Prediction>,
        report: String,
    ) -> Self {
        predictions.truncate(MAX_STORED_PREDICTIONS);
        Self {
            id: Uuid::new_v4().to_string(),
            doctor_id: doctor_id.to_string(),
            patient_id: patient_id.to_string(),
            image_data,
            prediction: primary.label.clone(),
            confidence: primary.score,
            all_predictions: predictions,
            report,
            created_at: Utc::now(),
        }
    }
}

/// Analysis row for list views: no image payload, patient name joined in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisListItem {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub prediction: String,
    pub confidence: f64,
    pub report: String,
    pub created_at: DateTime<Utc>,
}

/// Demographic snapshot embedded in analysis detail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSnapshot {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub gender: String,
}

impl From<&Patient> for PatientSnapshot {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.name.clone(),
            age: patient.age,
            gender: patient.gender.clone(),
        }
    }
}

/// Full analysis with image, returned by `GET /api/analyses/:id`.
/// `patient` is `None` once the referenced patient has been deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisDetail {
    pub id: String,
    pub patient: Option<PatientSnapshot>,
    pub prediction: String,
    pub confidence: f64,
    pub all_predictions: Vec<Prediction>,
    pub report: String,
    pub image_data: String,
    pub created_at: DateTime<Utc>,
}
