//! Prompt text for the report generator.
//!
//! The user prompt carries the patient's demographics and history, the
//! headline finding and up to five ranked predictions, then asks for a
//! five-section clinical report.

use crate::models::{Patient, Prediction};

/// Number of ranked predictions listed in the report prompt.
pub const PROMPT_PREDICTION_LIMIT: usize = 5;

pub const REPORT_SYSTEM_PROMPT: &str = "You are a medical AI assistant specialized in analyzing \
chest X-ray results for Acute Respiratory Infections (ARI). Provide detailed, professional \
medical reports.";

/// Build the report request for one analysis.
///
/// `primary` is the finding reported as the headline; `predictions` is the
/// ranked list as returned by the classifier (only the first five are used).
pub fn build_report_prompt(
    patient: &Patient,
    primary: &Prediction,
    predictions: &[Prediction],
) -> String {
    let history = patient
        .medical_history
        .as_deref()
        .unwrap_or("None provided");

    let ranked = predictions
        .iter()
        .take(PROMPT_PREDICTION_LIMIT)
        .map(|p| format!("- {}: {}", p.label, percent(p.score)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Generate a detailed medical report for this chest X-ray analysis:

Patient: {name}
Age: {age}
Gender: {gender}
Medical History: {history}

AI Analysis Results:
- Primary Finding: {finding}
- Confidence: {confidence}

All Predictions:
{ranked}

Provide a comprehensive report including:
1. Summary of findings
2. Interpretation of the AI analysis
3. Potential diagnoses or conditions to consider
4. Recommended next steps or further investigations
5. Important notes for the clinician

Keep the report professional, concise (300-400 words), and suitable for medical documentation."#,
        name = patient.name,
        age = patient.age,
        gender = patient.gender,
        finding = primary.label,
        confidence = percent(primary.score),
    )
}

fn percent(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn patient(history: Option<&str>) -> Patient {
        Patient {
            id: "p1".into(),
            doctor_id: "doc".into(),
            name: "Jane Doe".into(),
            age: 45,
            gender: "F".into(),
            medical_history: history.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn prompt_embeds_demographics_and_finding() {
        let preds = vec![Prediction::new("Pneumonia", 0.8731)];
        let prompt = build_report_prompt(&patient(Some("Smoker")), &preds[0], &preds);

        assert!(prompt.contains("Patient: Jane Doe"));
        assert!(prompt.contains("Age: 45"));
        assert!(prompt.contains("Gender: F"));
        assert!(prompt.contains("Medical History: Smoker"));
        assert!(prompt.contains("- Primary Finding: Pneumonia"));
        assert!(prompt.contains("- Confidence: 87.31%"));
        assert!(prompt.contains("300-400 words"));
    }

    #[test]
    fn missing_history_says_none_provided() {
        let preds = vec![Prediction::new("Normal", 0.65)];
        let prompt = build_report_prompt(&patient(None), &preds[0], &preds);
        assert!(prompt.contains("Medical History: None provided"));
    }

    #[test]
    fn lists_at_most_five_predictions() {
        let preds: Vec<Prediction> = (0..7)
            .map(|i| Prediction::new(&format!("L{i}"), 0.1))
            .collect();
        let prompt = build_report_prompt(&patient(None), &preds[0], &preds);

        assert!(prompt.contains("- L4: 10.00%"));
        assert!(!prompt.contains("- L5:"));
    }

    #[test]
    fn ranked_predictions_are_one_per_line() {
        let preds = vec![
            Prediction::new("Pneumonia", 0.7),
            Prediction::new("Normal", 0.2),
        ];
        let prompt = build_report_prompt(&patient(None), &preds[0], &preds);
        assert!(prompt.contains("All Predictions:\n- Pneumonia: 70.00%\n- Normal: 20.00%\n\n"));
    }

    #[test]
    fn requests_all_five_sections() {
        let preds = vec![Prediction::new("Normal", 0.65)];
        let prompt = build_report_prompt(&patient(None), &preds[0], &preds);
        for section in [
            "1. Summary of findings",
            "2. Interpretation of the AI analysis",
            "3. Potential diagnoses",
            "4. Recommended next steps",
            "5. Important notes for the clinician",
        ] {
            assert!(prompt.contains(section), "missing section: {section}");
        }
    }
}
