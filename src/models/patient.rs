use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A patient record, owned by exactly one doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub doctor_id: String,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/patients`. Any `doctor_id` in the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub gender: String,
    #[serde(default)]
    pub medical_history: Option<String>,
}

/// Body of `PUT /api/patients/:id`. Absent and null fields are left as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub medical_history: Option<String>,
}

impl Patient {
    pub fn create(doctor_id: &str, input: NewPatient) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            doctor_id: doctor_id.to_string(),
            name: input.name,
            age: input.age,
            gender: input.gender,
            medical_history: input.medical_history,
            created_at: Utc::now(),
        }
    }
}

impl PatientUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.medical_history.is_none()
    }

    /// Merge the supplied fields into `patient`.
    pub fn apply_to(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(age) = self.age {
            patient.age = age;
        }
        if let Some(gender) = self.gender {
            patient.gender = gender;
        }
        if let Some(history) = self.medical_history {
            patient.medical_history = Some(history);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Patient {
        Patient::create(
            "doc@example.com",
            NewPatient {
                name: "Jane Doe".into(),
                age: 45,
                gender: "F".into(),
                medical_history: Some("Asthma".into()),
            },
        )
    }

    #[test]
    fn update_only_touches_supplied_fields() {
        let mut patient = jane();
        let update: PatientUpdate = serde_json::from_str(r#"{"age": 40}"#).unwrap();
        update.apply_to(&mut patient);

        assert_eq!(patient.age, 40);
        assert_eq!(patient.name, "Jane Doe");
        assert_eq!(patient.gender, "F");
        assert_eq!(patient.medical_history.as_deref(), Some("Asthma"));
    }

    #[test]
    fn null_fields_are_ignored() {
        let mut patient = jane();
        let update: PatientUpdate =
            serde_json::from_str(r#"{"name": null, "medical_history": null}"#).unwrap();
        assert!(update.is_empty());
        update.apply_to(&mut patient);
        assert_eq!(patient.medical_history.as_deref(), Some("Asthma"));
    }

    #[test]
    fn create_ignores_client_doctor_id() {
        let input: NewPatient = serde_json::from_str(
            r#"{"name": "Jane Doe", "age": 45, "gender": "F", "doctor_id": "someone-else"}"#,
        )
        .unwrap();
        let patient = Patient::create("doc@example.com", input);
        assert_eq!(patient.doctor_id, "doc@example.com");
        assert!(patient.medical_history.is_none());
    }
}
