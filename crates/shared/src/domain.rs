use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::protocol::PredictionRequest;

/// The closed set of form fields. The form never gains or loses keys at
/// runtime; addressing values through this enum is what enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentField {
    StudentId,
    AgeAtEnrollment,
    Gender,
    ScholarshipHolder,
    CurricularUnits1stSemEnrolled,
    CurricularUnits1stSemApproved,
    CurricularUnits1stSemGrade,
    CurricularUnits2ndSemEnrolled,
    CurricularUnits2ndSemApproved,
    CurricularUnits2ndSemGrade,
    Debtor,
    TuitionFeesUpToDate,
}

impl StudentField {
    /// Display order matches the intake form top to bottom.
    pub const ALL: [StudentField; 12] = [
        StudentField::StudentId,
        StudentField::AgeAtEnrollment,
        StudentField::Gender,
        StudentField::ScholarshipHolder,
        StudentField::CurricularUnits1stSemEnrolled,
        StudentField::CurricularUnits1stSemApproved,
        StudentField::CurricularUnits1stSemGrade,
        StudentField::CurricularUnits2ndSemEnrolled,
        StudentField::CurricularUnits2ndSemApproved,
        StudentField::CurricularUnits2ndSemGrade,
        StudentField::Debtor,
        StudentField::TuitionFeesUpToDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StudentField::StudentId => "Student ID",
            StudentField::AgeAtEnrollment => "Age at enrollment",
            StudentField::Gender => "Gender (0=Male, 1=Female)",
            StudentField::ScholarshipHolder => "Scholarship holder (0=No, 1=Yes)",
            StudentField::CurricularUnits1stSemEnrolled => "Curricular units 1st sem enrolled",
            StudentField::CurricularUnits1stSemApproved => "Curricular units 1st sem approved",
            StudentField::CurricularUnits1stSemGrade => "Curricular units 1st sem grade",
            StudentField::CurricularUnits2ndSemEnrolled => "Curricular units 2nd sem enrolled",
            StudentField::CurricularUnits2ndSemApproved => "Curricular units 2nd sem approved",
            StudentField::CurricularUnits2ndSemGrade => "Curricular units 2nd sem grade",
            StudentField::Debtor => "Debtor (0=No, 1=Yes)",
            StudentField::TuitionFeesUpToDate => "Tuition fees up to date (0=No, 1=Yes)",
        }
    }

    /// The identifier travels as text; everything else is coerced to a number
    /// when the payload is built.
    pub fn is_identifier(self) -> bool {
        matches!(self, StudentField::StudentId)
    }

    /// Binary flags default to "0" instead of blank.
    pub fn is_binary_flag(self) -> bool {
        matches!(
            self,
            StudentField::Gender
                | StudentField::ScholarshipHolder
                | StudentField::Debtor
                | StudentField::TuitionFeesUpToDate
        )
    }
}

/// In-memory form state. Values are kept as raw text exactly as typed; no
/// validation happens on edit. Coercion to numbers is deferred to
/// [`StudentForm::to_request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentForm {
    values: BTreeMap<StudentField, String>,
}

impl Default for StudentForm {
    fn default() -> Self {
        let values = StudentField::ALL
            .into_iter()
            .map(|field| {
                let default = if field.is_binary_flag() { "0" } else { "" };
                (field, default.to_string())
            })
            .collect();
        Self { values }
    }
}

impl StudentForm {
    /// Stores `raw` verbatim. Any text is accepted, including empty and
    /// non-numeric input.
    pub fn set(&mut self, field: StudentField, raw: impl Into<String>) {
        self.values.insert(field, raw.into());
    }

    pub fn get(&self, field: StudentField) -> &str {
        self.values
            .get(&field)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Snapshot of the current values as the wire payload. The identifier is
    /// carried verbatim; every other field goes through [`coerce_numeric`].
    pub fn to_request(&self) -> PredictionRequest {
        PredictionRequest {
            student_id: self.get(StudentField::StudentId).to_string(),
            age_at_enrollment: coerce_numeric(self.get(StudentField::AgeAtEnrollment)),
            gender: coerce_numeric(self.get(StudentField::Gender)),
            scholarship_holder: coerce_numeric(self.get(StudentField::ScholarshipHolder)),
            curricular_units_1st_sem_enrolled: coerce_numeric(
                self.get(StudentField::CurricularUnits1stSemEnrolled),
            ),
            curricular_units_1st_sem_approved: coerce_numeric(
                self.get(StudentField::CurricularUnits1stSemApproved),
            ),
            curricular_units_1st_sem_grade: coerce_numeric(
                self.get(StudentField::CurricularUnits1stSemGrade),
            ),
            curricular_units_2nd_sem_enrolled: coerce_numeric(
                self.get(StudentField::CurricularUnits2ndSemEnrolled),
            ),
            curricular_units_2nd_sem_approved: coerce_numeric(
                self.get(StudentField::CurricularUnits2ndSemApproved),
            ),
            curricular_units_2nd_sem_grade: coerce_numeric(
                self.get(StudentField::CurricularUnits2ndSemGrade),
            ),
            debtor: coerce_numeric(self.get(StudentField::Debtor)),
            tuition_fees_up_to_date: coerce_numeric(self.get(StudentField::TuitionFeesUpToDate)),
        }
    }
}

/// Coercion policy for numeric form fields: the input is trimmed, blank text
/// coerces to `0.0`, and text that fails `f64` parsing also coerces to `0.0`.
/// This never errors; range and semantic validation belong to the prediction
/// service and surface through its 422 responses.
pub fn coerce_numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let form = StudentForm::default();
        for field in StudentField::ALL {
            let expected = if field.is_binary_flag() { "0" } else { "" };
            assert_eq!(form.get(field), expected, "default for {field:?}");
        }
    }

    #[test]
    fn set_is_idempotent_for_a_fixed_field() {
        let mut once = StudentForm::default();
        once.set(StudentField::AgeAtEnrollment, "20");

        let mut twice = StudentForm::default();
        twice.set(StudentField::AgeAtEnrollment, "20");
        twice.set(StudentField::AgeAtEnrollment, "20");

        assert_eq!(once, twice);
    }

    #[test]
    fn edits_accept_arbitrary_text_without_validation() {
        let mut form = StudentForm::default();
        form.set(StudentField::CurricularUnits1stSemGrade, "not a number");
        assert_eq!(
            form.get(StudentField::CurricularUnits1stSemGrade),
            "not a number"
        );
        form.set(StudentField::CurricularUnits1stSemGrade, "");
        assert_eq!(form.get(StudentField::CurricularUnits1stSemGrade), "");
    }

    #[test]
    fn payload_is_numeric_everywhere_except_the_identifier() {
        let mut form = StudentForm::default();
        form.set(StudentField::StudentId, "S1");
        form.set(StudentField::AgeAtEnrollment, "20");
        form.set(StudentField::CurricularUnits1stSemGrade, "13.5");

        let value = serde_json::to_value(form.to_request()).expect("serialize");
        let object = value.as_object().expect("payload object");
        assert_eq!(object.len(), 12);
        for (key, field_value) in object {
            if key == "student_id" {
                assert_eq!(field_value.as_str(), Some("S1"));
            } else {
                assert!(field_value.is_number(), "{key} should be numeric");
            }
        }
        assert_eq!(object["age_at_enrollment"].as_f64(), Some(20.0));
        assert_eq!(
            object["curricular_units_1st_sem_grade"].as_f64(),
            Some(13.5)
        );
    }

    #[test]
    fn blank_fields_coerce_to_zero() {
        let request = StudentForm::default().to_request();
        assert_eq!(request.curricular_units_1st_sem_grade, 0.0);
        assert_eq!(request.age_at_enrollment, 0.0);
    }

    #[test]
    fn coercion_policy_is_deterministic() {
        assert_eq!(coerce_numeric(""), 0.0);
        assert_eq!(coerce_numeric("   "), 0.0);
        assert_eq!(coerce_numeric("20"), 20.0);
        assert_eq!(coerce_numeric(" 13.5 "), 13.5);
        assert_eq!(coerce_numeric("-2"), -2.0);
        assert_eq!(coerce_numeric("twelve"), 0.0);
        assert_eq!(coerce_numeric("12abc"), 0.0);
    }
}
