use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MissingResponseField;

/// Wire payload for `POST /predict-and-recommend`. Field names match the
/// prediction service contract exactly; only the identifier is text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub student_id: String,
    pub age_at_enrollment: f64,
    pub gender: f64,
    pub scholarship_holder: f64,
    pub curricular_units_1st_sem_enrolled: f64,
    pub curricular_units_1st_sem_approved: f64,
    pub curricular_units_1st_sem_grade: f64,
    pub curricular_units_2nd_sem_enrolled: f64,
    pub curricular_units_2nd_sem_approved: f64,
    pub curricular_units_2nd_sem_grade: f64,
    pub debtor: f64,
    pub tuition_fees_up_to_date: f64,
}

/// Raw success body as the service sends it. Every expected field is optional
/// so a missing one is detected during [`PredictionResponseBody::into_outcome`]
/// instead of failing deserialization with an opaque message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionResponseBody {
    #[serde(rename = "Risk_Score", skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(rename = "Prediction_Label", skip_serializing_if = "Option::is_none")]
    pub prediction_label: Option<String>,
    #[serde(rename = "Recommendations", skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

impl PredictionResponseBody {
    /// Validates that every expected field is present. Recommendation order is
    /// kept exactly as the service returned it.
    pub fn into_outcome(
        self,
        received_at: DateTime<Utc>,
    ) -> Result<PredictionOutcome, MissingResponseField> {
        let risk_score = self.risk_score.ok_or(MissingResponseField::RiskScore)?;
        let prediction_label = self
            .prediction_label
            .ok_or(MissingResponseField::PredictionLabel)?;
        let recommendations = self
            .recommendations
            .ok_or(MissingResponseField::Recommendations)?;
        Ok(PredictionOutcome {
            risk_score,
            prediction_label,
            recommendations,
            received_at,
        })
    }
}

/// Validated prediction result. Held by the result view until the user
/// returns to the form; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    /// Expected range 0-100.
    pub risk_score: f64,
    pub prediction_label: String,
    /// Ordered as returned by the service.
    pub recommendations: Vec<String>,
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_body() -> PredictionResponseBody {
        PredictionResponseBody {
            risk_score: Some(72.0),
            prediction_label: Some("High Risk".to_string()),
            recommendations: Some(vec![
                "Meet advisor".to_string(),
                "Apply for tutoring".to_string(),
            ]),
        }
    }

    #[test]
    fn response_body_accepts_the_service_field_names() {
        let body: PredictionResponseBody = serde_json::from_str(
            r#"{"Risk_Score": 72, "Prediction_Label": "High Risk", "Recommendations": ["Meet advisor", "Apply for tutoring"]}"#,
        )
        .expect("decode");
        let outcome = body.into_outcome(Utc::now()).expect("complete body");
        assert_eq!(outcome.risk_score, 72.0);
        assert_eq!(outcome.prediction_label, "High Risk");
        assert_eq!(
            outcome.recommendations,
            vec!["Meet advisor", "Apply for tutoring"]
        );
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let mut body = full_body();
        body.risk_score = None;
        assert_eq!(
            body.into_outcome(Utc::now()),
            Err(MissingResponseField::RiskScore)
        );

        let mut body = full_body();
        body.prediction_label = None;
        assert_eq!(
            body.into_outcome(Utc::now()),
            Err(MissingResponseField::PredictionLabel)
        );

        let mut body = full_body();
        body.recommendations = None;
        assert_eq!(
            body.into_outcome(Utc::now()),
            Err(MissingResponseField::Recommendations)
        );
    }

    #[test]
    fn recommendation_order_is_preserved() {
        let outcome = full_body().into_outcome(Utc::now()).expect("complete body");
        assert_eq!(outcome.recommendations[0], "Meet advisor");
        assert_eq!(outcome.recommendations[1], "Apply for tutoring");
    }
}
