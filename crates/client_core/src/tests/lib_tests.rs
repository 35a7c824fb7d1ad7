use super::*;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use shared::domain::{StudentField, StudentForm};
use std::sync::Arc;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct ServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<serde_json::Value>>>>,
}

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn handle_predict_success(
    State(state): State<ServerState>,
    Json(payload): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send(payload);
    }
    Json(serde_json::json!({
        "Risk_Score": 72,
        "Prediction_Label": "High Risk",
        "Recommendations": ["Meet advisor", "Apply for tutoring"],
    }))
}

async fn spawn_success_server() -> (String, oneshot::Receiver<serde_json::Value>) {
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/predict-and-recommend", post(handle_predict_success))
        .with_state(state);
    (spawn_server(app).await, rx)
}

fn sample_form() -> StudentForm {
    let mut form = StudentForm::default();
    form.set(StudentField::StudentId, "S1");
    form.set(StudentField::AgeAtEnrollment, "20");
    form.set(StudentField::CurricularUnits1stSemGrade, "13.5");
    form
}

#[tokio::test]
async fn success_maps_body_and_preserves_recommendation_order() {
    let (server_url, payload_rx) = spawn_success_server().await;
    let client = PredictionClient::new(&server_url).expect("client");

    let outcome = client
        .predict_and_recommend(&sample_form().to_request())
        .await
        .expect("prediction");

    assert_eq!(outcome.risk_score, 72.0);
    assert_eq!(outcome.prediction_label, "High Risk");
    assert_eq!(
        outcome.recommendations,
        vec!["Meet advisor", "Apply for tutoring"]
    );

    let payload = payload_rx.await.expect("payload");
    let object = payload.as_object().expect("payload object");
    assert_eq!(object["student_id"].as_str(), Some("S1"));
    for (key, value) in object {
        if key != "student_id" {
            assert!(value.is_number(), "{key} should arrive as a number");
        }
    }
    assert_eq!(object["age_at_enrollment"].as_f64(), Some(20.0));
    assert_eq!(object["curricular_units_1st_sem_grade"].as_f64(), Some(13.5));
    // Blank count fields ride along as the documented 0.0.
    assert_eq!(object["curricular_units_2nd_sem_enrolled"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn service_failure_surfaces_detail_verbatim() {
    let app = Router::new().route(
        "/predict-and-recommend",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({"detail": "age_at_enrollment must be >= 17"})),
            )
        }),
    );
    let server_url = spawn_server(app).await;
    let client = PredictionClient::new(&server_url).expect("client");

    let err = client
        .predict_and_recommend(&sample_form().to_request())
        .await
        .expect_err("must fail");
    match err {
        PredictionError::Service { status, detail } => {
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(detail, "age_at_enrollment must be >= 17");
        }
        other => panic!("expected service failure, got {other:?}"),
    }
}

#[tokio::test]
async fn service_failure_without_detail_falls_back_to_unknown_error() {
    let app = Router::new().route(
        "/predict-and-recommend",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let server_url = spawn_server(app).await;
    let client = PredictionClient::new(&server_url).expect("client");

    let err = client
        .predict_and_recommend(&sample_form().to_request())
        .await
        .expect_err("must fail");
    match err {
        PredictionError::Service { status, detail } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(detail, "Unknown error");
        }
        other => panic!("expected service failure, got {other:?}"),
    }
}

#[tokio::test]
async fn success_body_missing_contract_field_is_malformed() {
    let app = Router::new().route(
        "/predict-and-recommend",
        post(|| async {
            Json(serde_json::json!({
                "Prediction_Label": "High Risk",
                "Recommendations": [],
            }))
        }),
    );
    let server_url = spawn_server(app).await;
    let client = PredictionClient::new(&server_url).expect("client");

    let err = client
        .predict_and_recommend(&sample_form().to_request())
        .await
        .expect_err("must fail");
    match err {
        PredictionError::MalformedResponse(message) => {
            assert!(message.contains("Risk_Score"), "unexpected message: {message}");
        }
        other => panic!("expected malformed response, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let app = Router::new().route("/predict-and-recommend", post(|| async { "all good" }));
    let server_url = spawn_server(app).await;
    let client = PredictionClient::new(&server_url).expect("client");

    let err = client
        .predict_and_recommend(&sample_form().to_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, PredictionError::MalformedResponse(_)));
}

#[tokio::test]
async fn connection_refused_maps_to_fixed_transport_message() {
    // Bind and immediately drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = PredictionClient::new(&format!("http://{addr}")).expect("client");
    let err = client
        .predict_and_recommend(&sample_form().to_request())
        .await
        .expect_err("must fail");
    assert!(matches!(err, PredictionError::Transport(_)));
    assert_eq!(err.to_string(), BACKEND_UNREACHABLE_MESSAGE);
}

#[test]
fn base_url_requires_scheme_and_host() {
    assert!(matches!(
        PredictionClient::new("not a url"),
        Err(PredictionError::InvalidBaseUrl { .. })
    ));
    assert!(matches!(
        PredictionClient::new("localhost:8000"),
        Err(PredictionError::InvalidBaseUrl { .. })
    ));
    assert!(PredictionClient::new("http://localhost:8000").is_ok());
    assert!(PredictionClient::new(" http://localhost:8000/ ").is_ok());
}
