use chat_engine::{
    FailureKind, FeedbackService, FeedbackSubmission, ReqwestFeedbackService, ServiceSettings,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> ReqwestFeedbackService {
    ReqwestFeedbackService::new(ServiceSettings::with_base_url(server.uri())).expect("client")
}

fn submission() -> FeedbackSubmission {
    FeedbackSubmission {
        message_id: "msg_1700000000000_abc1234".to_string(),
        session_id: "session_1700000000000_xyz9876".to_string(),
        query: "¿Horario del registro?".to_string(),
        answer: "<p>De 8 a 14 h.</p>".to_string(),
        is_correct: true,
        rating: Some(4),
        comment: None,
        sources: vec![json!({"title": "Horarios"})],
    }
}

#[tokio::test]
async fn submit_posts_full_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback/"))
        .and(body_json(json!({
            "message_id": "msg_1700000000000_abc1234",
            "session_id": "session_1700000000000_xyz9876",
            "query": "¿Horario del registro?",
            "answer": "<p>De 8 a 14 h.</p>",
            "is_correct": true,
            "rating": 4,
            "comment": null,
            "sources": [{"title": "Horarios"}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    service(&server).submit(&submission()).await.expect("submitted");
}

#[tokio::test]
async fn submit_accepts_non_json_acknowledgement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    assert_eq!(service(&server).submit(&submission()).await, Ok(()));
}

#[tokio::test]
async fn submit_fails_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = service(&server).submit(&submission()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn metrics_requests_day_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feedback/metrics"))
        .and(query_param("days", "30"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"accuracy": 0.82, "total": 50})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = service(&server).metrics(30).await.expect("metrics");
    assert_eq!(report, json!({"accuracy": 0.82, "total": 50}));
}
