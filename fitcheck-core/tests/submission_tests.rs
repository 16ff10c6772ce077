// End-to-end submission tests against a mocked webhook

use fitcheck_client::Assessor;
use fitcheck_core::progress::PROGRESS_CAP;
use fitcheck_core::submission::create_event_channel;
use fitcheck_core::{
    ERROR_RESPONSE_HTML, FormState, RequestState, SubmissionEvent, format_response,
    spawn_submission,
};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method},
};

/// Feed events into the form until the submission settles, checking the
/// progress invariants along the way. Returns every percentage observed.
async fn run_to_completion(
    form: &mut FormState,
    rx: &mut fitcheck_core::submission::EventReceiver,
) -> Vec<u8> {
    let mut seen = vec![form.progress().percent()];
    while form.is_in_flight() {
        let event = rx.recv().await.expect("submission ended without settling");
        let revealing = matches!(event, SubmissionEvent::Revealed(_));
        if revealing {
            assert_eq!(form.progress().percent(), 100, "revealed before reaching 100%");
        }
        form.apply(event);
        seen.push(form.progress().percent());
    }
    seen
}

// ============================================================================
// Success path
// ============================================================================

#[tokio::test]
async fn test_submission_posts_normalized_links_and_reveals_html() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json_body()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<h2>Verdict</h2><br><br><br><p>Strong fit</p>")
                .set_delay(Duration::from_millis(700)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut form = FormState::with_links("example.com", "https://acme.io");
    let request = form.begin_submit().unwrap();
    let (tx, mut rx) = create_event_channel();
    let assessor = Assessor::with_endpoint(&mock_server.uri()).unwrap();
    let handle = spawn_submission(assessor, request, tx);

    let seen = run_to_completion(&mut form, &mut rx).await;
    handle.await.unwrap();

    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {:?}", seen);
    assert!(seen.iter().filter(|p| **p != 100).all(|p| *p <= PROGRESS_CAP));
    assert!(seen.contains(&100));

    let body = form.response_body().unwrap();
    assert_eq!(
        format_response(body),
        r#"<h2 style="margin-bottom: 0px;">Verdict</h2><br><p>Strong fit</p>"#
    );
}

fn serde_json_body() -> serde_json::Value {
    serde_json::json!({
        "fundLink": "https://example.com",
        "companyLink": "https://acme.io"
    })
}

// ============================================================================
// Failure path
// ============================================================================

#[tokio::test]
async fn test_server_error_shows_fixed_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<p>internal</p>"))
        .mount(&mock_server)
        .await;

    let mut form = FormState::with_links("a.com", "b.com");
    let request = form.begin_submit().unwrap();
    let (tx, mut rx) = create_event_channel();
    let assessor = Assessor::with_endpoint(&mock_server.uri()).unwrap();
    spawn_submission(assessor, request, tx).await.unwrap();

    run_to_completion(&mut form, &mut rx).await;

    assert!(!form.is_in_flight());
    assert_eq!(
        form.request(),
        &RequestState::Failed(ERROR_RESPONSE_HTML.to_string())
    );
}

#[tokio::test]
async fn test_unreachable_endpoint_shows_fixed_message() {
    // Grab a free port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}/hook", listener.local_addr().unwrap());
    drop(listener);

    let mut form = FormState::with_links("a.com", "b.com");
    let request = form.begin_submit().unwrap();
    let (tx, mut rx) = create_event_channel();
    let assessor = Assessor::with_endpoint(&endpoint).unwrap();
    spawn_submission(assessor, request, tx).await.unwrap();

    run_to_completion(&mut form, &mut rx).await;

    assert_eq!(form.response_body(), Some(ERROR_RESPONSE_HTML));
}

#[tokio::test]
async fn test_dropped_view_stops_submission() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let mut form = FormState::with_links("a.com", "b.com");
    let request = form.begin_submit().unwrap();
    let (tx, rx) = create_event_channel();
    drop(rx);

    let assessor = Assessor::with_endpoint(&mock_server.uri()).unwrap();
    let handle = spawn_submission(assessor, request, tx);

    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("submission kept running after the view was dropped")
        .unwrap();
}
