//! Acquisition over HTTP against a stubbed platform.
//!
//! Exercises the real portal client, cipher and orchestrator together; only
//! the captcha solver is mocked.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use slotgrab_core::{
    orchestrator::{Credentials, SiteTarget},
    testing::{fixtures, MockCaptchaSolver},
    AcquireError, AcquisitionOrchestrator, Nj12320Portal, OrchestratorConfig, PortalCipher,
    SelectionMode,
};

const COOKIE: &str = "JSESSIONID=abc123";

async fn mount_login_flow(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/index_toLogin.do"))
        .respond_with(
            ResponseTemplate::new(200).append_header("Set-Cookie", "JSESSIONID=abc123; Path=/njres"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/authImg.do"))
        .and(header("cookie", COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/indexJson/login.do"))
        .and(query_param("verifyCode", "X1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"flagState":0,"message":"验证码输入不正确！"}"#,
        ))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/indexJson/login.do"))
        .and(query_param("verifyCode", "X2"))
        .and(header("cookie", COOKIE))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"flagState":1,"message":"success"}"#),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn config(base_url: String) -> OrchestratorConfig {
    OrchestratorConfig {
        credentials: Credentials {
            username: "13800000000".to_string(),
            password: "secret".to_string(),
        },
        target: SiteTarget {
            hoscode: fixtures::HOSCODE.to_string(),
            docid: fixtures::DOCID.to_string(),
        },
        mode: SelectionMode::Order,
        date: Some("2024-05-01".to_string()),
        loop_enabled: false,
        interval_ms: 10,
        max_retry: 0,
        captcha_max_attempts: Some(5),
        base_url,
        debug: true,
    }
}

fn orchestrator(server: &MockServer) -> AcquisitionOrchestrator {
    let portal = Nj12320Portal::new(server.uri(), Duration::from_secs(5)).unwrap();
    AcquisitionOrchestrator::new(
        config(server.uri()),
        Arc::new(portal),
        Arc::new(MockCaptchaSolver::with_answers(vec!["X1\n", " X2"])),
        Arc::new(PortalCipher::new().unwrap()),
    )
}

#[tokio::test]
async fn test_full_acquisition_over_http() {
    let server = MockServer::start().await;
    mount_login_flow(&server).await;

    Mock::given(method("GET"))
        .and(path("/reservation/doc_detail.do"))
        .and(query_param("hoscode", fixtures::HOSCODE))
        .and(query_param("docid", fixtures::DOCID))
        .and(header("cookie", COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixtures::schedule_page(&[
            ("2024-05-01", Some("AM1"), Some("PM1")),
            ("2024-05-02", Some("AM2"), None),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/reservationJson/showScheduleTime.do"))
        .and(header("cookie", COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"code":"T1","startHour":"08:00","endHour":"08:30","state":1,"takeTime":"07:50"},
                {"code":"T2","startHour":"08:30","endHour":"09:00","state":0,"takeTime":"08:20"}]"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let outcome = orchestrator(&server).run().await;

    let report = outcome.result.expect("acquisition should succeed");
    assert_eq!(report.date, "2024-05-01");
    let links: Vec<_> = report.links().collect();
    assert_eq!(
        links,
        vec![
            format!("{}/reservation/hos_toConfirm.do?schcode=AM1&hosCfgCode=T1", server.uri()),
            format!("{}/reservation/hos_toConfirm.do?schcode=PM1&hosCfgCode=T1", server.uri()),
        ]
    );
    assert_eq!(outcome.retry.attempts, 1);
}

#[tokio::test]
async fn test_malformed_time_slot_body_fails_attempt() {
    let server = MockServer::start().await;
    mount_login_flow(&server).await;

    Mock::given(method("GET"))
        .and(path("/reservation/doc_detail.do"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fixtures::schedule_page(&[(
            "2024-05-01",
            Some("AM1"),
            None,
        )])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/reservationJson/showScheduleTime.do"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>系统繁忙</html>"))
        .mount(&server)
        .await;

    let outcome = orchestrator(&server).run().await;

    assert!(matches!(outcome.result, Err(AcquireError::Portal(_))));
    assert_eq!(outcome.retry.attempts, 1);
}
