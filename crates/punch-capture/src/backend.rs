//! Recognition backend adapter.

use async_trait::async_trait;
use punch_client::ApiClient;
use punch_models::{Frame, SubmissionMode, SubmissionOutcome};

use crate::gate::Submitter;

#[async_trait]
impl Submitter for ApiClient {
    async fn submit(&self, mode: SubmissionMode, frame: Frame) -> SubmissionOutcome {
        self.recognize(mode, &frame)
            .await
            .map_err(|e| e.into_rejection(mode))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use punch_client::ClientConfig;
    use punch_models::{AccessPolicy, RejectReason};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: String) -> ApiClient {
        let config = ClientConfig {
            base_url,
            ..Default::default()
        };
        ApiClient::new(config, AccessPolicy::default()).unwrap()
    }

    #[tokio::test]
    async fn test_accepted_reply_is_accepted_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/recognize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Welcome Ada",
                "user": {"name": "Ada", "role": "employee"},
                "timestamp": "2024-03-05T09:00:00"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(server.uri())
            .submit(SubmissionMode::In, Frame::jpeg(vec![0xFF, 0xD8]))
            .await;

        let recognition = outcome.into_result().unwrap();
        assert_eq!(recognition.user.name, "Ada");
        assert_eq!(recognition.mode, SubmissionMode::In);
    }

    #[tokio::test]
    async fn test_declined_reply_keeps_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/recognize"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"detail": "Already checked in today"})),
            )
            .mount(&server)
            .await;

        let rejection = client_for(server.uri())
            .submit(SubmissionMode::In, Frame::jpeg(vec![0xFF, 0xD8]))
            .await
            .into_result()
            .unwrap_err();

        assert_eq!(rejection.user_message(), "Already checked in today");
        assert!(matches!(rejection.reason, RejectReason::Declined { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_rejection() {
        let rejection = client_for("http://127.0.0.1:9".to_string())
            .submit(SubmissionMode::Out, Frame::jpeg(vec![0xFF, 0xD8]))
            .await
            .into_result()
            .unwrap_err();

        assert!(matches!(rejection.reason, RejectReason::Transport { .. }));
        assert_eq!(rejection.mode, SubmissionMode::Out);
    }
}
