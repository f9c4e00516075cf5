//! Rejected request integration tests.

#[cfg(test)]
mod tests {
    use apisig_auth::SignatureMethod;
    use apisig_client::ClientError;
    use apisig_model::ErrorCode;

    use crate::{TestServer, json_body};

    const ACTION_BODY: &[u8] = br#"{"Action":"ping"}"#;

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs()
            .try_into()
            .unwrap()
    }

    fn failure_code<T>(response: apisig_model::ApiResponse<T>) -> ErrorCode {
        match response.into_result() {
            Ok(_) => panic!("request should have been rejected"),
            Err(error) => error.code,
        }
    }

    #[tokio::test]
    async fn test_should_reject_unsigned_request() {
        let server = TestServer::start().await;

        let response = reqwest::get(server.url("/say-hello")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["Code"], 2);
        assert_eq!(json["Message"], "not found Signature");
        assert!(json["Data"].is_null());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_wrong_secret() {
        let server = TestServer::start().await;

        let response = server
            .client_with("ID1", "not-the-secret", SignatureMethod::HmacSha1)
            .say_hello()
            .await
            .unwrap();
        assert_eq!(failure_code(response), ErrorCode::SignatureFailure);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_unknown_secret_id() {
        let server = TestServer::start().await;

        let response = server
            .client_with("ID2", "s3cr3t", SignatureMethod::HmacSha256)
            .say_hello()
            .await
            .unwrap();
        assert_eq!(failure_code(response), ErrorCode::InvalidSecretId);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_stale_timestamp() {
        let server = TestServer::start().await;
        let signed = server
            .signer(SignatureMethod::HmacSha1)
            .sign(
                &reqwest::Method::GET,
                &server.host(),
                "/say-hello",
                None,
                now() - 1_000,
                "1",
            )
            .unwrap();

        let json = json_body(reqwest::get(signed.url("http")).await.unwrap()).await;
        assert_eq!(json["Code"], 5);
        assert_eq!(json["Message"], "signature expire.");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_tampered_body() {
        let server = TestServer::start().await;
        let signed = server
            .signer(SignatureMethod::HmacSha256)
            .sign_now(
                &reqwest::Method::POST,
                &server.host(),
                "/do-something",
                Some(ACTION_BODY),
                "1",
            )
            .unwrap();

        let response = reqwest::Client::new()
            .post(signed.url("http"))
            .header("content-type", "application/json")
            .body(r#"{"Action":"pong"}"#)
            .send()
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["Code"], 7);
        assert_eq!(json["Message"], "Request' Payload Signature verify failed");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_missing_nonce() {
        let server = TestServer::start().await;
        let signed = server
            .signer(SignatureMethod::HmacSha1)
            .sign_now(&reqwest::Method::GET, &server.host(), "/say-hello", None, "99")
            .unwrap();

        let url = signed.url("http").replace("&Nonce=99", "");
        let json = json_body(reqwest::get(url).await.unwrap()).await;
        assert_eq!(json["Code"], 8);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_reject_parameter_inserted_before_signature() {
        let server = TestServer::start().await;
        let signed = server
            .signer(SignatureMethod::HmacSha1)
            .sign_now(&reqwest::Method::GET, &server.host(), "/say-hello", None, "1")
            .unwrap();

        let url = signed
            .url("http")
            .replace("&Signature=", "&Extra=1&Signature=");
        let json = json_body(reqwest::get(url).await.unwrap()).await;
        assert_eq!(json["Code"], 6);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_return_not_found_for_signed_unknown_route() {
        let server = TestServer::start().await;

        let err = server
            .client(SignatureMethod::HmacSha1)
            .get::<serde_json::Value>("/say-goodbye")
            .await
            .unwrap_err();
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert!(body.contains("\"Code\":1"));
            }
            other => panic!("unexpected error: {other}"),
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_verify_unknown_route_before_routing() {
        let server = TestServer::start().await;

        let response = reqwest::get(server.url("/say-goodbye")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(json_body(response).await["Code"], 2);

        server.stop().await;
    }
}
