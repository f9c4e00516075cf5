//! Accepted request integration tests.

#[cfg(test)]
mod tests {
    use apisig_auth::SignatureMethod;
    use apisig_model::ApiResponse;

    use crate::{TestServer, json_body};

    #[tokio::test]
    async fn test_should_answer_ping_without_signature() {
        let server = TestServer::start().await;

        let pong = server.client(SignatureMethod::HmacSha1).ping().await.unwrap();
        assert_eq!(pong.message, "pong by webServer.");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_say_hello_with_either_algorithm() {
        let server = TestServer::start().await;

        for method in [SignatureMethod::HmacSha1, SignatureMethod::HmacSha256] {
            let response = server.client(method).say_hello().await.unwrap();
            assert!(!response.request_id().is_empty());
            let data = response.into_result().unwrap();
            assert_eq!(data.response, "Hello World!", "method {method}");
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_do_something_with_signed_body() {
        let server = TestServer::start().await;

        for method in [SignatureMethod::HmacSha1, SignatureMethod::HmacSha256] {
            let client = server.client(method);

            let data = client.do_something("ping").await.unwrap().into_result().unwrap();
            assert_eq!(data.action, "ping");
            assert_eq!(data.result, "pong");

            let data = client.do_something("jump").await.unwrap().into_result().unwrap();
            assert_eq!(data.result, "Unknown Action jump");
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_sign_values_that_need_escaping() {
        let server = TestServer::start().await;

        let data = server
            .client(SignatureMethod::HmacSha256)
            .do_something("take a/b + c=d")
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(data.result, "Unknown Action take a/b + c=d");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_echo_request_id_in_header_and_envelope() {
        let server = TestServer::start().await;
        let signed = server
            .signer(SignatureMethod::HmacSha1)
            .sign_now(&http_get(), &server.host(), "/say-hello", None, "7")
            .unwrap();

        let response = reqwest::get(signed.url("http")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let header = response
            .headers()
            .get("x-request-id")
            .unwrap()
            .to_str()
            .unwrap()
            .to_owned();
        let json = json_body(response).await;
        assert_eq!(json["Code"], 0);
        assert_eq!(json["RequestID"], header.as_str());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_ignore_parameters_after_signature() {
        let server = TestServer::start().await;
        let signed = server
            .signer(SignatureMethod::HmacSha1)
            .sign_now(&http_get(), &server.host(), "/say-hello", None, "8")
            .unwrap();

        let url = format!("{}&Trailing=1", signed.url("http"));
        let json = json_body(reqwest::get(url).await.unwrap()).await;
        assert_eq!(json["Code"], 0);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_accept_repeated_nonce() {
        let server = TestServer::start().await;
        let signer = server.signer(SignatureMethod::HmacSha1);

        for _ in 0..2 {
            let signed = signer
                .sign_now(&http_get(), &server.host(), "/say-hello", None, "same")
                .unwrap();
            let json = json_body(reqwest::get(signed.url("http")).await.unwrap()).await;
            assert_eq!(json["Code"], 0);
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_should_decode_failure_as_api_response() {
        let server = TestServer::start().await;

        let response = server
            .client(SignatureMethod::HmacSha1)
            .do_something("")
            .await
            .unwrap();
        match response {
            ApiResponse::Failure { error, .. } => {
                assert_eq!(error.code.as_i64(), 1);
                assert_eq!(error.message, "invalid param");
            }
            ApiResponse::Success { .. } => panic!("empty action must be rejected"),
        }

        server.stop().await;
    }

    fn http_get() -> reqwest::Method {
        reqwest::Method::GET
    }
}
