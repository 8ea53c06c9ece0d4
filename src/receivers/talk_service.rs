/*!
A receiver for the talk service.

Text is posted as `{ "text": "..." }` and the service answers with per-frame
blend shapes, `{ "blendData": [{ "blendshapes": { ... } }, ...] }`.
*/

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use super::{Receiver, ReceiverError};
use crate::{
    model::{BlendshapeBatch, TalkServiceOptions},
    Logger,
};

#[derive(Debug, Serialize)]
struct TalkRequest<'a> {
    text: &'a str,
}

#[derive(Debug)]
pub struct TalkService {
    logger: Logger,
    url: String,
    client: Client,
}

impl TalkService {
    pub fn create(options: &TalkServiceOptions) -> Result<Self, ReceiverError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(ReceiverError::Client)?;

        Ok(Self::with_client(options.url(), client))
    }

    /// Use a preconfigured client, e.g. one with proxies disabled.
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self {
            logger: Logger::create("TalkService"),
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Receiver for TalkService {
    fn submit_text(&self, text: &str) -> Result<BlendshapeBatch, ReceiverError> {
        self.logger
            .debug(format!("Posting {} bytes of text to {}", text.len(), self.url));

        let response = self
            .client
            .post(&self.url)
            .json(&TalkRequest { text })
            .send()
            .map_err(|error| ReceiverError::Request {
                url: self.url.clone(),
                error,
            })?;

        let status = response.status();
        if !status.is_success() {
            self.logger
                .error(format!("Talk service responded with {status}"));
            return Err(ReceiverError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|error| ReceiverError::Request {
            url: self.url.clone(),
            error,
        })?;
        let batch = BlendshapeBatch::from_slice(&body).map_err(ReceiverError::Decode)?;

        self.logger
            .info(format!("Received {} blend shape frames", batch.len()));

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use std::{net::TcpListener, sync::mpsc};

    use axum::{
        http::{header, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::Value;

    use super::*;

    /// Serve `POST /talk` on a free local port, answering every request with `status`
    /// and `body`. Request bodies are sent back through the returned channel.
    fn serve(status: StatusCode, body: &'static str) -> (String, mpsc::Receiver<Value>) {
        let (url_tx, url_rx) = mpsc::channel();
        let (request_tx, request_rx) = mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                url_tx
                    .send(format!("http://{}/talk", listener.local_addr().unwrap()))
                    .unwrap();

                let app = Router::new().route(
                    "/talk",
                    post(move |Json(request): Json<Value>| {
                        let request_tx = request_tx.clone();
                        async move {
                            let _ = request_tx.send(request);
                            (status, [(header::CONTENT_TYPE, "application/json")], body)
                        }
                    }),
                );

                axum::serve(listener, app).await.unwrap();
            });
        });

        (url_rx.recv().unwrap(), request_rx)
    }

    fn service(url: String) -> TalkService {
        TalkService::with_client(url, Client::builder().no_proxy().build().unwrap())
    }

    #[test]
    fn url_from_options() {
        let service = TalkService::create(&TalkServiceOptions::default()).unwrap();

        assert_eq!(service.url(), "http://localhost:5000/talk");
    }

    #[test]
    fn submit_text() {
        let (url, requests) = serve(
            StatusCode::OK,
            r#"{"blendData": [{"blendshapes": {"jawOpen": 0.5}}, {"blendshapes": {}}]}"#,
        );

        let batch = service(url).submit_text("hello").unwrap();

        assert_eq!(
            requests.recv().unwrap(),
            serde_json::json!({ "text": "hello" })
        );
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.frames[0].blendshapes["jawOpen"], 0.5);
    }

    #[test]
    fn error_status() {
        let (url, _requests) = serve(StatusCode::INTERNAL_SERVER_ERROR, "{}");

        let result = service(url).submit_text("hello");

        assert!(matches!(result, Err(ReceiverError::Status { status: 500, .. })));
    }

    #[test]
    fn undecodable_body() {
        let (url, _requests) = serve(StatusCode::OK, "not json");

        let result = service(url).submit_text("hello");

        assert!(matches!(result, Err(ReceiverError::Decode(_))));
    }

    #[test]
    fn unreachable_host() {
        // Bind then drop to get a port nothing is listening on
        let port = TcpListener::bind(("127.0.0.1", 0))
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let result = service(format!("http://127.0.0.1:{port}/talk")).submit_text("hello");

        assert!(matches!(result, Err(ReceiverError::Request { .. })));
    }
}
