//! In-process HTTP server answering API tests with canned responses.
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server, StatusCode};

#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

pub struct MockServer {
    pub base_url: String,
    handle: JoinHandle<Vec<CapturedRequest>>,
}

impl MockServer {
    /// Serves one canned (status, body) per incoming request, in order.
    pub fn start(responses: Vec<(u16, &str)>) -> Self {
        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = thread::spawn(move || {
            let mut captured = Vec::new();
            for (status, body) in responses {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(10)) else {
                    break;
                };

                let mut request_body = String::new();
                let _ = request.as_reader().read_to_string(&mut request_body);
                captured.push(CapturedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    authorization: request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string()),
                    body: request_body,
                });

                let response = Response::from_string(body)
                    .with_status_code(StatusCode(status))
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                            .unwrap(),
                    );
                let _ = request.respond(response);
            }
            captured
        });

        Self { base_url, handle }
    }

    /// Waits for the canned responses to be served and returns what was received.
    pub fn requests(self) -> Vec<CapturedRequest> {
        self.handle.join().unwrap()
    }
}
