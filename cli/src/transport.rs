use mantle_core::{HttpClient, HttpRequest, HttpResponse, TransportError};

/// Blocking HTTP client backed by ureq with its default timeouts.
///
/// Status codes are returned as data so the core decides what a non-200
/// answer means. Bodies are read in full, whatever their size, and kept as
/// bytes.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        UreqClient { agent }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.send(request.body.as_bytes())?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mantle_core::{MantleClient, MantleConfig, RemoteBody, ResponseFormat};
    use mock_server::{AppState, Site};
    use std::io::{BufRead, BufReader, Read, Write};

    fn start_server() -> std::net::SocketAddr {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener, AppState::new(Site::default())).await
            })
            .unwrap();
        });
        addr
    }

    /// Answers a single request with `200` and the given body, then closes.
    fn serve_once(content_type: &'static str, body: Vec<u8>) -> std::net::SocketAddr {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 {
                    break;
                }
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 200 OK\r\ncontent-type: {content_type}\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
        });
        addr
    }

    fn config(response_format: ResponseFormat) -> MantleConfig {
        MantleConfig {
            host_name: "h.example".to_string(),
            short_name: "s".to_string(),
            api_key: "key".to_string(),
            login_name: "admin".to_string(),
            login_password: "secret".to_string(),
            api_version: "1.0".to_string(),
            response_format,
        }
    }

    fn form_post(url: String, body: &str) -> HttpRequest {
        HttpRequest {
            url,
            headers: vec![(
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            body: body.to_string(),
        }
    }

    #[test]
    fn post_returns_status_and_body() {
        let addr = start_server();
        let req = form_post(
            format!("http://{addr}/mock/site/SRConsAPI"),
            "api_key=mock-api-key&login_name=apiuser&login_password=apipass\
             &response_format=json&method=getUser",
        );
        let resp = UreqClient::new().post(&req).unwrap();
        assert_eq!(resp.status, 200);
        let json: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(json["getUserResponse"]["servlet"], "SRConsAPI");
    }

    #[test]
    fn error_status_is_not_a_transport_error() {
        let addr = start_server();
        let req = form_post(format!("http://{addr}/mock/site/SRConsAPI"), "api_key=wrong");
        let resp = UreqClient::new().post(&req).unwrap();
        assert_eq!(resp.status, 403);
        assert!(resp.body.is_empty());
    }

    #[test]
    fn body_above_ten_mebibytes_is_read_in_full() {
        let blob = "a".repeat(11_000_000);
        let payload = format!(r#"{{"getUserResponse":{{"blob":"{blob}"}}}}"#);
        let addr = serve_once("application/json", payload.clone().into_bytes());

        let req = form_post(format!("http://{addr}/s/site/SRConsAPI"), "method=getUser");
        let resp = UreqClient::new().post(&req).unwrap();
        assert_eq!(resp.body.len(), payload.len());

        let body = MantleClient::new(config(ResponseFormat::Structured))
            .parse_response(resp)
            .unwrap();
        let json = body.into_value();
        assert_eq!(json["getUserResponse"]["blob"].as_str().map(str::len), Some(11_000_000));
    }

    #[test]
    fn non_utf8_passthrough_body_is_unchanged() {
        let latin1 = b"<ok name=\"caf\xE9\"/>".to_vec();
        let addr = serve_once("text/xml", latin1.clone());

        let req = form_post(format!("http://{addr}/s/site/SRConsAPI"), "method=getUser");
        let resp = UreqClient::new().post(&req).unwrap();
        let body = MantleClient::new(config(ResponseFormat::Passthrough("xml".to_string())))
            .parse_response(resp)
            .unwrap();
        assert_eq!(body, RemoteBody::Raw(latin1));
    }
}
