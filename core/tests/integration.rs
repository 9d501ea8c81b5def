//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `Mantle::call` over
//! real HTTP using ureq. The mock speaks plain HTTP, so the test transport
//! downgrades the `https://` servlet URLs before sending.

use mantle_core::{
    HttpClient, HttpRequest, HttpResponse, Mantle, MantleError, RemoteBody, RequestEnvelope,
    Settings, TransportError,
};
use mock_server::{AppState, Site};

/// Executes requests with ureq, returning 4xx/5xx answers as data.
struct PlainHttp {
    agent: ureq::Agent,
}

impl PlainHttp {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        PlainHttp { agent }
    }
}

impl HttpClient for PlainHttp {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.replacen("https://", "http://", 1);
        let mut builder = self.agent.post(&url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder.send(request.body.as_bytes())?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

fn start_server() -> (std::net::SocketAddr, AppState) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let state = AppState::new(Site::default());
    let server_state = state.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, server_state).await
        })
        .unwrap();
    });
    (addr, state)
}

fn settings(addr: std::net::SocketAddr) -> Settings {
    let site = Site::default();
    let mut settings = Settings::new();
    settings.insert("luminate_mantle_host_name".into(), addr.to_string());
    settings.insert("luminate_mantle_short_name".into(), site.short_name);
    settings.insert("luminate_mantle_api_key".into(), site.api_key);
    settings.insert("luminate_mantle_login_name".into(), site.login_name);
    settings.insert("luminate_mantle_login_password".into(), site.login_password);
    settings
}

#[test]
fn mantle_against_mock_server() {
    let (addr, state) = start_server();
    let http = PlainHttp::new();

    // Step 1: structured call succeeds and is decoded.
    let mantle = Mantle::new(settings(addr), &http);
    let body = mantle
        .call(&RequestEnvelope::from_data(
            "servlet=cons&method=getUser&cons_id=42",
        ))
        .unwrap();
    let json = match body {
        RemoteBody::Structured(json) => json,
        other => panic!("expected structured body, got {other:?}"),
    };
    assert_eq!(json["getUserResponse"]["servlet"], "SRConsAPI");
    assert_eq!(json["getUserResponse"]["params"]["cons_id"], "42");

    // Step 2: the mock saw the credentials and the json wire format.
    let calls = state.calls_blocking();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].form["response_format"], "json");
    assert_eq!(calls[0].form["api_key"], "mock-api-key");
    assert_eq!(calls[0].form["v"], "1.0");

    // Step 3: CR servlet with bracketed params.
    let body = mantle
        .call(&RequestEnvelope::from_data(
            "servlet=orgevent&method=getOrgEvent&params%5Bevent_id%5D=9",
        ))
        .unwrap();
    let json = body.into_value();
    assert_eq!(json["getOrgEventResponse"]["servlet"], "CROrgEventAPI");
    assert_eq!(json["getOrgEventResponse"]["params"]["event_id"], "9");

    // Step 4: a passthrough format comes back raw.
    let mut xml_settings = settings(addr);
    xml_settings.insert("response_format".into(), "xml".into());
    let body = Mantle::new(xml_settings, &http)
        .call(&RequestEnvelope::from_data("servlet=content&method=getTagInfo"))
        .unwrap();
    let xml = match body {
        RemoteBody::Raw(xml) => String::from_utf8(xml).unwrap(),
        other => panic!("expected raw body, got {other:?}"),
    };
    assert!(xml.contains(r#"<getTagInfoResponse servlet="CRContentAPI"/>"#));

    // Step 5: wrong API key is a remote error.
    let mut bad_key = settings(addr);
    bad_key.insert("luminate_mantle_api_key".into(), "wrong".into());
    let err = Mantle::new(bad_key, &http)
        .call(&RequestEnvelope::from_data("servlet=cons&method=getUser"))
        .unwrap_err();
    assert!(matches!(err, MantleError::Remote { code: 403 }));

    // Step 6: wrong short name is a 404.
    let mut bad_site = settings(addr);
    bad_site.insert("luminate_mantle_short_name".into(), "elsewhere".into());
    let err = Mantle::new(bad_site, &http)
        .call(&RequestEnvelope::from_data("servlet=cons&method=getUser"))
        .unwrap_err();
    assert!(matches!(err, MantleError::Remote { code: 404 }));

    // Step 7: rejected locally, nothing new reaches the server.
    let before = state.calls_blocking().len();
    let err = mantle
        .call(&RequestEnvelope::from_data("servlet=bogus&method=getUser"))
        .unwrap_err();
    assert!(matches!(err, MantleError::UnknownEndpoint(_)));
    assert_eq!(state.calls_blocking().len(), before);
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let http = PlainHttp::new();
    let err = Mantle::new(settings(addr), &http)
        .call(&RequestEnvelope::from_data("servlet=cons&method=getUser"))
        .unwrap_err();
    assert!(matches!(err, MantleError::Transport(_)));
}
