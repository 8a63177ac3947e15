use std::io::{Cursor, Read};
use std::thread;
use std::time::{Duration, SystemTime};

use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::TransportError;

/// Issues the HTTP GET for a fully built request URL.
///
/// The body is returned as-is whatever the HTTP status: the service reports
/// failures in the JSON envelope, which the client decodes itself.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>, TransportError>;
}

/// Time source used for pacing.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
}

impl HttpTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("opencage-rs/{}", env!("CARGO_PKG_VERSION")))
                .unwrap_or(HeaderValue::from_static("opencage-rs")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>, TransportError> {
        // Read the whole body here so a connection dropped mid-body surfaces as
        // a transport failure, not a decode failure. The url carries the API
        // key and must not end up in the error.
        let body = self
            .http
            .get(url)
            .send()
            .and_then(|resp| resp.bytes())
            .map_err(reqwest::Error::without_url)?;
        Ok(Box::new(Cursor::new(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;

    use crate::{Client, Error};

    /// Serves one canned HTTP response and hands back the raw request head.
    fn serve_once(status: &str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/geocode/v1/", listener.local_addr().unwrap());
        let status = status.to_string();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            tx.send(read_head(&mut stream)).unwrap();
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        });

        (endpoint, rx)
    }

    fn read_head(stream: &mut TcpStream) -> String {
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        String::from_utf8_lossy(&head).into_owned()
    }

    /// Endpoint on a port nothing listens on.
    fn closed_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/geocode/v1/")
    }

    fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
        let mut out = format!("{err} | {err:?}");
        let mut source = err.source();
        while let Some(e) = source {
            out.push_str(&format!(" | {e} | {e:?}"));
            source = e.source();
        }
        out
    }

    #[test]
    fn sends_user_agent_and_returns_body() {
        let body = r#"{"status": {"code": 200, "message": "OK"}, "results": []}"#;
        let (endpoint, head) = serve_once("200 OK", body);

        let client = Client::new("k").unwrap().with_url(&endpoint).unwrap();
        let result = client.geocode("Leuven", None).unwrap();
        assert!(result.is_success());

        let head = head.recv().unwrap().to_lowercase();
        assert!(head.starts_with("get /geocode/v1/json?q=leuven&key=k "));
        let expected = format!("user-agent: opencage-rs/{}", env!("CARGO_PKG_VERSION"));
        assert!(head.contains(&expected), "{head}");
    }

    #[test]
    fn http_error_status_still_decodes_envelope() {
        let body = r#"{"status": {"code": 402, "message": "quota exceeded"}, "results": []}"#;
        let (endpoint, _head) = serve_once("402 Payment Required", body);

        let client = Client::new("k").unwrap().with_url(&endpoint).unwrap();
        let err = client.geocode("Leuven", None).unwrap_err();
        match err {
            Error::Geocode(e) => {
                assert_eq!(e.code(), 402);
                assert_eq!(e.message(), "quota exceeded");
            }
            other => panic!("expected a geocode error, got {other:?}"),
        }
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let client = Client::new("k")
            .unwrap()
            .with_url(&closed_endpoint())
            .unwrap();
        let err = client.geocode("Leuven", None).unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "{err:?}");
    }

    #[test]
    fn transport_errors_do_not_contain_the_key() {
        let client = Client::new("super-secret-key")
            .unwrap()
            .with_url(&closed_endpoint())
            .unwrap();
        let err = client.geocode("Leuven", None).unwrap_err();
        assert!(matches!(err, Error::Transport(_)));

        let shown = error_chain(&err);
        assert!(!shown.contains("super-secret-key"), "{shown}");
    }
}
