use std::time::Duration;

use anyhow::Context;
use geo::Point;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use ureq::{Agent, AgentBuilder};

pub const ONEMAP_BASE: &str = "https://www.onemap.gov.sg";

// per-request ceiling so one dead route cannot stall a whole batch
const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Failing to obtain a token is fatal: the batch loop never starts.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth endpoint unreachable: {0}")]
    Unreachable(Box<ureq::Error>),
    #[error("credentials rejected (status {0})")]
    Rejected(u16),
    #[error("malformed auth response: {0}")]
    Malformed(#[from] std::io::Error),
}

/// Routing-service login, scoped to the authentication call rather than held
/// in process-wide state.
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            email: std::env::var("ONEMAP_EMAIL").context("ONEMAP_EMAIL is not set")?,
            password: std::env::var("ONEMAP_PASSWORD").context("ONEMAP_PASSWORD is not set")?,
        })
    }
}

/// Walking-route distance between two coordinates, in metres.
pub trait RouteSource: Sync {
    fn walking_distance(&self, from: Point, to: Point) -> Option<f64>;
}

pub struct OneMap {
    agent: Agent,
    base: String,
    token: String,
}

impl OneMap {
    /// Fetch a bearer token, held for the whole run.
    pub fn authenticate(base: &str, credentials: &Credentials) -> Result<Self, AuthError> {
        let agent = AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        let response = agent
            .post(&format!("{base}/api/auth/post/getToken"))
            .send_json(serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => AuthError::Rejected(code),
                e => AuthError::Unreachable(Box::new(e)),
            })?;

        let token: TokenResponse = response.into_json()?;
        Ok(Self {
            agent,
            base: base.to_string(),
            token: token.access_token,
        })
    }
}

impl RouteSource for OneMap {
    // Any transport, status or decoding failure is a missing distance rather
    // than an abort; one unreachable route must not take down the batch.
    fn walking_distance(&self, from: Point, to: Point) -> Option<f64> {
        let response = self
            .agent
            .get(&format!("{}/api/public/routingsvc/route", self.base))
            .query("start", &coord(from))
            .query("end", &coord(to))
            .query("routeType", "walk")
            .set("Authorization", &self.token)
            .call()
            .map_err(|e| debug!("route lookup failed: {e}"))
            .ok()?;

        total_distance(&response.into_string().ok()?)
    }
}

// the routing service takes "latitude,longitude"
fn coord(point: Point) -> String {
    format!("{},{}", point.y(), point.x())
}

fn total_distance(body: &str) -> Option<f64> {
    let route: RouteResponse = serde_json::from_str(body).ok()?;
    route.route_summary?.total_distance
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct RouteResponse {
    route_summary: Option<RouteSummary>,
}

#[derive(Deserialize)]
struct RouteSummary {
    total_distance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    fn creds() -> Credentials {
        Credentials {
            email: "someone@example.com".into(),
            password: "hunter2".into(),
        }
    }

    /// One-shot HTTP fixture; answers a single request with a canned body.
    fn serve(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                // drain the whole request before answering, or the client may
                // still be writing its body when the socket closes
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request_complete(&request) {
                    match stream.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        base
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some((head, tail)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let content_length = head
            .lines()
            .find_map(|x| {
                x.to_ascii_lowercase()
                    .strip_prefix("content-length:")
                    .map(|x| x.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        tail.len() >= content_length
    }

    fn dead_port() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        base
    }

    fn client(base: String) -> OneMap {
        OneMap {
            agent: AgentBuilder::new().timeout(Duration::from_secs(2)).build(),
            base,
            token: "tok".into(),
        }
    }

    fn pair() -> (Point, Point) {
        (Point::new(103.80, 1.30), Point::new(103.85, 1.35))
    }

    #[test]
    fn authenticate_stores_the_token() {
        let base = serve("200 OK", r#"{"access_token":"secret-token"}"#);
        let onemap = OneMap::authenticate(&base, &creds()).unwrap();
        assert_eq!(onemap.token, "secret-token");
    }

    #[test]
    fn rejected_credentials_are_fatal() {
        let base = serve("401 Unauthorized", r#"{"error":"invalid"}"#);
        let err = OneMap::authenticate(&base, &creds()).unwrap_err();
        assert!(matches!(err, AuthError::Rejected(401)));
    }

    #[test]
    fn unreachable_auth_endpoint_is_fatal() {
        let err = OneMap::authenticate(&dead_port(), &creds()).unwrap_err();
        assert!(matches!(err, AuthError::Unreachable(_)));
    }

    #[test]
    fn token_missing_from_response_is_fatal() {
        let base = serve("200 OK", r#"{"note":"no token here"}"#);
        let err = OneMap::authenticate(&base, &creds()).unwrap_err();
        assert!(matches!(err, AuthError::Malformed(_)));
    }

    #[test]
    fn walking_distance_reads_the_route_summary() {
        let base = serve("200 OK", r#"{"route_summary":{"total_distance":748.0}}"#);
        let (from, to) = pair();
        assert_eq!(client(base).walking_distance(from, to), Some(748.0));
    }

    #[test]
    fn server_error_is_a_missing_distance() {
        let base = serve("500 Internal Server Error", r#"{"error":"boom"}"#);
        let (from, to) = pair();
        assert_eq!(client(base).walking_distance(from, to), None);
    }

    #[test]
    fn unreachable_route_endpoint_is_a_missing_distance() {
        let (from, to) = pair();
        assert_eq!(client(dead_port()).walking_distance(from, to), None);
    }

    #[test]
    fn malformed_route_response_is_a_missing_distance() {
        let base = serve("200 OK", "not json at all");
        let (from, to) = pair();
        assert_eq!(client(base).walking_distance(from, to), None);
    }

    #[test]
    fn partial_route_summary_is_a_missing_distance() {
        assert_eq!(total_distance(r#"{"route_summary":{}}"#), None);
        assert_eq!(total_distance(r#"{}"#), None);
    }
}
