//! The remote megaverse service.
//!
//! [`Megaverse`] is the contract the drivers depend on: a goal map fetch plus
//! create and delete per object kind. [`Client`] implements it over the
//! challenge HTTP API with blocking `reqwest`.

#[cfg(test)]
pub mod mock;

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::goal::GoalMap;
use crate::model::{Color, Direction, GridObject, Position};

pub const DEFAULT_BASE_URL: &str = "https://challenge.crossmint.io/api";

/// A failed call to the remote service.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("{method} {endpoint} returned {status}: {body}")]
    Status {
        method: Method,
        endpoint: String,
        status: StatusCode,
        body: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RemoteError {
    /// Whether the service throttled the request (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS)
    }
}

pub type Result<T> = core::result::Result<T, RemoteError>;

/// Operations the megaverse service exposes.
pub trait Megaverse {
    fn fetch_goal(&self) -> Result<GoalMap>;

    fn create_polyanet(&self, position: Position) -> Result<()>;
    fn delete_polyanet(&self, position: Position) -> Result<()>;

    fn create_soloon(&self, position: Position, color: Color) -> Result<()>;
    fn delete_soloon(&self, position: Position) -> Result<()>;

    fn create_cometh(&self, position: Position, direction: Direction) -> Result<()>;
    fn delete_cometh(&self, position: Position) -> Result<()>;

    /// Create any object, routed to the call for its kind.
    fn create(&self, object: &GridObject) -> Result<()> {
        match *object {
            GridObject::Polyanet { position } => self.create_polyanet(position),
            GridObject::Soloon { position, color } => self.create_soloon(position, color),
            GridObject::Cometh {
                position,
                direction,
            } => self.create_cometh(position, direction),
        }
    }

    /// Delete any object, routed to the call for its kind.
    fn delete(&self, object: &GridObject) -> Result<()> {
        match *object {
            GridObject::Polyanet { position } => self.delete_polyanet(position),
            GridObject::Soloon { position, .. } => self.delete_soloon(position),
            GridObject::Cometh { position, .. } => self.delete_cometh(position),
        }
    }
}

/// JSON body for every create and delete call.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ObjectRequest<'a> {
    row: u32,
    column: u32,
    candidate_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<Direction>,
}

/// HTTP client for the challenge API, bound to one candidate.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    candidate_id: String,
    http: HttpClient,
}

impl Client {
    /// Build a client. The candidate id is sent with every request.
    pub fn new(base_url: &str, candidate_id: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            candidate_id: candidate_id.to_string(),
            http,
        })
    }

    fn send_object(
        &self,
        method: Method,
        endpoint: &str,
        position: Position,
        color: Option<Color>,
        direction: Option<Direction>,
    ) -> Result<()> {
        let body = ObjectRequest {
            row: position.row,
            column: position.column,
            candidate_id: &self.candidate_id,
            color,
            direction,
        };
        self.send(method, endpoint, Some(&body)).map(drop)
    }

    /// Send a request and return the response body, or a `Status` error for
    /// any non-2xx response.
    fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&ObjectRequest<'_>>,
    ) -> Result<String> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send()?;
        let status = response.status();

        if !status.is_success() {
            // The status decides retries, so a body that can't be read
            // must not turn this into a transport error.
            return Err(RemoteError::Status {
                method,
                endpoint: endpoint.to_string(),
                status,
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(response.text()?)
    }
}

impl Megaverse for Client {
    fn fetch_goal(&self) -> Result<GoalMap> {
        let endpoint = format!("map/{}/goal", self.candidate_id);
        let body = self.send(Method::GET, &endpoint, None)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn create_polyanet(&self, position: Position) -> Result<()> {
        self.send_object(Method::POST, "polyanets", position, None, None)
    }

    fn delete_polyanet(&self, position: Position) -> Result<()> {
        self.send_object(Method::DELETE, "polyanets", position, None, None)
    }

    fn create_soloon(&self, position: Position, color: Color) -> Result<()> {
        self.send_object(Method::POST, "soloons", position, Some(color), None)
    }

    fn delete_soloon(&self, position: Position) -> Result<()> {
        self.send_object(Method::DELETE, "soloons", position, None, None)
    }

    fn create_cometh(&self, position: Position, direction: Direction) -> Result<()> {
        self.send_object(Method::POST, "comeths", position, None, Some(direction))
    }

    fn delete_cometh(&self, position: Position) -> Result<()> {
        self.send_object(Method::DELETE, "comeths", position, None, None)
    }
}
