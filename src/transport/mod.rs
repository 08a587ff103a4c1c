//! HTTP transport abstraction
//!
//! Every remote call made by the client goes through a [`Transport`]. The
//! production implementation is [`ReqwestTransport`]; tests substitute a
//! scripted transport so session, polling and wager logic can be exercised
//! without a network.

pub mod http;

pub use http::ReqwestTransport;

use crate::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;

/// HTTP method subset used by the site API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// A single outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub json: Option<Value>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Create a request with no query, headers or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            json: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    /// Append a query parameter
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Set a header, replacing any previous value with the same name
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Attach `authorization: Bearer <token>`
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header("authorization", format!("Bearer {}", token))
    }

    /// Attach the `referer` header some anti-bot layers key on
    pub fn with_referer(self, referer: impl Into<String>) -> Self {
        self.with_header("referer", referer)
    }

    /// Serialize a JSON body
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.json = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Override the transport timeout for this request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Look up a query parameter value
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Response returned by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Convenience constructor for JSON bodies
    pub fn json_body(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// A response is "truthy" when its status is below 400
    pub fn is_truthy(&self) -> bool {
        self.status < 400
    }

    /// Whether the upstream answered 502 Bad Gateway
    pub fn is_bad_gateway(&self) -> bool {
        self.status == 502
    }

    /// Decode the body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Body as a JSON value; non-JSON bodies become a string, empty bodies null
    pub fn json_value(&self) -> Value {
        if self.body.trim().is_empty() {
            return Value::Null;
        }
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

/// Issues HTTP requests on behalf of the client
///
/// A transport failure (connection refused, timeout) is an `Err`; any
/// response from the server, whatever its status, is an `Ok`.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for unit tests

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    type Reply = std::result::Result<HttpResponse, String>;

    /// Matches requests by method and URL substring, replaying queued replies
    #[derive(Debug, Default)]
    pub struct ScriptedTransport {
        routes: Mutex<Vec<(Method, String, VecDeque<Reply>)>>,
        log: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a reply; the last reply of a route repeats once the queue drains
        pub fn on(&self, method: Method, url_part: &str, status: u16, body: Value) -> &Self {
            self.push(method, url_part, Ok(HttpResponse::json_body(status, &body)))
        }

        /// Queue a transport failure
        pub fn fail(&self, method: Method, url_part: &str) -> &Self {
            self.push(method, url_part, Err("connection refused".to_string()))
        }

        fn push(&self, method: Method, url_part: &str, reply: Reply) -> &Self {
            let mut routes = self.routes.lock().unwrap();
            match routes
                .iter_mut()
                .find(|(m, part, _)| *m == method && part == url_part)
            {
                Some((_, _, queue)) => queue.push_back(reply),
                None => routes.push((method, url_part.to_string(), VecDeque::from([reply]))),
            }
            self
        }

        /// Every request sent so far
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.log.lock().unwrap().clone()
        }

        /// Number of requests whose URL contains `url_part`
        pub fn count(&self, url_part: &str) -> usize {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|request| request.url.contains(url_part))
                .count()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.log.lock().unwrap().push(request.clone());
            let mut routes = self.routes.lock().unwrap();
            let route = routes
                .iter_mut()
                .find(|(method, part, _)| *method == request.method && request.url.contains(part));
            let reply = match route {
                Some((_, _, queue)) if queue.len() > 1 => queue.pop_front(),
                Some((_, _, queue)) => queue.front().cloned(),
                None => None,
            };
            match reply {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(crate::Error::transport(message)),
                None => Ok(HttpResponse::new(404, "")),
            }
        }
    }
}
