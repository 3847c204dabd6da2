//! Request completion plumbing and the reqwest-backed transport.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::error::RoutingError;
use crate::traits::Transport;

/// Sequence number of a routing request, increasing per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

pub(crate) type Completion = (RequestId, Result<Value, RoutingError>);

/// One-shot return path for a dispatched request.
///
/// Dropping a `Reply` without delivering reports
/// [`RoutingError::Disconnected`] for its request.
#[derive(Debug)]
pub struct Reply {
    request: RequestId,
    sender: Option<Sender<Completion>>,
}

impl Reply {
    pub(crate) fn new(request: RequestId, sender: Sender<Completion>) -> Self {
        Self {
            request,
            sender: Some(sender),
        }
    }

    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn deliver(mut self, result: Result<Value, RoutingError>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<Value, RoutingError>) {
        if let Some(sender) = self.sender.take() {
            if sender.send((self.request, result)).is_err() {
                tracing::debug!(request = self.request.0, "router gone, dropping response");
            }
        }
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if self.sender.is_some() {
            self.send(Err(RoutingError::Disconnected));
        }
    }
}

/// Blocking reqwest client, one worker thread per request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, url: String, reply: Reply) {
        let client = self.client.clone();
        let name = format!("route-request-{}", reply.request().0);
        let spawned = thread::Builder::new().name(name).spawn(move || {
            let result = fetch_json(&client, &url);
            reply.deliver(result);
        });

        // On failure the closure, and the reply with it, is dropped.
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "could not spawn request thread");
        }
    }
}

fn fetch_json(client: &reqwest::blocking::Client, url: &str) -> Result<Value, RoutingError> {
    tracing::debug!(url, "sending route request");
    let body = client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.json::<Value>())?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn test_reply_delivers_once() {
        let (tx, rx) = mpsc::channel();
        let reply = Reply::new(RequestId(3), tx);
        reply.deliver(Ok(Value::Null));

        let (request, result) = rx.recv().unwrap();
        assert_eq!(request, RequestId(3));
        assert!(result.is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_reply_reports_disconnect() {
        let (tx, rx) = mpsc::channel();
        drop(Reply::new(RequestId(8), tx));

        let (request, result) = rx.recv().unwrap();
        assert_eq!(request, RequestId(8));
        assert!(matches!(result, Err(RoutingError::Disconnected)));
    }
}
