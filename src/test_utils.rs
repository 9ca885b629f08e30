// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// One request observed by the mock, for assertions on writes.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// A mock HTTP service that returns predefined responses based on request
/// method and path, and records every request it sees.
///
/// Unmatched GETs answer 404. Unmatched PUT/POST echo their request body,
/// which satisfies the kube client's expectation of getting the stored
/// object back. Unmatched DELETEs answer a success `Status`.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// All requests seen so far
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests of one method seen so far
    pub fn recorded_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.recorded()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body_bytes = req.into_body().collect().await?.to_bytes();
            let body = String::from_utf8_lossy(&body_bytes).to_string();
            requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path,
                body: body.clone(),
            });

            let (status, payload) = match response {
                Some(resp) => resp,
                None => match method.as_str() {
                    // Echo writes back, as the API server would
                    "PUT" => (200, body),
                    "POST" => (201, body),
                    "DELETE" => (
                        200,
                        r#"{"kind":"Status","apiVersion":"v1","metadata":{},"status":"Success"}"#
                            .to_string(),
                    ),
                    _ => (
                        404,
                        r#"{"kind":"Status","apiVersion":"v1","status":"Failure","message":"not found","reason":"NotFound","code":404}"#
                            .to_string(),
                    ),
                },
            };

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(payload.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a list response wrapping pre-rendered item JSON
pub fn list_json(kind: &str, items: &[String]) -> String {
    format!(
        r#"{{"apiVersion":"v1","kind":"{}","metadata":{{"resourceVersion":"1"}},"items":[{}]}}"#,
        kind,
        items.join(",")
    )
}

/// Create a KKP Cluster object JSON
pub fn cluster_json(id: &str, name: &str, project_id: Option<&str>) -> String {
    let labels = match project_id {
        Some(p) => serde_json::json!({ "project-id": p }),
        None => serde_json::json!({}),
    };
    serde_json::json!({
        "apiVersion": "kubermatic.k8c.io/v1",
        "kind": "Cluster",
        "metadata": { "name": id, "labels": labels },
        "spec": { "humanReadableName": name }
    })
    .to_string()
}

/// Create a KKP Project object JSON
pub fn project_json(id: &str, name: &str) -> String {
    serde_json::json!({
        "apiVersion": "kubermatic.k8c.io/v1",
        "kind": "Project",
        "metadata": { "name": id },
        "spec": { "name": name }
    })
    .to_string()
}

/// Create a Secret object JSON with base64 encoded data values
pub fn secret_json(name: &str, namespace: &str, data: &[(&str, &[u8])]) -> String {
    secret_json_full(name, namespace, &[], &[], data)
}

/// Create a Secret object JSON with labels, annotations and data
pub fn secret_json_full(
    name: &str,
    namespace: &str,
    labels: &[(&str, &str)],
    annotations: &[(&str, &str)],
    data: &[(&str, &[u8])],
) -> String {
    let labels: serde_json::Map<String, serde_json::Value> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
        .collect();
    let annotations: serde_json::Map<String, serde_json::Value> = annotations
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
        .collect();
    let data: serde_json::Map<String, serde_json::Value> = data
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(BASE64.encode(v))))
        .collect();
    serde_json::json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": labels,
            "annotations": annotations
        },
        "data": data,
        "type": "Opaque"
    })
    .to_string()
}
