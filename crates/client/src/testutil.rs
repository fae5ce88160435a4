use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use stylecast_core::error::{Error, Result};

use crate::api::{StatusResponse, TryOnApi};

/// 1x1 transparent PNG, small enough to inline and still decodable by
/// the real transcoder.
pub const TINY_PNG_DATA_URL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

enum StatusScript {
    Response(StatusResponse),
    TransportError,
}

/// Scripted stand-in for the remote API. `run` pops queued results;
/// `status` replays the queued responses for a job id, repeating the
/// last one once the script is exhausted.
pub struct MockApi {
    run_results: Mutex<VecDeque<Result<String>>>,
    run_payloads: Mutex<Vec<Value>>,
    statuses: Mutex<HashMap<String, VecDeque<StatusScript>>>,
    status_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            run_results: Mutex::new(VecDeque::new()),
            run_payloads: Mutex::new(Vec::new()),
            statuses: Mutex::new(HashMap::new()),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn queue_run_ok(&self, id: &str) {
        self.run_results
            .lock()
            .unwrap()
            .push_back(Ok(id.to_string()));
    }

    pub fn queue_run_err(&self, error: Error) {
        self.run_results.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_status(&self, id: &str, response: StatusResponse) {
        self.statuses
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .push_back(StatusScript::Response(response));
    }

    pub fn queue_status_transport_error(&self, id: &str) {
        self.statuses
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .push_back(StatusScript::TransportError);
    }

    pub fn run_payloads(&self) -> Vec<Value> {
        self.run_payloads.lock().unwrap().clone()
    }

    pub fn status_call_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TryOnApi for MockApi {
    async fn run(&self, payload: &Value) -> Result<String> {
        self.run_payloads.lock().unwrap().push(payload.clone());
        self.run_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Api("unexpected run call".to_string())))
    }

    async fn status(&self, id: &str) -> Result<StatusResponse> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        let queue = statuses
            .get_mut(id)
            .ok_or_else(|| Error::Api(format!("no scripted status for {}", id)))?;
        let script = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            match queue.front() {
                Some(StatusScript::Response(r)) => StatusScript::Response(r.clone()),
                Some(StatusScript::TransportError) => StatusScript::TransportError,
                None => return Err(Error::Api(format!("no scripted status for {}", id))),
            }
        };
        match script {
            StatusScript::Response(response) => Ok(response),
            StatusScript::TransportError => {
                Err(Error::Transport("scripted poll failure".to_string()))
            }
        }
    }
}
