//! Scripted oracle for deterministic testing

use crate::OracleError;
use scrivener_domain::{Oracle, OracleReply, OracleRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A scripted reply or a scripted failure
enum Scripted {
    Reply(OracleReply),
    Error(String),
}

/// Mock oracle that plays back scripted replies in order
///
/// Once the script runs out, every further call returns an empty reply
/// with `complete` set, so an engine driving rounds against the mock always
/// terminates. Clones share the same script and call count.
///
/// # Examples
///
/// ```
/// use scrivener_oracle::MockOracle;
/// use scrivener_domain::{catalog, Oracle, OracleReply, OracleRequest};
/// use serde_json::json;
///
/// let oracle = MockOracle::new();
/// oracle.push_reply(OracleReply {
///     items: vec![json!({"description": "cut emissions"})],
///     source_notes: None,
///     complete: false,
/// });
///
/// let request = OracleRequest {
///     schema: catalog::target(),
///     stored_preview: "None.".to_string(),
///     table_context: "None.".to_string(),
///     chunk_text: "text".to_string(),
///     round: 1,
/// };
/// assert_eq!(oracle.propose(&request).unwrap().items.len(), 1);
/// assert!(oracle.propose(&request).unwrap().complete);
/// assert_eq!(oracle.call_count(), 2);
/// ```
#[derive(Clone, Default)]
pub struct MockOracle {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<OracleRequest>>>,
}

impl MockOracle {
    /// Create a mock with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply to be returned by the next unanswered call
    pub fn push_reply(&self, reply: OracleReply) {
        self.script.lock().unwrap().push_back(Scripted::Reply(reply));
    }

    /// Queue a reply carrying candidate items
    pub fn push_items(&self, items: Vec<serde_json::Value>) {
        self.push_reply(OracleReply {
            items,
            source_notes: None,
            complete: false,
        });
    }

    /// Queue a failure for the next unanswered call
    pub fn push_error(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Error(message.into()));
    }

    /// Number of times `propose` has been called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every request received so far, in call order
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Oracle for MockOracle {
    type Error = OracleError;

    fn propose(&self, request: &OracleRequest) -> Result<OracleReply, Self::Error> {
        *self.call_count.lock().unwrap() += 1;
        self.requests.lock().unwrap().push(request.clone());

        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Error(message)) => Err(OracleError::Other(message)),
            None => Ok(OracleReply {
                items: Vec::new(),
                source_notes: None,
                complete: true,
            }),
        }
    }
}
