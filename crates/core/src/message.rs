use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    TryOn,
    ModelSwap,
    ModelVariation,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::TryOn => "try_on",
            ActionKind::ModelSwap => "model_swap",
            ActionKind::ModelVariation => "model_variation",
        }
    }
}

/// Synchronous acknowledgement returned to the action initiator once
/// submissions are accepted. Everything after this arrives as a push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionAck {
    pub kind: ActionKind,
    pub job_ids: Vec<String>,
}

/// One-way push from the job client to the presentation layer. Once jobs
/// are in flight this is the only delivery path for outcomes; control has
/// already returned to the initiator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PushEvent {
    ActionCompleted {
        kind: ActionKind,
        /// Page image the action was invoked on, used to route the
        /// result to the right overlay.
        source_url: String,
        outputs: Vec<String>,
    },
    ActionFailed {
        kind: ActionKind,
        source_url: String,
        error: String,
    },
}

pub struct UiBus {
    pub push_tx: mpsc::Sender<PushEvent>,
    pub push_rx: mpsc::Receiver<PushEvent>,
}

impl UiBus {
    pub fn new(buffer_size: usize) -> Self {
        let (push_tx, push_rx) = mpsc::channel(buffer_size);
        Self { push_tx, push_rx }
    }

    pub fn split(self) -> (mpsc::Sender<PushEvent>, mpsc::Receiver<PushEvent>) {
        (self.push_tx, self.push_rx)
    }
}
