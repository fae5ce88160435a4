use tracing::debug;

use stylecast_core::message::{ActionKind, PushEvent};

use crate::carousel::Carousel;

/// Loading view: the reference images and the page image side by side,
/// with the in-flight job count.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingView {
    pub source_url: String,
    /// At most four thumbnails are rendered.
    pub model_images: Vec<String>,
    pub job_count: usize,
}

impl LoadingView {
    pub fn subtitle(&self) -> String {
        let n = self.model_images.len();
        format!(
            "Processing {} model image{}",
            n,
            if n == 1 { "" } else { "s" }
        )
    }
}

#[derive(Debug, Clone)]
pub enum ModalState {
    Hidden,
    Loading(LoadingView),
    Results(Carousel),
    Error(String),
}

/// Replay request produced by the "try again" action: the same action
/// kind against the same source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReplay {
    pub kind: ActionKind,
    pub source_url: String,
}

/// The page's single overlay. Created once and reused; showing a new
/// action replaces the content in place.
#[derive(Debug)]
pub struct Modal {
    state: ModalState,
    current_source_url: Option<String>,
    last_source_url: Option<String>,
    last_kind: Option<ActionKind>,
}

impl Modal {
    pub fn new() -> Self {
        Self {
            state: ModalState::Hidden,
            current_source_url: None,
            last_source_url: None,
            last_kind: None,
        }
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self.state, ModalState::Hidden)
    }

    pub fn show_loading(
        &mut self,
        kind: ActionKind,
        source_url: &str,
        model_images: &[String],
        job_count: usize,
    ) {
        self.current_source_url = Some(source_url.to_string());
        self.last_kind = Some(kind);
        self.state = ModalState::Loading(LoadingView {
            source_url: source_url.to_string(),
            model_images: model_images.iter().take(4).cloned().collect(),
            job_count,
        });
    }

    pub fn show_results(&mut self, outputs: Vec<String>) {
        // The source image rides along as a reference slide, and becomes
        // the "try again" target.
        let reference = self.current_source_url.clone();
        self.last_source_url = self.current_source_url.clone();
        self.state = ModalState::Results(Carousel::new(outputs, reference));
    }

    pub fn show_error(&mut self, message: &str) {
        self.state = ModalState::Error(message.to_string());
    }

    pub fn hide(&mut self) {
        self.state = ModalState::Hidden;
    }

    /// Route a push event into the overlay. Events arriving after the
    /// overlay was dismissed are dropped; their action ran to completion
    /// in the background with nowhere to display.
    pub fn apply_push(&mut self, event: PushEvent) {
        if !self.is_visible() {
            debug!("Push event dropped, overlay dismissed");
            return;
        }
        match event {
            PushEvent::ActionCompleted { outputs, .. } => {
                if outputs.is_empty() {
                    self.show_error("No result received or an unexpected issue occurred.");
                } else {
                    self.show_results(outputs);
                }
            }
            PushEvent::ActionFailed { error, .. } => {
                self.show_error(&format!("Error: {}", error));
            }
        }
    }

    /// "Try again": hide and hand back the last completed action so the
    /// host can re-run it with the same source image.
    pub fn try_again(&mut self) -> Option<ActionReplay> {
        let replay = ActionReplay {
            kind: self.last_kind?,
            source_url: self.last_source_url.clone()?,
        };
        self.hide();
        Some(replay)
    }

    pub fn carousel_mut(&mut self) -> Option<&mut Carousel> {
        match &mut self.state {
            ModalState::Results(carousel) => Some(carousel),
            _ => None,
        }
    }
}

impl Default for Modal {
    fn default() -> Self {
        Self::new()
    }
}
