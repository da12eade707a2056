use std::path::Path;
use std::sync::Arc;

use crate::agents::AgentCategory;
use crate::app::Config;
use crate::input::{sample_for, Attachment, SAMPLE_PROMPTS};
use crate::models::AgentBackend;
use crate::session::{Phase, Session, TurnRole};
use crate::visualization::Visualization;

/// Application state
pub struct App {
    /// Transcript, pending input and exchange progress
    pub session: Session,
    /// Backend every exchange is dispatched to
    pub backend: Arc<dyn AgentBackend>,
    /// Loaded configuration
    pub config: Config,
    /// Command-mode buffer (without the leading ':')
    pub command_input: String,
    /// Is the app running?
    pub running: bool,
    /// Scroll offset for chat view, in lines from the bottom
    pub scroll_offset: u16,
    /// Show agent sidebar
    pub show_sidebar: bool,
    /// Show visualization panel
    pub show_panel: bool,
    /// Model name for display
    pub model_name: String,
    /// Status message
    pub status_message: Option<String>,
    /// Show the key and command reference over the chat
    pub show_help: bool,
    /// Frame counter for the typing indicator
    pub tick: u64,
}

impl App {
    /// Create a new app instance
    pub fn new(backend: Arc<dyn AgentBackend>, config: Config) -> Self {
        let model_name = backend.name().to_string();

        Self {
            session: Session::new(),
            backend,
            command_input: String::new(),
            running: true,
            scroll_offset: 0,
            show_sidebar: config.ui.show_sidebar,
            show_panel: config.ui.show_panel,
            model_name,
            status_message: None,
            show_help: false,
            tick: 0,
            config,
        }
    }

    /// Toggle sidebar visibility
    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
    }

    /// Toggle visualization panel visibility
    pub fn toggle_panel(&mut self) {
        self.show_panel = !self.show_panel;
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Scroll chat view up
    pub fn scroll_up(&mut self, amount: u16) {
        let max_scroll = self.transcript_line_estimate().saturating_sub(20);
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max_scroll);
    }

    /// Scroll chat view down
    pub fn scroll_down(&mut self, amount: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    /// Jump back to the newest message
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    // Header, content and a blank separator per turn
    fn transcript_line_estimate(&self) -> u16 {
        self.session
            .transcript()
            .iter()
            .map(|turn| {
                let header = u16::from(turn.role() == TurnRole::Assistant);
                header + turn.content().lines().count().max(1) as u16 + 1
            })
            .fold(0u16, u16::saturating_add)
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Put a sample prompt into the input box.
    ///
    /// Samples are only offered before the first exchange.
    pub fn load_sample(&mut self, label: &str) -> bool {
        if !self.session.transcript().is_empty() {
            self.set_status("Samples are only available before the first message");
            return false;
        }
        match sample_for(label) {
            Some(sample) => {
                self.session.input = sample.text.to_string();
                self.set_status(format!("Loaded {} sample", sample.label));
                true
            }
            None => {
                let labels: Vec<_> = SAMPLE_PROMPTS.iter().map(|s| s.label.to_lowercase()).collect();
                self.set_status(format!("Unknown sample '{}' (try: {})", label, labels.join(", ")));
                false
            }
        }
    }

    /// Read an image from disk and make it the pending attachment
    pub async fn attach_image(&mut self, path: &Path) -> bool {
        match Attachment::from_path(path, self.config.input.max_image_bytes).await {
            Ok(attachment) => {
                let replaced = self.session.attachment().is_some();
                self.set_status(format!(
                    "{} {} ({} bytes)",
                    if replaced { "Replaced image with" } else { "Attached" },
                    attachment.file_name(),
                    attachment.size()
                ));
                self.session.attach(attachment);
                true
            }
            Err(e) => {
                self.set_status(format!("✗ {}", e));
                false
            }
        }
    }

    /// Drop the pending attachment, if any
    pub fn detach_image(&mut self) {
        match self.session.detach() {
            Some(attachment) => self.set_status(format!("Removed {}", attachment.file_name())),
            None => self.set_status("No image attached"),
        }
    }

    /// Specialist the header and sidebar should show as working
    pub fn active_agent(&self) -> AgentCategory {
        self.session.highlighted()
    }

    /// A specialist has been picked but its answer is not shown yet
    pub fn is_coordinating(&self) -> bool {
        matches!(self.session.phase(), Phase::Handoff(_))
    }

    /// Template for the latest answer
    pub fn visualization(&self) -> Option<Visualization> {
        self.session.last_response().and_then(Visualization::for_response)
    }
}

/// Application state for different modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Normal mode - viewing chat
    Normal,
    /// Insert mode - typing input
    Insert,
    /// Command mode - entering commands
    Command,
}
