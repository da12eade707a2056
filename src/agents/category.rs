use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// The specialist an answer was routed to, as labelled by the model.
///
/// `Coordinator` doubles as the idle state: it is highlighted before any
/// exchange completes and has no visualization of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentCategory {
    #[default]
    Coordinator,
    /// Rekam Medis Elektronik: medical records extraction
    Rme,
    /// Billing, claims and receivables
    Admin,
    /// Clinical decision support
    Clinical,
    /// Patient education materials
    Education,
}

impl AgentCategory {
    /// The four specialists, in sidebar order
    pub const SPECIALISTS: [AgentCategory; 4] = [
        AgentCategory::Rme,
        AgentCategory::Admin,
        AgentCategory::Clinical,
        AgentCategory::Education,
    ];

    /// Wire label, also used for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Coordinator => "COORDINATOR",
            Self::Rme => "RME",
            Self::Admin => "ADMIN",
            Self::Clinical => "CLINICAL",
            Self::Education => "EDUCATION",
        }
    }

    /// Sidebar card description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Coordinator => "Analysis & Routing",
            Self::Rme => "Medical Records & Compliance",
            Self::Admin => "Billing, Claims & Finance",
            Self::Clinical => "Decision Support System",
            Self::Education => "Patient Communication",
        }
    }

    /// Accent color for cards, badges and bubble headers
    pub fn color(&self) -> Color {
        match self {
            Self::Coordinator => Color::Gray,
            Self::Rme => Color::Blue,
            Self::Admin => Color::Green,
            Self::Clinical => Color::Red,
            Self::Education => Color::Yellow,
        }
    }

    /// Single-glyph marker for compact display
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Coordinator => "◎",
            Self::Rme => "▤",
            Self::Admin => "▦",
            Self::Clinical => "♥",
            Self::Education => "✎",
        }
    }

    pub fn is_specialist(&self) -> bool {
        !matches!(self, Self::Coordinator)
    }

    /// Parse a label, case-insensitively; accepts a few common spellings
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coordinator" => Some(Self::Coordinator),
            "rme" | "records" => Some(Self::Rme),
            "admin" | "billing" => Some(Self::Admin),
            "clinical" => Some(Self::Clinical),
            "education" | "edu" => Some(Self::Education),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
