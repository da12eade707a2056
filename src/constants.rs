/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_OPENAI_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

// Timeouts
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 3;

// Pacing (cosmetic pauses around an exchange)
pub const DEFAULT_ROUTING_DELAY_MS: u64 = 1500;
pub const DEFAULT_HANDOFF_DELAY_MS: u64 = 800;

// UI Configuration
pub const UI_REFRESH_INTERVAL_MS: u64 = 50;
pub const UI_SCROLL_LINES: u16 = 3;
pub const UI_PAGE_SCROLL_LINES: u16 = 10;
pub const EXCHANGE_CHANNEL_CAPACITY: usize = 16;

// Default Model Configuration
pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.4;
pub const DEFAULT_MAX_TOKENS: usize = 2048;

// Input
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;
pub const IMAGE_ATTACHED_MARKER: &str = "[Medical Image Attached]";

pub const DISCLAIMER: &str =
    "AI dapat melakukan kesalahan. Selalu verifikasi rekomendasi klinis dengan profesional medis.";

/// Routing instructions sent with every request
pub const ROUTING_SYSTEM_PROMPT: &str = r#"You are the MediCore hospital coordinator. Read the user's request (and image, if any) and hand it to exactly one specialist agent:

- RME: electronic medical records. Extract structured fields from clinical notes and map diagnoses to ICD-10 codes.
- ADMIN: billing, insurance claims, receivables and finance. Produce aging schedules for receivables.
- CLINICAL: clinical decision support. Assess vitals and symptoms and flag risks.
- EDUCATION: patient education materials written in plain language.
- COORDINATOR: only when the request fits none of the specialists.

Answer in the user's language. Respond with a single JSON object and nothing else:
{
  "agentType": "RME" | "ADMIN" | "CLINICAL" | "EDUCATION" | "COORDINATOR",
  "reasoning": "one short sentence explaining the routing decision",
  "content": "the specialist's answer for the chat transcript",
  "structuredData": {
    "extractedFields": {"patientName": "", "diagnosis": "", "icdCode": "", "plan": ""},
    "agingSchedule": [{"period": "0-30", "amount": 0, "riskLevel": "Low" | "Medium" | "High"}],
    "riskAssessment": [{"metric": "", "value": "", "status": "Normal" | "Warning" | "Critical"}],
    "keyPoints": [{"topic": "", "explanation": "", "icon": ""}]
  }
}
Include in structuredData only the key that belongs to the chosen agent (RME: extractedFields, ADMIN: agingSchedule, CLINICAL: riskAssessment, EDUCATION: keyPoints)."#;
