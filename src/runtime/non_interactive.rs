use anyhow::{bail, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::exchange::run_exchange;
use crate::{
    agents::AgentResponse,
    app::PacingConfig,
    cli::OutputFormat,
    constants::EXCHANGE_CHANNEL_CAPACITY,
    input::Attachment,
    models::AgentBackend,
    session::Session,
    visualization::{format_amount, Visualization, AGING_LEGEND},
};

/// Result of a non-interactive run
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// The prompt that was executed
    pub prompt: String,
    /// The routed answer, if the exchange succeeded
    pub response: Option<AgentResponse>,
    /// Any errors that occurred
    pub errors: Vec<String>,
    /// Metadata about the execution
    pub metadata: ExecutionMetadata,
}

#[derive(Debug, Serialize)]
pub struct ExecutionMetadata {
    /// Model used
    pub model: String,
    /// Name of the attached image, if any
    pub image: Option<String>,
    /// Execution time in milliseconds
    pub duration_ms: u128,
}

/// Non-interactive runner for executing single prompts
pub struct NonInteractiveRunner {
    backend: Arc<dyn AgentBackend>,
    pacing: PacingConfig,
    max_image_bytes: u64,
}

impl NonInteractiveRunner {
    pub fn new(backend: Arc<dyn AgentBackend>, pacing: PacingConfig, max_image_bytes: u64) -> Self {
        Self {
            backend,
            pacing,
            max_image_bytes,
        }
    }

    /// Execute a single prompt (with an optional image) and return the result
    pub async fn execute(&self, prompt: String, image: Option<&Path>) -> Result<NonInteractiveResult> {
        let start_time = std::time::Instant::now();
        let mut session = Session::new();

        if let Some(path) = image {
            session.attach(Attachment::from_path(path, self.max_image_bytes).await?);
        }
        let image_name = session.attachment().map(|a| a.file_name().to_string());

        session.input = prompt.clone();
        let Some(pending) = session.begin_submit() else {
            bail!("Nothing to send: the prompt is empty and no image was given");
        };

        let (tx, mut rx) = mpsc::channel(EXCHANGE_CHANNEL_CAPACITY);
        run_exchange(self.backend.clone(), pending, self.pacing.clone(), tx).await;
        while let Some(event) = rx.recv().await {
            session.apply(event);
        }

        let mut errors = Vec::new();
        if let Some(turn) = session.transcript().last().filter(|t| t.is_error()) {
            errors.push(turn.content().to_string());
        }

        Ok(NonInteractiveResult {
            prompt,
            response: session.last_response().cloned(),
            errors,
            metadata: ExecutionMetadata {
                model: self.backend.name().to_string(),
                image: image_name,
                duration_ms: start_time.elapsed().as_millis(),
            },
        })
    }

    /// Format the result according to the output format
    pub fn format_result(&self, result: &NonInteractiveResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_else(|e| {
                format!("{{\"error\": \"Failed to serialize result: {}\"}}", e)
            }),
            OutputFormat::Text => {
                let mut output = String::new();

                if let Some(response) = &result.response {
                    output.push_str(&format!(
                        "[{} Agent] {}\n\n",
                        response.category, response.reasoning
                    ));
                    output.push_str(&response.content);
                    output.push('\n');

                    if let Some(view) = Visualization::for_response(response) {
                        output.push_str(&format!("\n--- {} ---\n", view.title()));
                        output.push_str(&visualization_lines(&view).join("\n"));
                        output.push('\n');
                    }
                }

                if !result.errors.is_empty() {
                    output.push_str("\n--- Errors ---\n");
                    for error in &result.errors {
                        output.push_str(&format!("• {}\n", error));
                    }
                }

                output
            }
            OutputFormat::Markdown => {
                let mut output = String::new();

                if let Some(response) = &result.response {
                    output.push_str(&format!("## {} Agent\n\n", response.category));
                    if !response.reasoning.is_empty() {
                        output.push_str(&format!("*{}*\n\n", response.reasoning));
                    }
                    output.push_str(&response.content);
                    output.push_str("\n\n");

                    if let Some(view) = Visualization::for_response(response) {
                        output.push_str(&format!("### {}\n\n", view.title()));
                        for line in visualization_lines(&view) {
                            output.push_str(&format!("- {}\n", line));
                        }
                        output.push('\n');
                    }
                }

                if !result.errors.is_empty() {
                    output.push_str("## Errors\n\n");
                    for error in &result.errors {
                        output.push_str(&format!("- {}\n", error));
                    }
                    output.push('\n');
                }

                output.push_str("---\n");
                output.push_str(&format!(
                    "*Model: {} | Duration: {}ms*\n",
                    result.metadata.model, result.metadata.duration_ms
                ));

                output
            }
        }
    }
}

/// Plain-text rows for a visualization
pub fn visualization_lines(view: &Visualization) -> Vec<String> {
    let mut lines = match view {
        Visualization::RecordsExtraction(records) => records
            .rows()
            .iter()
            .map(|(label, value)| format!("{:<12} {}", label, value))
            .collect(),
        Visualization::BillingAging(rows) => {
            let mut lines: Vec<String> = rows
                .iter()
                .map(|r| {
                    format!(
                        "{:<8} {:>12} {}",
                        r.period,
                        format_amount(r.amount),
                        r.risk_level.as_str()
                    )
                })
                .collect();
            lines.push(
                AGING_LEGEND
                    .iter()
                    .map(|(risk, span)| format!("{}: {}", risk, span))
                    .collect::<Vec<_>>()
                    .join(" | "),
            );
            lines
        }
        Visualization::ClinicalVitals(rows) => rows
            .iter()
            .map(|r| format!("{:<20} {:>10} [{}]", r.metric, r.value, r.status.as_str()))
            .collect(),
        Visualization::Education(points) => points
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}: {}", i + 1, p.topic, p.explanation))
            .collect(),
    };

    if let Some((heading, note)) = view.footnote() {
        if heading.is_empty() {
            lines.push(note.to_string());
        } else {
            lines.push(format!("{}: {}", heading, note));
        }
    }

    lines
}

/// Exit status for a finished run
pub fn succeeded(result: &NonInteractiveResult) -> bool {
    result.errors.is_empty() && result.response.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentCategory;
    use crate::models::testing::{reply, ScriptedBackend};
    use crate::utils::MedicoreError;

    fn runner(backend: ScriptedBackend) -> NonInteractiveRunner {
        NonInteractiveRunner::new(Arc::new(backend), PacingConfig::disabled(), 1024)
    }

    #[tokio::test]
    async fn test_execute_success() {
        let runner = runner(ScriptedBackend::new(vec![Ok(reply(
            AgentCategory::Admin,
            "Receivables over 90 days are high.",
        ))]));

        let result = runner.execute("aging".to_string(), None).await.unwrap();
        assert!(succeeded(&result));
        assert_eq!(result.metadata.model, "scripted");

        let text = runner.format_result(&result, OutputFormat::Text);
        assert!(text.contains("[ADMIN Agent]"));
        assert!(text.contains("Accounts Receivable Aging"));
        assert!(text.contains("45000"));
        assert!(text.contains("High Risk: 60+ Days"));
    }

    #[tokio::test]
    async fn test_execute_failure_is_reported() {
        let runner = runner(ScriptedBackend::new(vec![Err(
            MedicoreError::MalformedResponse("unrecognised agentType 'X'".to_string()),
        )]));

        let result = runner.execute("hello".to_string(), None).await.unwrap();
        assert!(!succeeded(&result));
        assert!(result.response.is_none());
        assert_eq!(result.errors.len(), 1);

        let json = runner.format_result(&result, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["errors"][0].as_str().unwrap().contains("Malformed response"));
    }

    #[tokio::test]
    async fn test_execute_with_image_sends_raw_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wound.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let backend = Arc::new(ScriptedBackend::new(vec![Ok(reply(
            AgentCategory::Clinical,
            "Looks infected.",
        ))]));
        let runner = NonInteractiveRunner::new(backend.clone(), PacingConfig::disabled(), 1024);

        let result = runner.execute(String::new(), Some(&path)).await.unwrap();
        assert_eq!(result.metadata.image.as_deref(), Some("wound.jpg"));

        let sent = backend.sent();
        let image = sent[0].1.as_ref().unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert!(!image.data.starts_with("data:"));
    }

    #[tokio::test]
    async fn test_empty_prompt_without_image_is_rejected() {
        let runner = runner(ScriptedBackend::new(vec![]));
        assert!(runner.execute("  ".to_string(), None).await.is_err());
    }

    #[test]
    fn test_visualization_lines_for_defaults() {
        let view = Visualization::select(AgentCategory::Clinical, None).unwrap();
        let lines = visualization_lines(&view);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Oxygen Saturation") && lines[0].contains("[Normal]"));
        assert!(lines[2].contains("[Critical]"));
        assert!(lines[3].starts_with("AI Recommendation"));
    }
}
