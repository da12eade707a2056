use chrono::Local;
use serde_json::Value;

use super::category::AgentCategory;
use super::types::{AgentResponse, Payload};
use crate::utils::MedicoreError;

/// Parse the model's text answer into an `AgentResponse`.
///
/// The answer must be a JSON object with a recognised `agentType`. A
/// surrounding markdown code fence is tolerated.
pub fn parse_agent_response(text: &str) -> Result<AgentResponse, MedicoreError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(MedicoreError::MalformedResponse(
            "model returned an empty answer".to_string(),
        ));
    }

    let value: Value = serde_json::from_str(body)?;
    let object = value.as_object().ok_or_else(|| {
        MedicoreError::MalformedResponse("expected a JSON object".to_string())
    })?;

    let label = object
        .get("agentType")
        .and_then(Value::as_str)
        .ok_or_else(|| MedicoreError::MalformedResponse("missing agentType".to_string()))?;

    let category = AgentCategory::from_label(label).ok_or_else(|| {
        MedicoreError::MalformedResponse(format!("unrecognised agentType '{}'", label))
    })?;

    let field = |name: &str| {
        object
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let payload = object
        .get("structuredData")
        .and_then(|structured| Payload::decode(category, structured));

    Ok(AgentResponse {
        category,
        reasoning: field("reasoning"),
        content: field("content"),
        payload,
        timestamp: Local::now(),
    })
}

/// Remove a ```json ... ``` wrapper if present
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening line
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgingItem;
    use crate::agents::RiskLevel;

    #[test]
    fn test_parse_full_response() {
        let text = r#"{
            "agentType": "ADMIN",
            "reasoning": "Receivables question",
            "content": "Here is the aging analysis.",
            "structuredData": {
                "agingSchedule": [{"period": "90+", "amount": 7000, "riskLevel": "High"}]
            }
        }"#;

        let response = parse_agent_response(text).unwrap();
        assert_eq!(response.category, AgentCategory::Admin);
        assert_eq!(response.reasoning, "Receivables question");
        assert_eq!(response.content, "Here is the aging analysis.");
        assert_eq!(
            response.payload,
            Some(Payload::BillingAging(vec![AgingItem::new(
                "90+",
                7000.0,
                RiskLevel::High
            )]))
        );
    }

    #[test]
    fn test_parse_fenced_response() {
        let text = "```json\n{\"agentType\": \"education\", \"content\": \"Rest well.\"}\n```";
        let response = parse_agent_response(text).unwrap();
        assert_eq!(response.category, AgentCategory::Education);
        assert_eq!(response.content, "Rest well.");
        assert_eq!(response.reasoning, "");
        assert_eq!(response.payload, None);
    }

    #[test]
    fn test_missing_category_is_malformed() {
        let err = parse_agent_response(r#"{"content": "hello"}"#).unwrap_err();
        assert!(matches!(err, MedicoreError::MalformedResponse(ref m) if m.contains("agentType")));
    }

    #[test]
    fn test_unknown_category_is_malformed() {
        let err = parse_agent_response(r#"{"agentType": "RADIOLOGY"}"#).unwrap_err();
        assert!(matches!(err, MedicoreError::MalformedResponse(ref m) if m.contains("RADIOLOGY")));
    }

    #[test]
    fn test_non_json_is_malformed() {
        assert!(matches!(
            parse_agent_response("Sure! Routing to RME."),
            Err(MedicoreError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_agent_response("   "),
            Err(MedicoreError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_agent_response("[1, 2, 3]"),
            Err(MedicoreError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {} "), "{}");
    }
}
