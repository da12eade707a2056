use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::category::AgentCategory;

/// One routed answer from the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentResponse {
    pub category: AgentCategory,
    /// Why the coordinator picked this specialist
    pub reasoning: String,
    /// The specialist's answer, shown in the transcript
    pub content: String,
    /// Structured data for the category's visualization, when the model sent usable data
    pub payload: Option<Payload>,
    pub timestamp: DateTime<Local>,
}

/// Structured data keyed by category. Only the variant matching the
/// response's category is ever decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    RecordsExtraction(ExtractedFields),
    BillingAging(Vec<AgingItem>),
    ClinicalVitals(Vec<VitalSign>),
    Education(Vec<EducationPoint>),
}

impl Payload {
    /// Key under `structuredData` that feeds each category
    pub fn wire_key(category: AgentCategory) -> Option<&'static str> {
        match category {
            AgentCategory::Rme => Some("extractedFields"),
            AgentCategory::Admin => Some("agingSchedule"),
            AgentCategory::Clinical => Some("riskAssessment"),
            AgentCategory::Education => Some("keyPoints"),
            AgentCategory::Coordinator => None,
        }
    }

    /// Decode the part of `structured` that belongs to `category`.
    ///
    /// Anything missing, empty or of the wrong shape yields `None`; the
    /// renderer falls back to placeholder data in that case.
    pub fn decode(category: AgentCategory, structured: &Value) -> Option<Self> {
        let key = Self::wire_key(category)?;
        let value = structured.get(key)?.clone();

        let decoded = match category {
            AgentCategory::Rme => serde_json::from_value::<ExtractedFields>(value)
                .map(Payload::RecordsExtraction),
            AgentCategory::Admin => {
                serde_json::from_value::<Vec<AgingItem>>(value).map(Payload::BillingAging)
            }
            AgentCategory::Clinical => {
                serde_json::from_value::<Vec<VitalSign>>(value).map(Payload::ClinicalVitals)
            }
            AgentCategory::Education => {
                serde_json::from_value::<Vec<EducationPoint>>(value).map(Payload::Education)
            }
            AgentCategory::Coordinator => return None,
        };

        match decoded {
            Ok(payload) if !payload.is_empty() => Some(payload),
            Ok(_) => None,
            Err(e) => {
                debug!("Ignoring {} payload under '{}': {}", category, key, e);
                None
            }
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Payload::RecordsExtraction(fields) => fields.is_empty(),
            Payload::BillingAging(items) => items.is_empty(),
            Payload::ClinicalVitals(items) => items.is_empty(),
            Payload::Education(items) => items.is_empty(),
        }
    }
}

/// Fields pulled out of a clinical note. Each may be missing independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    #[serde(default, deserialize_with = "opt_text")]
    pub patient_name: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub diagnosis: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub icd_code: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub plan: Option<String>,
}

impl ExtractedFields {
    fn is_empty(&self) -> bool {
        self.patient_name.is_none()
            && self.diagnosis.is_none()
            && self.icd_code.is_none()
            && self.plan.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "high", alias = "HIGH")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// One bucket of a receivables aging schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingItem {
    #[serde(deserialize_with = "text")]
    pub period: String,
    pub amount: f64,
    pub risk_level: RiskLevel,
}

impl AgingItem {
    pub fn new(period: &str, amount: f64, risk_level: RiskLevel) -> Self {
        Self {
            period: period.to_string(),
            amount,
            risk_level,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VitalStatus {
    #[serde(alias = "normal", alias = "NORMAL")]
    Normal,
    #[serde(alias = "warning", alias = "WARNING")]
    Warning,
    #[serde(alias = "critical", alias = "CRITICAL")]
    Critical,
}

impl VitalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// A vital sign with its assessed status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSign {
    #[serde(deserialize_with = "text")]
    pub metric: String,
    #[serde(deserialize_with = "text")]
    pub value: String,
    pub status: VitalStatus,
}

impl VitalSign {
    pub fn new(metric: &str, value: &str, status: VitalStatus) -> Self {
        Self {
            metric: metric.to_string(),
            value: value.to_string(),
            status,
        }
    }
}

/// One card of patient education material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationPoint {
    #[serde(deserialize_with = "text")]
    pub topic: String,
    #[serde(deserialize_with = "text")]
    pub explanation: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub icon: Option<String>,
}

impl EducationPoint {
    pub fn new(topic: &str, explanation: &str) -> Self {
        Self {
            topic: topic.to_string(),
            explanation: explanation.to_string(),
            icon: None,
        }
    }
}

/// Models often send numbers where text is expected ("value": 98); accept both
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected text, found {}",
            other
        ))),
    }
}

/// Like `text`, but null and blank strings become `None`
fn opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected text, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decode_aging_schedule() {
        let structured = json!({
            "agingSchedule": [
                {"period": "0-30", "amount": 1000, "riskLevel": "Low"},
                {"period": "90+", "amount": 250.5, "riskLevel": "high"}
            ]
        });

        let payload = Payload::decode(AgentCategory::Admin, &structured);
        assert_eq!(
            payload,
            Some(Payload::BillingAging(vec![
                AgingItem::new("0-30", 1000.0, RiskLevel::Low),
                AgingItem::new("90+", 250.5, RiskLevel::High),
            ]))
        );
    }

    #[test]
    fn test_decode_vitals_accepts_numeric_values() {
        let structured = json!({
            "riskAssessment": [{"metric": "SpO2", "value": 91, "status": "Warning"}]
        });

        let payload = Payload::decode(AgentCategory::Clinical, &structured);
        assert_eq!(
            payload,
            Some(Payload::ClinicalVitals(vec![VitalSign::new(
                "SpO2",
                "91",
                VitalStatus::Warning
            )]))
        );
    }

    #[test]
    fn test_partial_extracted_fields() {
        let structured = json!({
            "extractedFields": {"patientName": "Budi Santoso", "icdCode": "J20.9", "plan": ""}
        });

        match Payload::decode(AgentCategory::Rme, &structured) {
            Some(Payload::RecordsExtraction(fields)) => {
                assert_eq!(fields.patient_name.as_deref(), Some("Budi Santoso"));
                assert_eq!(fields.diagnosis, None);
                assert_eq!(fields.icd_code.as_deref(), Some("J20.9"));
                assert_eq!(fields.plan, None);
            }
            other => panic!("Expected records payload, got {:?}", other),
        }
    }

    #[test]
    fn test_payload_for_other_category_is_ignored() {
        let structured = json!({
            "agingSchedule": [{"period": "0-30", "amount": 1, "riskLevel": "Low"}]
        });
        assert_eq!(Payload::decode(AgentCategory::Clinical, &structured), None);
        assert_eq!(Payload::decode(AgentCategory::Coordinator, &structured), None);
    }

    #[test]
    fn test_malformed_or_empty_payload_is_none() {
        let wrong_shape = json!({"agingSchedule": {"period": "0-30"}});
        assert_eq!(Payload::decode(AgentCategory::Admin, &wrong_shape), None);

        let bad_status = json!({
            "riskAssessment": [{"metric": "HR", "value": "110", "status": "Unknown"}]
        });
        assert_eq!(Payload::decode(AgentCategory::Clinical, &bad_status), None);

        let empty = json!({"keyPoints": []});
        assert_eq!(Payload::decode(AgentCategory::Education, &empty), None);

        assert_eq!(Payload::decode(AgentCategory::Education, &json!({})), None);
    }
}
