//! Category → visualization template, with placeholder data for anything
//! the model did not send.

mod defaults;

use crate::agents::{
    AgentCategory, AgentResponse, AgingItem, EducationPoint, ExtractedFields, Payload, VitalSign,
};

pub use defaults::{
    default_aging_schedule, default_education_points, default_extracted_fields, default_vitals,
};

/// Records extraction with every row resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRows {
    pub patient_name: String,
    pub diagnosis: String,
    pub icd_code: String,
    pub plan: String,
}

impl RecordRows {
    /// Fill each missing field from the placeholder independently
    fn resolve(fields: Option<&ExtractedFields>) -> Self {
        let placeholder = default_extracted_fields();
        let pick = |value: Option<&Option<String>>, fallback: Option<String>| {
            value
                .and_then(|v| v.clone())
                .or(fallback)
                .unwrap_or_default()
        };

        Self {
            patient_name: pick(fields.map(|f| &f.patient_name), placeholder.patient_name),
            diagnosis: pick(fields.map(|f| &f.diagnosis), placeholder.diagnosis),
            icd_code: pick(fields.map(|f| &f.icd_code), placeholder.icd_code),
            plan: pick(fields.map(|f| &f.plan), placeholder.plan),
        }
    }

    /// Label/value pairs in display order
    pub fn rows(&self) -> [(&'static str, &str); 4] {
        [
            ("Patient", self.patient_name.as_str()),
            ("Diagnosis", self.diagnosis.as_str()),
            ("ICD-10 Code", self.icd_code.as_str()),
            ("Plan", self.plan.as_str()),
        ]
    }
}

/// One of the four specialist templates, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub enum Visualization {
    RecordsExtraction(RecordRows),
    BillingAging(Vec<AgingItem>),
    ClinicalVitals(Vec<VitalSign>),
    Education(Vec<EducationPoint>),
}

impl Visualization {
    pub fn for_response(response: &AgentResponse) -> Option<Self> {
        Self::select(response.category, response.payload.as_ref())
    }

    /// Total mapping from category to template. Coordinator has none.
    ///
    /// A payload belonging to a different category is treated as absent.
    pub fn select(category: AgentCategory, payload: Option<&Payload>) -> Option<Self> {
        match category {
            AgentCategory::Coordinator => None,
            AgentCategory::Rme => {
                let fields = match payload {
                    Some(Payload::RecordsExtraction(fields)) => Some(fields),
                    _ => None,
                };
                Some(Self::RecordsExtraction(RecordRows::resolve(fields)))
            }
            AgentCategory::Admin => Some(Self::BillingAging(match payload {
                Some(Payload::BillingAging(items)) => items.clone(),
                _ => default_aging_schedule(),
            })),
            AgentCategory::Clinical => Some(Self::ClinicalVitals(match payload {
                Some(Payload::ClinicalVitals(items)) => items.clone(),
                _ => default_vitals(),
            })),
            AgentCategory::Education => Some(Self::Education(match payload {
                Some(Payload::Education(points)) => points.clone(),
                _ => default_education_points(),
            })),
        }
    }

    pub fn category(&self) -> AgentCategory {
        match self {
            Self::RecordsExtraction(_) => AgentCategory::Rme,
            Self::BillingAging(_) => AgentCategory::Admin,
            Self::ClinicalVitals(_) => AgentCategory::Clinical,
            Self::Education(_) => AgentCategory::Education,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::RecordsExtraction(_) => "RME Extraction",
            Self::BillingAging(_) => "Accounts Receivable Aging",
            Self::ClinicalVitals(_) => "Clinical Decision Support",
            Self::Education(_) => "Patient Education Materials",
        }
    }

    /// Static note drawn under the template
    pub fn footnote(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::RecordsExtraction(_) => {
                Some(("", "Certified compliant with Permenkes No 24 (2022)."))
            }
            Self::ClinicalVitals(_) => Some((
                "AI Recommendation",
                "Validate anomalous vitals immediately. Review recent medication administration records.",
            )),
            Self::BillingAging(_) | Self::Education(_) => None,
        }
    }
}

/// Risk legend under the aging chart
pub const AGING_LEGEND: [(&str, &str); 3] = [
    ("Low Risk", "Current"),
    ("Medium Risk", "30-60 Days"),
    ("High Risk", "60+ Days"),
];

/// Whole amounts without decimals, everything else with two
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{:.0}", amount)
    } else {
        format!("{:.2}", amount)
    }
}
