use crate::agents::{
    AgingItem, EducationPoint, ExtractedFields, RiskLevel, VitalSign, VitalStatus,
};

pub fn default_aging_schedule() -> Vec<AgingItem> {
    vec![
        AgingItem::new("0-30", 45000.0, RiskLevel::Low),
        AgingItem::new("30-60", 12000.0, RiskLevel::Medium),
        AgingItem::new("60-90", 5000.0, RiskLevel::High),
        AgingItem::new("90+", 2000.0, RiskLevel::High),
    ]
}

pub fn default_vitals() -> Vec<VitalSign> {
    vec![
        VitalSign::new("Oxygen Saturation", "98%", VitalStatus::Normal),
        VitalSign::new("Blood Pressure", "145/90", VitalStatus::Warning),
        VitalSign::new("Heart Rate", "110 bpm", VitalStatus::Critical),
    ]
}

pub fn default_extracted_fields() -> ExtractedFields {
    ExtractedFields {
        patient_name: Some("N/A".to_string()),
        diagnosis: Some("Pending".to_string()),
        icd_code: Some("---".to_string()),
        plan: Some("Review".to_string()),
    }
}

pub fn default_education_points() -> Vec<EducationPoint> {
    vec![
        EducationPoint::new("Rest", "Ensure 8 hours of sleep."),
        EducationPoint::new("Medication", "Take antibiotics after meals."),
    ]
}
