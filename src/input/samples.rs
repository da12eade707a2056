use crate::agents::AgentCategory;

/// A canned prompt for trying out one specialist
#[derive(Debug, Clone, Copy)]
pub struct SamplePrompt {
    pub category: AgentCategory,
    pub label: &'static str,
    pub text: &'static str,
}

/// One per specialist, in sidebar order
pub const SAMPLE_PROMPTS: [SamplePrompt; 4] = [
    SamplePrompt {
        category: AgentCategory::Rme,
        label: "RME",
        text: "Dr. Sutomo notes: Pasien Budi Santoso, diagnosis acute bronchitis, resep Amoxicillin 500mg.",
    },
    SamplePrompt {
        category: AgentCategory::Admin,
        label: "Admin",
        text: "Buatkan analisis aging schedule untuk piutang asuransi yang lewat 90 hari.",
    },
    SamplePrompt {
        category: AgentCategory::Clinical,
        label: "Clinical",
        text: "Pasien tekanan darah 160/95, pusing berat. Berikan rekomendasi awal.",
    },
    SamplePrompt {
        category: AgentCategory::Education,
        label: "Edu",
        text: "Buatkan materi edukasi perawatan luka diabetes yang mudah dipahami lansia.",
    },
];

/// Look a sample up by category label ("rme", "admin", "clinical", "edu")
pub fn sample_for(label: &str) -> Option<&'static SamplePrompt> {
    let category = AgentCategory::from_label(label)?;
    SAMPLE_PROMPTS.iter().find(|s| s.category == category)
}
