// Gateway module for agents - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod category;
mod parser;
mod types;

// Public re-exports - the ONLY way to access agent functionality
pub use category::AgentCategory;
pub use parser::parse_agent_response;
pub use types::{
    AgentResponse, AgingItem, EducationPoint, ExtractedFields, Payload, RiskLevel, VitalSign,
    VitalStatus,
};
