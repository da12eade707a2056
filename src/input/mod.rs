// Gateway module for input capture - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod attachment;
mod samples;
mod submission;

// Public re-exports - the ONLY way to access input functionality
pub use attachment::{mime_for_path, Attachment, ImagePayload};
pub use samples::{sample_for, SamplePrompt, SAMPLE_PROMPTS};
pub use submission::{compose, Submission};
