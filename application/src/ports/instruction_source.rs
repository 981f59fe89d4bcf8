//! Port for the operator-supplied instruction text.
//!
//! The call-count interceptor periodically re-injects this text into tool
//! output. Where it comes from (a prompt file in the sandbox root, a skill
//! tree) is an adapter concern; the engine never parses it.

/// Supplies the instruction text, if any is configured.
pub trait InstructionSource: Send + Sync {
    /// Current instruction text, or `None` when none is available.
    fn load(&self) -> Option<String>;
}

/// Source that never has instructions (tests, interception disabled)
pub struct NoInstructions;

impl InstructionSource for NoInstructions {
    fn load(&self) -> Option<String> {
        None
    }
}

/// Fixed in-memory instructions
pub struct StaticInstructions(pub String);

impl InstructionSource for StaticInstructions {
    fn load(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
