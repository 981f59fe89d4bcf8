//! Instruction sources for the call-count interceptor

mod prompt_file;

pub use prompt_file::FileInstructionSource;
