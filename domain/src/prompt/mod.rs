//! Prompt templates for worker and synthesis invocations

pub mod template;

pub use template::PromptTemplate;
