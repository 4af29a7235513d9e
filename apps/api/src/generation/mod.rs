// Resume generation pipeline.
// Prompt build → fast/robust orchestration → repair/decode → shape normalization → mapping.
// All upstream calls go through llm_client::TextGenerator; nothing here talks HTTP to the model.

pub mod decoder;
pub mod generator;
pub mod handlers;
pub mod mapper;
pub mod orchestrator;
pub mod prompts;
