//! Core loop for an LLM-piloted Doom agent.
//!
//! The pieces: a closed action vocabulary, a PNG frame encoder, a prompt
//! builder carrying one cycle of rolling context, a vision-oracle client,
//! a response interpreter with a fail-open fallback, and the episode driver
//! that ties them to a simulation environment.

pub mod action;
pub mod episode;
pub mod frame;
pub mod interpret;
pub mod oracle;
pub mod prompt;
