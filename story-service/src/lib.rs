//! Story generation backend.
//!
//! Turns a handful of story parameters into a Gemini-written story, then
//! illustrates each paragraph with a Stability AI image, degrading to
//! placeholder images when individual generations fail.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod services;
pub mod startup;
