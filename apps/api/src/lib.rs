//! News headline → LLM meme script → memegen image URL.
//!
//! Shared by the `newsmeme-api` HTTP server and the `newsmeme` CLI.

pub mod config;
pub mod errors;
pub mod llm_client;
pub mod meme;
pub mod routes;
pub mod state;
