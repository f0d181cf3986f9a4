//! CDP Assistant - retrieval-augmented chat for Customer Data Platforms
//!
//! Answers "how do I" questions about Segment, mParticle, Lytics and Zeotap
//! by retrieving snippets of a built-in documentation corpus and streaming a
//! grounded answer from an OpenAI chat model.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `corpus` - The built-in documentation corpus
//! - `chunking` - Recursive character text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - In-memory similarity index
//! - `completion` - Streaming chat completion
//! - `rag` - Document store, question classification and prompt assembly
//! - `chat` - Request orchestration and fragment streaming
//! - `assistant` - Process-wide state shared by all requests
//!
//! # Example
//!
//! ```rust,no_run
//! use cdp_assistant::assistant::Assistant;
//! use cdp_assistant::config::Settings;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let assistant = Assistant::start(Settings::load()?).await?;
//!
//!     let mut answer = assistant
//!         .stream_response("How do I set up a new source in Segment?", &[])
//!         .await?;
//!     while let Some(fragment) = answer.next().await {
//!         print!("{}", fragment);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod chat;
pub mod chunking;
pub mod cli;
pub mod completion;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod rag;
pub mod vector_store;

#[cfg(test)]
mod testing;

pub use error::{AssistantError, Result};
