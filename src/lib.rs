//! figgen - async pipeline orchestrator for publication-quality figures
//!
//! Generates publication-style diagrams and plots by sequencing model
//! calls through a two-phase pipeline, and manages many generations
//! concurrently as pollable tasks.
//!
//! # Architecture
//!
//! - Phase 1 (linear planning): retrieve reference examples, draft a
//!   figure description, refine it against presentation rules
//! - Phase 2 (iterative refinement): render and critique, revising up to
//!   a bounded number of rounds
//! - A scheduler with a fixed worker pool runs pipelines concurrently and
//!   keeps task state queryable after completion
//!
//! # Modules
//!
//! - `providers`: external model boundary (capabilities, retry, Gemini)
//! - `core`: orchestration logic (pipeline, refinement loop, scheduler)
//! - `domain`: data structures (request, task, refinement history)
//! - `catalog` / `retrieval`: reference example selection
//! - `storage`: artifact byte store
//! - `api` / `cli`: HTTP and command-line surfaces
//!
//! # Usage
//!
//! ```bash
//! # Start the HTTP service
//! figgen serve
//!
//! # Generate a figure from a methodology excerpt
//! figgen generate --input method.txt --intent "Overview of the pipeline"
//! ```

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod providers;
pub mod retrieval;
pub mod storage;

// Re-export main types at crate root for convenience
pub use crate::core::{Orchestrator, Scheduler, SchedulerError, Stage, StageFailure};
pub use catalog::{Category, ReferenceCatalog, ReferenceExample};
pub use config::Settings;
pub use domain::{
    Critique, DiagramKind, GenerationRequest, GenerationResult, Iteration, Task, TaskStatus,
    ValidationError, Verdict,
};
pub use providers::{Provider, ProviderError, RetryPolicy, RetryProvider};
pub use retrieval::Retriever;
pub use storage::{ArtifactStore, FsStore, MemStore};
