//! # agora-registry
//!
//! The agent name registry: a bidirectional, mutually consistent binding
//! between human-readable names and [`AgentId`]s.
//!
//! ## Invariants
//!
//! - A name resolves to at most one agent.
//! - An agent holds at most one name.
//! - Re-registering a new name for an agent that already holds one
//!   atomically releases the old binding first — the two maps never
//!   disagree.
//!
//! Names carry no authority: nothing in the trading core consults the
//! registry for authorization decisions.

pub mod registry;

pub use registry::{AgentRegistry, RegistrationOutcome};
