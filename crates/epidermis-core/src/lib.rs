//! Step clock, step cycle, and orchestration for the epidermis simulation.
//!
//! This crate owns the four-phase step cycle that drives the simulation:
//! Clock, Substrate, Rules, and Commit.
//!
//! # Modules
//!
//! - [`clock`] -- Step counter with checked advance.
//! - [`config`] -- Configuration loading from YAML into strongly-typed
//!   structs, with validation.
//! - [`runner`] -- Bounded run loop ([`run_simulation`]) and per-step
//!   callbacks.
//! - [`tick`] -- The step cycle ([`run_step`]), simulation state, and the
//!   substrate bundle.
//!
//! [`run_simulation`]: runner::run_simulation
//! [`run_step`]: tick::run_step

pub mod clock;
pub mod config;
pub mod runner;
pub mod tick;
