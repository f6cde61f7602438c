// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! The production stage machine.
//!
//! Orders move through the configured stage catalog one step at a
//! time. At every instant no completed stage lies after the current
//! stage; every function here upholds that and returns the new order
//! alongside the audit event describing the step.

mod apply;
mod command;
mod error;
mod stage_machine;
mod state;

#[cfg(test)]
mod tests;

pub use apply::{apply_production, apply_production_patch};
pub use command::ProductionCommand;
pub use error::CoreError;
pub use stage_machine::{Completion, Progress, advance, complete, progress};
pub use state::{PatchOutcome, ProductionPatch, ProductionTransition};

