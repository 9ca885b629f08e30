// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The reconciliation engine: periodic loop, secret synthesis, and the
//! orphaned-secret cleanup state machine.

pub mod cleanup;
pub mod engine;
pub mod synthesis;

pub use engine::{Bridge, CycleSummary};
