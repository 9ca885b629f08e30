// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Argo CD side: secret CRUD in the target namespace and the pure
//! label/annotation merge algorithm.

pub mod connector;
pub mod merge;

pub use connector::ArgoConnector;
