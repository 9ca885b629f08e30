// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! KKP custom resource types (kubermatic.k8c.io/v1).

pub mod cluster;
pub mod project;
pub mod seed;

pub use cluster::Cluster;
pub use project::Project;
pub use seed::Seed;
