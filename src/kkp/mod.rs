// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Discovery layer against the KKP master and seed clusters.

pub mod connector;
pub mod seed;

pub use connector::KkpConnector;
pub use seed::{SeedClient, UserCluster};
