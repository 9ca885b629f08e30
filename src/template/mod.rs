// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cluster secret templating: context assembly, handlebars rendering, and
//! projection of the rendered document into the expected secret shape.

pub mod context;
pub mod renderer;

pub use context::TemplateContext;
pub use renderer::{RenderedSecret, Renderer};
