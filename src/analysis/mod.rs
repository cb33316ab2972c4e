// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod handler;

pub use handler::{AnalysisError, AnalysisHandler, NOT_CONFIGURED_MESSAGE};
