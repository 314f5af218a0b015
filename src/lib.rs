// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// Configuration module
///
/// Tunable pipeline settings loaded from defaults, files and environment
pub mod config;

/// Domain module
///
/// Core value types and the link-discovery capability trait
pub mod domain;

/// Infrastructure module
///
/// Concrete search backends: paged API endpoint and headless browser
pub mod infrastructure;

/// Pipeline module
///
/// Pagination control, dedup filtering and the bounded download executor
pub mod pipeline;

/// Utility module
///
/// Retry policy, media signature sniffing, filename derivation, telemetry
pub mod utils;
