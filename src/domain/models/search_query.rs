// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// Supported search backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchBackend {
    Bing,
    Google,
}

impl SearchBackend {
    pub fn name(&self) -> &'static str {
        match self {
            SearchBackend::Bing => "bing",
            SearchBackend::Google => "google",
        }
    }
}

/// Adult-content mode passed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdultFilter {
    #[default]
    Off,
    On,
}

impl AdultFilter {
    /// Value of the backend's `adlt` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            AdultFilter::Off => "off",
            AdultFilter::On => "on",
        }
    }
}

/// Content-type filter applied to search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageType {
    Photo,
    Clipart,
    LineDrawing,
    Animated,
    Transparent,
    FaceOnly,
}

impl ImageType {
    /// Parse the CLI shorthand for a content-type filter.
    pub fn parse(shorthand: &str) -> Option<Self> {
        match shorthand.to_ascii_lowercase().as_str() {
            "photo" => Some(ImageType::Photo),
            "clipart" => Some(ImageType::Clipart),
            "line" | "linedrawing" => Some(ImageType::LineDrawing),
            "gif" | "animatedgif" => Some(ImageType::Animated),
            "transparent" => Some(ImageType::Transparent),
            "face" => Some(ImageType::FaceOnly),
            _ => None,
        }
    }
}

/// Immutable description of one image search.
///
/// Built once per run from caller input and threaded through the query
/// builder and both discovery strategies; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search keywords, passed through URL-encoded as-is
    pub keywords: String,
    /// Adult-content mode
    pub adult: AdultFilter,
    /// Optional content-type filter
    pub image_type: Option<ImageType>,
    /// Optional color filter ("bw", "color", or a named color)
    pub color: Option<String>,
    /// Safe-search toggle for backends that expose it separately
    pub safe_mode: bool,
}

impl SearchQuery {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            adult: AdultFilter::Off,
            image_type: None,
            color: None,
            safe_mode: false,
        }
    }

    pub fn with_adult(mut self, adult: AdultFilter) -> Self {
        self.adult = adult;
        self
    }

    pub fn with_image_type(mut self, image_type: Option<ImageType>) -> Self {
        self.image_type = image_type;
        self
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    pub fn with_safe_mode(mut self, safe_mode: bool) -> Self {
        self.safe_mode = safe_mode;
        self
    }
}
