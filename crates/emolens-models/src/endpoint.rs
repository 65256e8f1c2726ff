//! Analysis endpoint definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Interchangeable analysis backends.
///
/// The request/response contract is the same for every variant; only the
/// target URL differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    /// Face detection plus captioning
    #[default]
    FaceCaption,
    /// Face detection plus emotion model
    FaceModel,
    /// Captioning only
    CaptionOnly,
}

impl Endpoint {
    pub const ALL: &'static [Endpoint] = &[
        Endpoint::FaceCaption,
        Endpoint::FaceModel,
        Endpoint::CaptionOnly,
    ];

    /// Stable identifier used in form values.
    pub fn as_slug(&self) -> &'static str {
        match self {
            Endpoint::FaceCaption => "face-caption",
            Endpoint::FaceModel => "face-model",
            Endpoint::CaptionOnly => "caption-only",
        }
    }

    /// Human-readable name shown in the selector.
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::FaceCaption => "face+caption",
            Endpoint::FaceModel => "face+model",
            Endpoint::CaptionOnly => "caption-only",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "face-caption" | "face+caption" => Ok(Endpoint::FaceCaption),
            "face-model" | "face+model" => Ok(Endpoint::FaceModel),
            "caption-only" => Ok(Endpoint::CaptionOnly),
            _ => Err(EndpointParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown endpoint: {0}")]
pub struct EndpointParseError(String);

/// Service URL for every [`Endpoint`].
///
/// One field per variant, so a new backend does not compile until it has a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointUrls {
    pub face_caption: String,
    pub face_model: String,
    pub caption_only: String,
}

impl EndpointUrls {
    pub fn url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::FaceCaption => &self.face_caption,
            Endpoint::FaceModel => &self.face_model,
            Endpoint::CaptionOnly => &self.caption_only,
        }
    }
}
