//! User-selectable filters.
//!
//! Each [`FilterKind`] is one named visual effect with its parameters baked
//! in. Given the size of the image it will be applied to, a filter builds a
//! [`FilterGraph`]; applying the filter applies that graph. The pass-through
//! filter ([`FilterKind::None`]) never builds a graph and returns its input
//! unchanged.
//!
//! ## Identifiers
//!
//! Every filter has a stable identifier, safe to persist as a selection key:
//!
//! | Filter | Id | Title |
//! |---|---|---|
//! | `None` | `none` | No Filter |
//! | `Sepia(0.5)` | `sepia` | Sepia |
//! | `Invert` | `invert` | Invert Colours |
//! | `Vignette(0.9)` | `vignette` | Vignette |
//! | `ZoomBlur` | `zoom-blur` | Zoom Blur |
//! | `HueRotate(90)` | `hue-rotate-90` | 90° Hue Shift |
//! | `Noir` | `noir` | Film Noir |
//! | `Posterize(6)` | `posterize` | Poster Effect |
//!
//! Non-default strengths append `@value`: `sepia@0.8`, `posterize@4`.

use crate::graph::{FilterGraph, GraphBuildError, StageError};
use crate::imaging::params::{HueAngle, Intensity, Levels};
use crate::imaging::{FilterBackend, PixelImage, RustBackend, ZOOM_BLUR_AMOUNT, zoom_blur_crop_rect};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown filter '{id}': {reason}")]
pub struct ParseFilterError {
    pub id: String,
    pub reason: String,
}

/// Why a filter produced no image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    #[error("graph construction failed: {0}")]
    Build(#[from] GraphBuildError),
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// A named filter with its parameters fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterKind {
    None,
    Sepia(Intensity),
    Invert,
    Vignette(Intensity),
    ZoomBlur,
    HueRotate(HueAngle),
    Noir,
    Posterize(Levels),
}

impl FilterKind {
    pub fn sepia() -> Self {
        FilterKind::Sepia(Intensity::SEPIA_DEFAULT)
    }

    pub fn vignette() -> Self {
        FilterKind::Vignette(Intensity::VIGNETTE_DEFAULT)
    }

    pub fn hue_rotate(degrees: i32) -> Self {
        FilterKind::HueRotate(HueAngle(degrees))
    }

    pub fn posterize() -> Self {
        FilterKind::Posterize(Levels::DEFAULT)
    }

    /// Stable identifier, see the [module docs](self).
    pub fn id(&self) -> String {
        self.to_string()
    }

    /// Human-readable title. Hue shifts show the exact angle.
    pub fn title(&self) -> String {
        match self {
            FilterKind::None => "No Filter".to_string(),
            FilterKind::Sepia(i) => with_strength("Sepia", *i, Intensity::SEPIA_DEFAULT),
            FilterKind::Invert => "Invert Colours".to_string(),
            FilterKind::Vignette(i) => with_strength("Vignette", *i, Intensity::VIGNETTE_DEFAULT),
            FilterKind::ZoomBlur => "Zoom Blur".to_string(),
            FilterKind::HueRotate(angle) => format!("{}° Hue Shift", angle.degrees()),
            FilterKind::Noir => "Film Noir".to_string(),
            FilterKind::Posterize(levels) if *levels == Levels::DEFAULT => {
                "Poster Effect".to_string()
            }
            FilterKind::Posterize(levels) => format!("Poster Effect ({} levels)", levels.value()),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, FilterKind::None)
    }

    /// Build the graph for an image of `size`.
    pub fn build_graph(&self, size: (u32, u32)) -> Result<FilterGraph, GraphBuildError> {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return Err(GraphBuildError::InvalidSize { width, height });
        }

        let graph = match *self {
            FilterKind::None => return Err(GraphBuildError::PassThrough),
            FilterKind::Sepia(intensity) => FilterGraph::new(Operation::sepia(intensity)),
            FilterKind::Invert => FilterGraph::new(Operation::invert()),
            FilterKind::Vignette(intensity) => FilterGraph::new(Operation::vignette(intensity)),
            // The blur smears a bright border in from the edges; the crop is
            // sized from the pre-blur image.
            FilterKind::ZoomBlur => FilterGraph::new(Operation::zoom_blur(ZOOM_BLUR_AMOUNT))
                .then(Operation::crop(zoom_blur_crop_rect(size))),
            FilterKind::HueRotate(angle) => FilterGraph::new(Operation::hue_rotate(angle)),
            FilterKind::Noir => FilterGraph::new(Operation::noir()),
            FilterKind::Posterize(levels) => FilterGraph::new(Operation::posterize(levels)),
        };
        Ok(graph)
    }

    /// Build the graph and check `backend` provides every stage's primitive.
    pub fn build_graph_for(
        &self,
        backend: &impl FilterBackend,
        size: (u32, u32),
    ) -> Result<FilterGraph, GraphBuildError> {
        let graph = self.build_graph(size)?;
        if let Some(op) = graph
            .operations()
            .iter()
            .find(|op| !backend.supports(op.kind()))
        {
            return Err(GraphBuildError::Unsupported {
                filter: self.id(),
                kind: op.kind(),
            });
        }
        Ok(graph)
    }

    /// Apply with the default [`RustBackend`].
    pub fn apply(&self, image: &PixelImage) -> Option<PixelImage> {
        self.apply_with(&RustBackend, image)
    }

    /// Apply on `backend`. Failures are logged and yield `None`.
    pub fn apply_with(&self, backend: &impl FilterBackend, image: &PixelImage) -> Option<PixelImage> {
        match self.try_apply_with(backend, image) {
            Ok(output) => Some(output),
            Err(err) => {
                warn!(filter = %self, error = %err, "filter produced no image");
                None
            }
        }
    }

    /// Apply with the default [`RustBackend`], keeping the failure reason.
    pub fn try_apply(&self, image: &PixelImage) -> Result<PixelImage, ApplyError> {
        self.try_apply_with(&RustBackend, image)
    }

    pub fn try_apply_with(
        &self,
        backend: &impl FilterBackend,
        image: &PixelImage,
    ) -> Result<PixelImage, ApplyError> {
        if self.is_pass_through() {
            return Ok(image.clone());
        }
        let graph = self.build_graph_for(backend, image.size())?;
        Ok(graph.try_apply_with(backend, image)?)
    }
}

fn with_strength(name: &str, value: Intensity, default: Intensity) -> String {
    if value == default {
        name.to_string()
    } else {
        format!("{name} ({:.0}%)", value.value() * 100.0)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::None => f.write_str("none"),
            FilterKind::Sepia(i) if *i == Intensity::SEPIA_DEFAULT => f.write_str("sepia"),
            FilterKind::Sepia(i) => write!(f, "sepia@{}", i.value()),
            FilterKind::Invert => f.write_str("invert"),
            FilterKind::Vignette(i) if *i == Intensity::VIGNETTE_DEFAULT => {
                f.write_str("vignette")
            }
            FilterKind::Vignette(i) => write!(f, "vignette@{}", i.value()),
            FilterKind::ZoomBlur => f.write_str("zoom-blur"),
            FilterKind::HueRotate(angle) => write!(f, "hue-rotate-{}", angle.degrees()),
            FilterKind::Noir => f.write_str("noir"),
            FilterKind::Posterize(levels) if *levels == Levels::DEFAULT => {
                f.write_str("posterize")
            }
            FilterKind::Posterize(levels) => write!(f, "posterize@{}", levels.value()),
        }
    }
}

impl FromStr for FilterKind {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason: &str| ParseFilterError {
            id: s.to_string(),
            reason: reason.to_string(),
        };
        let id = s.trim();

        if let Some(angle) = id.strip_prefix("hue-rotate-") {
            let degrees: i32 = angle
                .parse()
                .map_err(|_| fail("hue rotation needs a whole number of degrees"))?;
            return Ok(FilterKind::HueRotate(HueAngle(degrees)));
        }

        let (name, strength) = match id.split_once('@') {
            Some((name, value)) => (name, Some(value)),
            None => (id, None),
        };

        let intensity = |default: Intensity| -> Result<Intensity, ParseFilterError> {
            let Some(raw) = strength else {
                return Ok(default);
            };
            let value = Intensity(raw.parse().map_err(|_| fail("intensity must be a number"))?);
            if !value.is_valid() {
                return Err(fail("intensity must be between 0 and 1"));
            }
            Ok(value)
        };
        let no_strength = |kind: FilterKind| -> Result<FilterKind, ParseFilterError> {
            match strength {
                Some(_) => Err(fail("this filter takes no strength")),
                None => Ok(kind),
            }
        };

        match name {
            "none" => no_strength(FilterKind::None),
            "sepia" => Ok(FilterKind::Sepia(intensity(Intensity::SEPIA_DEFAULT)?)),
            "invert" => no_strength(FilterKind::Invert),
            "vignette" => Ok(FilterKind::Vignette(intensity(Intensity::VIGNETTE_DEFAULT)?)),
            "zoom-blur" => no_strength(FilterKind::ZoomBlur),
            "noir" => no_strength(FilterKind::Noir),
            "posterize" => {
                let levels = match strength {
                    Some(raw) => Levels(raw.parse().map_err(|_| fail("levels must be a whole number"))?),
                    None => Levels::DEFAULT,
                };
                if !levels.is_valid() {
                    return Err(fail("levels must be between 2 and 256"));
                }
                Ok(FilterKind::Posterize(levels))
            }
            _ => Err(fail("no such filter")),
        }
    }
}

impl TryFrom<String> for FilterKind {
    type Error = ParseFilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterKind> for String {
    fn from(value: FilterKind) -> Self {
        value.to_string()
    }
}
