//! Elementary image operations.
//!
//! An [`Operation`] is a kind plus a map of named parameters, mirroring how a
//! filter stage is configured: `sepia { intensity: 0.5 }`,
//! `crop { rect: [40, 30, 320, 240] }`. The parameter *shape* is checked once,
//! when the operation is built ([`Operation::new`]); parameter *values* are
//! checked when it runs, because some of them (a crop rectangle) can only be
//! judged against the input image.
//!
//! ## Schema
//!
//! | Kind | Parameters |
//! |---|---|
//! | `identity`, `invert`, `noir` | none |
//! | `sepia`, `vignette` | `intensity` (scalar, `0..=1`) |
//! | `hue-rotate` | `angle` (scalar, whole degrees) |
//! | `posterize` | `levels` (scalar, whole number `2..=256`) |
//! | `zoom-blur` | `amount` (scalar, `0 < amount <= 200`) |
//! | `crop` | `rect` (vector of 4: x, y, width, height) |

use crate::imaging::params::{CropRect, HueAngle, Intensity, Levels};
use crate::imaging::{BackendError, FilterBackend, MAX_ZOOM_BLUR_AMOUNT, PixelImage, RustBackend};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("{kind}: missing required parameter '{name}'")]
    MissingParameter { kind: OperationKind, name: String },
    #[error("{kind}: unknown parameter '{name}'")]
    UnknownParameter { kind: OperationKind, name: String },
    #[error("{kind}: parameter '{name}' must be a {expected}")]
    WrongType {
        kind: OperationKind,
        name: String,
        expected: ParamType,
    },
    #[error("{kind}: invalid {name} {value}: {reason}")]
    InvalidParameter {
        kind: OperationKind,
        name: String,
        value: String,
        reason: String,
    },
    #[error("{0} is not available on this platform")]
    Unsupported(OperationKind),
    #[error("{kind} failed: {source}")]
    Backend {
        kind: OperationKind,
        #[source]
        source: BackendError,
    },
}

/// The elementary transforms a filter graph is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Identity,
    Sepia,
    Invert,
    Vignette,
    ZoomBlur,
    Crop,
    HueRotate,
    Posterize,
    Noir,
}

impl OperationKind {
    pub const ALL: &'static [OperationKind] = &[
        OperationKind::Identity,
        OperationKind::Sepia,
        OperationKind::Invert,
        OperationKind::Vignette,
        OperationKind::ZoomBlur,
        OperationKind::Crop,
        OperationKind::HueRotate,
        OperationKind::Posterize,
        OperationKind::Noir,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Identity => "identity",
            OperationKind::Sepia => "sepia",
            OperationKind::Invert => "invert",
            OperationKind::Vignette => "vignette",
            OperationKind::ZoomBlur => "zoom-blur",
            OperationKind::Crop => "crop",
            OperationKind::HueRotate => "hue-rotate",
            OperationKind::Posterize => "posterize",
            OperationKind::Noir => "noir",
        }
    }

    /// Required parameters for this kind. No kind has optional parameters.
    pub fn schema(self) -> &'static [(&'static str, ParamType)] {
        match self {
            OperationKind::Identity | OperationKind::Invert | OperationKind::Noir => &[],
            OperationKind::Sepia | OperationKind::Vignette => &[("intensity", ParamType::Scalar)],
            OperationKind::HueRotate => &[("angle", ParamType::Scalar)],
            OperationKind::Posterize => &[("levels", ParamType::Scalar)],
            OperationKind::ZoomBlur => &[("amount", ParamType::Scalar)],
            OperationKind::Crop => &[("rect", ParamType::Vector(4))],
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expected shape of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Scalar,
    Vector(usize),
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Scalar => f.write_str("scalar"),
            ParamType::Vector(n) => write!(f, "vector of {n}"),
        }
    }
}

/// A named parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl ParamValue {
    fn matches(&self, ty: ParamType) -> bool {
        match (self, ty) {
            (ParamValue::Scalar(_), ParamType::Scalar) => true,
            (ParamValue::Vector(v), ParamType::Vector(n)) => v.len() == n,
            _ => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Scalar(v) => write!(f, "{v}"),
            ParamValue::Vector(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(value: Vec<f64>) -> Self {
        ParamValue::Vector(value)
    }
}

/// One configured image transform. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    kind: OperationKind,
    params: BTreeMap<String, ParamValue>,
}

impl Operation {
    /// Build an operation, checking the parameters against the kind's schema.
    pub fn new<K, V>(
        kind: OperationKind,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, OperationError>
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let params: BTreeMap<String, ParamValue> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let schema = kind.schema();

        for name in params.keys() {
            if !schema.iter().any(|(expected, _)| expected == name) {
                return Err(OperationError::UnknownParameter {
                    kind,
                    name: name.clone(),
                });
            }
        }
        for (name, ty) in schema {
            match params.get(*name) {
                None => {
                    return Err(OperationError::MissingParameter {
                        kind,
                        name: name.to_string(),
                    });
                }
                Some(value) if !value.matches(*ty) => {
                    return Err(OperationError::WrongType {
                        kind,
                        name: name.to_string(),
                        expected: *ty,
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self { kind, params })
    }

    /// Build a kind with no parameters.
    fn bare(kind: OperationKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    /// Build a kind with a single parameter known to satisfy its schema.
    fn with_param(kind: OperationKind, name: &str, value: ParamValue) -> Self {
        Self {
            kind,
            params: BTreeMap::from([(name.to_string(), value)]),
        }
    }

    pub fn identity() -> Self {
        Self::bare(OperationKind::Identity)
    }

    pub fn sepia(intensity: Intensity) -> Self {
        Self::with_param(OperationKind::Sepia, "intensity", intensity.value().into())
    }

    pub fn invert() -> Self {
        Self::bare(OperationKind::Invert)
    }

    pub fn vignette(intensity: Intensity) -> Self {
        Self::with_param(OperationKind::Vignette, "intensity", intensity.value().into())
    }

    pub fn hue_rotate(angle: HueAngle) -> Self {
        Self::with_param(OperationKind::HueRotate, "angle", (angle.degrees() as f64).into())
    }

    pub fn posterize(levels: Levels) -> Self {
        Self::with_param(OperationKind::Posterize, "levels", (levels.value() as f64).into())
    }

    pub fn noir() -> Self {
        Self::bare(OperationKind::Noir)
    }

    pub fn zoom_blur(amount: f64) -> Self {
        Self::with_param(OperationKind::ZoomBlur, "amount", amount.into())
    }

    pub fn crop(rect: CropRect) -> Self {
        Self::with_param(OperationKind::Crop, "rect", rect.to_vec().into())
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Parameters in name order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The crop rectangle, for crop operations.
    pub fn crop_rect(&self) -> Option<CropRect> {
        match self.params.get("rect") {
            Some(ParamValue::Vector(values)) => CropRect::from_slice(values),
            _ => None,
        }
    }

    /// Run with the default [`RustBackend`].
    pub fn execute(&self, input: &PixelImage) -> Result<PixelImage, OperationError> {
        self.execute_with(&RustBackend, input)
    }

    /// Run on `backend`, validating parameter values first.
    pub fn execute_with(
        &self,
        backend: &impl FilterBackend,
        input: &PixelImage,
    ) -> Result<PixelImage, OperationError> {
        if !backend.supports(self.kind) {
            return Err(OperationError::Unsupported(self.kind));
        }
        debug!(operation = %self, width = input.width(), height = input.height(), "executing");

        let result = match self.kind {
            OperationKind::Identity => return Ok(input.clone()),
            OperationKind::Sepia => backend.sepia(input, self.intensity()?),
            OperationKind::Invert => backend.invert(input),
            OperationKind::Vignette => backend.vignette(input, self.intensity()?),
            OperationKind::HueRotate => {
                let angle = self.whole_number("angle", f64::from(i32::MIN), f64::from(i32::MAX))?;
                backend.hue_rotate(input, HueAngle(angle as i32))
            }
            OperationKind::Posterize => {
                let levels = self.whole_number("levels", 2.0, 256.0)?;
                backend.posterize(input, Levels(levels as u32))
            }
            OperationKind::Noir => backend.noir(input),
            OperationKind::ZoomBlur => {
                let amount = self.scalar("amount")?;
                if !amount.is_finite() || amount <= 0.0 || amount > MAX_ZOOM_BLUR_AMOUNT {
                    return Err(self.invalid(
                        "amount",
                        &format!("must be in (0, {MAX_ZOOM_BLUR_AMOUNT}]"),
                    ));
                }
                backend.zoom_blur(input, amount)
            }
            OperationKind::Crop => {
                let rect = self.crop_rect().ok_or_else(|| self.missing("rect"))?;
                if rect.to_pixels(input.size()).is_none() {
                    let (w, h) = input.size();
                    return Err(self.invalid(
                        "rect",
                        &format!("must be a non-empty region inside the {w}x{h} input"),
                    ));
                }
                backend.crop(input, rect)
            }
        };

        result.map_err(|source| match source {
            BackendError::Unsupported(kind) => OperationError::Unsupported(kind),
            source => OperationError::Backend {
                kind: self.kind,
                source,
            },
        })
    }

    fn scalar(&self, name: &str) -> Result<f64, OperationError> {
        match self.params.get(name) {
            Some(ParamValue::Scalar(v)) => Ok(*v),
            _ => Err(self.missing(name)),
        }
    }

    fn intensity(&self) -> Result<Intensity, OperationError> {
        let intensity = Intensity(self.scalar("intensity")?);
        if !intensity.is_valid() {
            return Err(self.invalid("intensity", "must be between 0 and 1"));
        }
        Ok(intensity)
    }

    fn whole_number(&self, name: &str, min: f64, max: f64) -> Result<f64, OperationError> {
        let value = self.scalar(name)?;
        if !value.is_finite() || value.fract() != 0.0 || value < min || value > max {
            return Err(self.invalid(name, &format!("must be a whole number in {min}..={max}")));
        }
        Ok(value)
    }

    fn missing(&self, name: &str) -> OperationError {
        OperationError::MissingParameter {
            kind: self.kind,
            name: name.to_string(),
        }
    }

    fn invalid(&self, name: &str, reason: &str) -> OperationError {
        OperationError::InvalidParameter {
            kind: self.kind,
            name: name.to_string(),
            value: self
                .params
                .get(name)
                .map(|v| v.to_string())
                .unwrap_or_default(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.params.is_empty() {
            let parts: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, "({})", parts.join(", "))?;
        }
        Ok(())
    }
}
