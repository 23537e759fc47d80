//! The ordered set of filters offered to a user.
//!
//! A [`FilterCatalog`] is a plain value: build one ([`FilterCatalog::standard`],
//! [`FilterCatalog::extended`], or from configured ids) and pass it to whatever
//! needs it. Its order is presentation order and never changes once built, so
//! "every filter" always means the same concrete, parameterised list.

use crate::filters::{FilterKind, ParseFilterError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("a filter catalog needs at least one filter")]
    Empty,
    #[error("filter '{0}' appears more than once")]
    Duplicate(String),
    #[error(transparent)]
    UnknownFilter(#[from] ParseFilterError),
}

/// What a selection UI needs to show one filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
}

/// Fixed, ordered, non-empty list of filters with unique ids.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCatalog {
    filters: Vec<FilterKind>,
}

impl FilterCatalog {
    pub fn new(filters: Vec<FilterKind>) -> Result<Self, CatalogError> {
        if filters.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, filter) in filters.iter().enumerate() {
            if filters[..i].contains(filter) {
                return Err(CatalogError::Duplicate(filter.id()));
            }
        }
        Ok(Self { filters })
    }

    /// Build from stable identifiers, keeping their order.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self, CatalogError> {
        let filters = ids
            .iter()
            .map(|id| id.as_ref().parse::<FilterKind>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(filters)
    }

    /// `[None, Sepia(0.5), Invert, Vignette(0.9), ZoomBlur]`.
    pub fn standard() -> Self {
        Self {
            filters: vec![
                FilterKind::None,
                FilterKind::sepia(),
                FilterKind::Invert,
                FilterKind::vignette(),
                FilterKind::ZoomBlur,
            ],
        }
    }

    /// The standard catalog plus hue shift, noir and posterize.
    pub fn extended() -> Self {
        let mut filters = Self::standard().filters;
        filters.extend([
            FilterKind::hue_rotate(90),
            FilterKind::Noir,
            FilterKind::posterize(),
        ]);
        Self { filters }
    }

    pub fn filters(&self) -> &[FilterKind] {
        &self.filters
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterKind> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Always false: catalogs are non-empty.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Look a filter up by identifier (`sepia`, `sepia@0.5`, `hue-rotate-90`, ...).
    pub fn get(&self, id: &str) -> Option<&FilterKind> {
        let wanted: FilterKind = id.parse().ok()?;
        self.filters.iter().find(|f| **f == wanted)
    }

    /// Id and title for every filter, in order.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.filters
            .iter()
            .map(|f| CatalogEntry {
                id: f.id(),
                title: f.title(),
            })
            .collect()
    }
}

impl Default for FilterCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> IntoIterator for &'a FilterCatalog {
    type Item = &'a FilterKind;
    type IntoIter = std::slice::Iter<'a, FilterKind>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}
