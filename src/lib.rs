//! # filtergraph
//!
//! Composable image filters with a fixed, ordered catalog. A user picks a
//! named filter (Sepia, Invert, Vignette, Zoom Blur, ...); the filter builds a
//! small graph of elementary operations sized to the image, and applying the
//! filter folds the image through that graph.
//!
//! # Architecture: Filter → Graph → Operation → Backend
//!
//! ```text
//! FilterKind::ZoomBlur.build_graph((400, 300))
//!     └─▶ FilterGraph [ zoom-blur(amount=20) ─▶ crop(rect=[40, 30, 320, 240]) ]
//!             └─▶ Operation::execute_with(backend, image)
//!                     └─▶ FilterBackend::zoom_blur / FilterBackend::crop
//! ```
//!
//! Each layer does one thing:
//!
//! - **Filters** are user-facing: stable ids, titles, parameters baked in.
//! - **Graphs** are ordered stage lists with fail-fast application.
//! - **Operations** check their parameters and dispatch to a primitive.
//! - **Backends** implement the primitives on pixels.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`filters`] | `FilterKind`: ids, titles, graph builders, `apply` |
//! | [`catalog`] | `FilterCatalog`: the ordered set of filters offered to a user |
//! | [`graph`] | `FilterGraph`: non-empty stage chain, left-fold application |
//! | [`operation`] | `Operation`: kind + named parameters, schema and range checks |
//! | [`imaging`] | `PixelImage`, typed parameters, `FilterBackend` + `RustBackend` |
//! | [`collaborators`] | Storage, candidate-photo and capture-dialog boundaries |
//! | [`config`] | `filtergraph.toml` loading, merging and validation |
//! | [`render`] | Decode → filter → encode for files; parallel catalog previews |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Failure Is a Missing Image
//!
//! [`FilterKind::apply`](filters::FilterKind::apply) returns
//! `Option<PixelImage>`: a filter either fully transforms its input or produces
//! nothing. Partial results of earlier stages are never surfaced. The reason
//! is logged through `tracing`, and `try_apply` returns it for callers that
//! want it.
//!
//! ## Images Are Immutable Values
//!
//! [`PixelImage`](imaging::PixelImage) wraps its buffer in an `Arc`. Clones
//! are cheap, no primitive mutates its input, and one image can feed many
//! filters concurrently. This is what lets `preview` render a whole catalog
//! on a rayon pool from a single decode.
//!
//! ## Geometry Comes From the Input
//!
//! Graphs are built per image size. Zoom blur's trailing crop trims a 10%
//! margin of the pre-blur size, so a 400×300 input always yields 320×240.
//!
//! ## Catalogs Are Values
//!
//! There is no global filter list. [`FilterCatalog`](catalog::FilterCatalog)
//! is built (stock, extended or from configured ids) and handed to whatever
//! needs it; its order is fixed at construction.
//!
//! ## Pluggable Primitives
//!
//! Operations call a [`FilterBackend`](imaging::FilterBackend). The pure-Rust
//! [`RustBackend`](imaging::RustBackend) supports everything; a reduced
//! backend reports missing primitives, and graph construction for a filter
//! that needs one fails cleanly.

pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod filters;
pub mod graph;
pub mod imaging;
pub mod operation;
pub mod output;
pub mod render;

pub use catalog::FilterCatalog;
pub use filters::FilterKind;
pub use graph::FilterGraph;
pub use imaging::{FilterBackend, PixelImage, RustBackend};
pub use operation::{Operation, OperationKind};

#[cfg(test)]
pub(crate) mod test_helpers;
