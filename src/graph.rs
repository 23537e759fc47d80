//! Linear filter graphs.
//!
//! A [`FilterGraph`] is an ordered, non-empty chain of [`Operation`]s. Applying
//! it is a left fold: stage 0 receives the graph's input, stage *i* receives
//! stage *i − 1*'s output, and the last stage's output is the result.
//!
//! ```text
//! input ─▶ [zoom-blur(amount=20)] ─▶ [crop(rect=[40, 30, 320, 240])] ─▶ output
//! ```
//!
//! A failing stage aborts the fold. Callers get either a fully transformed
//! image or nothing; the output of earlier, successful stages is dropped.

use crate::imaging::{FilterBackend, PixelImage, RustBackend};
use crate::operation::{Operation, OperationError, OperationKind};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a filter could not produce a graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphBuildError {
    #[error("a filter graph needs at least one operation")]
    Empty,
    #[error("the pass-through filter has no graph")]
    PassThrough,
    #[error("cannot build a graph for a {width}x{height} image")]
    InvalidSize { width: u32, height: u32 },
    #[error("{filter}: {kind} is not available on this platform")]
    Unsupported { filter: String, kind: OperationKind },
}

/// A stage that failed while a graph was being applied.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("stage {index} ({operation}) failed: {source}")]
pub struct StageError {
    /// Zero-based position of the failing stage.
    pub index: usize,
    /// The failing operation, rendered with its parameters.
    pub operation: String,
    #[source]
    pub source: OperationError,
}

/// Ordered chain of operations, always at least one long.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    operations: Vec<Operation>,
}

impl FilterGraph {
    /// Start a graph with its input stage.
    pub fn new(input: Operation) -> Self {
        Self {
            operations: vec![input],
        }
    }

    /// Append the next stage. Stages run in insertion order.
    pub fn then(mut self, next: Operation) -> Self {
        self.operations.push(next);
        self
    }

    /// Build from a list of stages, rejecting an empty list.
    pub fn from_operations(operations: Vec<Operation>) -> Result<Self, GraphBuildError> {
        if operations.is_empty() {
            return Err(GraphBuildError::Empty);
        }
        Ok(Self { operations })
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn stage_count(&self) -> usize {
        self.operations.len()
    }

    /// The stage that receives the graph's input.
    pub fn input_operation(&self) -> &Operation {
        &self.operations[0]
    }

    /// The stage whose output is the graph's output (may be the input stage).
    pub fn output_operation(&self) -> &Operation {
        &self.operations[self.operations.len() - 1]
    }

    /// Apply with the default [`RustBackend`], reporting the failing stage.
    pub fn try_apply(&self, input: &PixelImage) -> Result<PixelImage, StageError> {
        self.try_apply_with(&RustBackend, input)
    }

    /// Fold `input` through every stage on `backend`, stopping at the first failure.
    pub fn try_apply_with(
        &self,
        backend: &impl FilterBackend,
        input: &PixelImage,
    ) -> Result<PixelImage, StageError> {
        self.operations
            .iter()
            .enumerate()
            .try_fold(input.clone(), |image, (index, operation)| {
                let output = operation
                    .execute_with(backend, &image)
                    .map_err(|source| StageError {
                        index,
                        operation: operation.to_string(),
                        source,
                    })?;
                debug!(stage = index, operation = %operation, "stage complete");
                Ok(output)
            })
    }

    /// Apply with the default [`RustBackend`].
    pub fn apply(&self, input: &PixelImage) -> Option<PixelImage> {
        self.apply_with(&RustBackend, input)
    }

    /// Apply on `backend`. A failure is logged and yields `None`.
    pub fn apply_with(&self, backend: &impl FilterBackend, input: &PixelImage) -> Option<PixelImage> {
        match self.try_apply_with(backend, input) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(
                    stage = err.index,
                    operation = %err.operation,
                    error = %err.source,
                    "filter graph failed"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::RecordingBackend;
    use crate::imaging::params::{CropRect, Intensity, Levels};
    use crate::test_helpers::gradient_image;

    #[test]
    fn from_operations_rejects_empty() {
        assert_eq!(
            FilterGraph::from_operations(Vec::new()),
            Err(GraphBuildError::Empty)
        );
    }

    #[test]
    fn input_and_output_stages() {
        let graph = FilterGraph::new(Operation::invert()).then(Operation::noir());
        assert_eq!(graph.stage_count(), 2);
        assert_eq!(graph.input_operation().kind(), OperationKind::Invert);
        assert_eq!(graph.output_operation().kind(), OperationKind::Noir);

        let single = FilterGraph::new(Operation::noir());
        assert_eq!(single.input_operation(), single.output_operation());
    }

    #[test]
    fn single_stage_matches_direct_execution() {
        let img = gradient_image(64, 48);
        let op = Operation::sepia(Intensity(0.5));
        let direct = op.execute(&img).unwrap();
        let via_graph = FilterGraph::new(op).apply(&img).unwrap();
        assert_eq!(via_graph, direct);
    }

    #[test]
    fn stages_compose_in_order() {
        let img = gradient_image(64, 48);
        let op1 = Operation::sepia(Intensity(0.5));
        let op2 = Operation::invert();
        let op3 = Operation::posterize(Levels(4));

        let expected = op3
            .execute(&op2.execute(&op1.execute(&img).unwrap()).unwrap())
            .unwrap();
        let graph = FilterGraph::from_operations(vec![op1, op2, op3]).unwrap();
        assert_eq!(graph.apply(&img).unwrap(), expected);
    }

    #[test]
    fn reordering_changes_result() {
        let img = gradient_image(64, 48);
        let forward = FilterGraph::new(Operation::sepia(Intensity(1.0))).then(Operation::invert());
        let reversed = FilterGraph::new(Operation::invert()).then(Operation::sepia(Intensity(1.0)));
        assert_ne!(forward.apply(&img).unwrap(), reversed.apply(&img).unwrap());
    }

    #[test]
    fn backend_sees_stages_in_order() {
        let backend = RecordingBackend::new();
        let graph = FilterGraph::new(Operation::zoom_blur(20.0))
            .then(Operation::crop(CropRect::new(4.0, 3.0, 32.0, 24.0)))
            .then(Operation::noir());
        graph.apply_with(&backend, &gradient_image(40, 30)).unwrap();
        assert_eq!(
            backend.get_calls(),
            vec![OperationKind::ZoomBlur, OperationKind::Crop, OperationKind::Noir]
        );
    }

    #[test]
    fn failing_middle_stage_yields_nothing() {
        let backend = RecordingBackend::new();
        let graph = FilterGraph::new(Operation::invert())
            .then(Operation::crop(CropRect::new(0.0, 0.0, 999.0, 999.0)))
            .then(Operation::noir());

        assert!(graph.apply_with(&backend, &gradient_image(40, 30)).is_none());
        // The crop is rejected before reaching the backend; noir never runs
        assert_eq!(backend.get_calls(), vec![OperationKind::Invert]);
    }

    #[test]
    fn try_apply_names_the_failing_stage() {
        let graph = FilterGraph::new(Operation::invert())
            .then(Operation::vignette(Intensity(-2.0)))
            .then(Operation::noir());
        let err = graph.try_apply(&gradient_image(16, 16)).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.operation, "vignette(intensity=-2)");
        assert!(matches!(err.source, OperationError::InvalidParameter { .. }));
    }

    #[test]
    fn unsupported_primitive_fails_whole_graph() {
        let backend = RecordingBackend::without(vec![OperationKind::Crop]);
        let graph = FilterGraph::new(Operation::invert())
            .then(Operation::crop(CropRect::new(0.0, 0.0, 8.0, 8.0)));
        let err = graph
            .try_apply_with(&backend, &gradient_image(16, 16))
            .unwrap_err();
        assert_eq!(err.source, OperationError::Unsupported(OperationKind::Crop));
    }

    #[test]
    fn graph_is_reusable_across_images() {
        let graph = FilterGraph::new(Operation::invert());
        let a = gradient_image(16, 16);
        let b = gradient_image(32, 8);
        assert_eq!(graph.apply(&a).unwrap().size(), (16, 16));
        assert_eq!(graph.apply(&b).unwrap().size(), (32, 8));
    }
}
