/// Convenience result type used across kinetex.
pub type KinetexResult<T> = Result<T, KinetexError>;

/// Top-level error taxonomy used by engine APIs.
///
/// The first four variants are the scene-level failures a timeline can hit; all of them abort a
/// run at the cue where they occur.
#[derive(thiserror::Error, Debug)]
pub enum KinetexError {
    /// Invalid geometry request (zero-length direction, negative spacing, empty group).
    #[error("layout error: {0}")]
    Layout(String),

    /// An operation targets an element or value absent from (or already removed from) the scene.
    #[error("scene reference error: {0}")]
    SceneReference(String),

    /// A transform-matching step between payloads with no usable correspondence.
    #[error("incompatible transform: {0}")]
    IncompatibleTransform(String),

    /// A binding whose sources depend, directly or transitively, on the bound element.
    #[error("binding cycle: {0}")]
    BindingCycle(String),

    /// Invalid user-provided script or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while rasterizing, encoding, or sampling the timeline.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// A timeline failure, tagged with the cue (and step within the cue) that raised it.
    #[error("timeline aborted at cue {cue}{}: {source}", step_suffix(.step))]
    Aborted {
        /// Index of the failing cue.
        cue: usize,
        /// Index of the failing step inside the cue's batch, if the cue is a batch.
        step: Option<usize>,
        /// Underlying failure.
        #[source]
        source: Box<KinetexError>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KinetexError {
    /// Build a [`KinetexError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`KinetexError::SceneReference`] value.
    pub fn scene_reference(msg: impl Into<String>) -> Self {
        Self::SceneReference(msg.into())
    }

    /// Build a [`KinetexError::IncompatibleTransform`] value.
    pub fn incompatible_transform(msg: impl Into<String>) -> Self {
        Self::IncompatibleTransform(msg.into())
    }

    /// Build a [`KinetexError::BindingCycle`] value.
    pub fn binding_cycle(msg: impl Into<String>) -> Self {
        Self::BindingCycle(msg.into())
    }

    /// Build a [`KinetexError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KinetexError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Wrap a failure with the cue/step position it happened at.
    pub fn aborted(cue: usize, step: Option<usize>, source: KinetexError) -> Self {
        Self::Aborted {
            cue,
            step,
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through [`KinetexError::Aborted`] wrappers.
    pub fn root(&self) -> &KinetexError {
        match self {
            Self::Aborted { source, .. } => source.root(),
            other => other,
        }
    }
}

fn step_suffix(step: &Option<usize>) -> String {
    match step {
        Some(s) => format!(", step {s}"),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
