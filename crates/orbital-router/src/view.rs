//! Scoped view data for nested template rendering.

use serde_json::Value;
use thiserror::Error;
use tracing::trace;

/// A template could not be rendered.
#[derive(Debug, Error)]
#[error("failed to render view {file}: {message}")]
pub struct ViewError {
    /// Template name.
    pub file: String,
    /// What went wrong.
    pub message: String,
}

impl ViewError {
    /// Creates a render error for `file`.
    pub fn new(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Renders a named template.
///
/// The renderer receives the stack so templates can read the current
/// scope and render nested views with their own data.
pub trait Renderer {
    /// Renders `file` using the data in scope on `views`.
    fn render(&mut self, file: &str, views: &mut ViewStack) -> Result<String, ViewError>;
}

/// Stack of view data scopes.
///
/// Rendering with data pushes a scope for the duration of that render, so
/// nested views see their own data and the parent's scope comes back
/// once they finish.
#[derive(Debug, Clone, Default)]
pub struct ViewStack {
    levels: Vec<Value>,
}

impl ViewStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// The innermost data scope.
    pub fn current(&self) -> Option<&Value> {
        self.levels.last()
    }

    /// Number of active scopes.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Renders `file`, scoping `data` to it when given.
    ///
    /// `None` and `null` render in the enclosing scope.
    pub fn get<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        file: &str,
        data: Option<Value>,
    ) -> Result<String, ViewError> {
        let scoped = match data {
            Some(Value::Null) | None => false,
            Some(data) => {
                self.levels.push(data);
                true
            }
        };
        trace!(file, depth = self.depth(), "rendering view");

        let result = renderer.render(file, self);

        if scoped {
            self.levels.pop();
        }

        result
    }

    /// Renders every file in order with the same data and concatenates
    /// the output.
    pub fn render<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        files: &[&str],
        data: Option<Value>,
    ) -> Result<String, ViewError> {
        let mut out = String::new();
        for file in files {
            out.push_str(&self.get(renderer, file, data.clone())?);
        }
        Ok(out)
    }
}
