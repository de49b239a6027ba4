//! PDF rendering seam.
//!
//! No PDF engine ships with this workspace; [`NoPdfRenderer`] is the
//! default implementation and always reports itself unavailable, which the
//! export handler turns into the HTML-attachment fallback. A host that has
//! a renderer (wkhtmltopdf bridge, a print service, ...) implements
//! [`PdfRenderer`] and wires it into the application state.

/// Errors produced by export rendering.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// No PDF renderer is available; callers fall back to HTML.
    #[error("PDF renderer unavailable")]
    RendererUnavailable,

    /// The renderer exists but failed on this document.
    #[error("PDF rendering failed: {0}")]
    RenderFailed(String),
}

/// Renders an HTML document to PDF bytes.
pub trait PdfRenderer: Send + Sync {
    fn render(&self, html: &str) -> Result<Vec<u8>, ExportError>;
}

/// Default renderer: always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPdfRenderer;

impl PdfRenderer for NoPdfRenderer {
    fn render(&self, _html: &str) -> Result<Vec<u8>, ExportError> {
        Err(ExportError::RendererUnavailable)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_renderer_reports_unavailable() {
        let result = NoPdfRenderer.render("<html></html>");
        assert_matches!(result, Err(ExportError::RendererUnavailable));
    }
}
