//! Result type for extraction output.

use crate::etree::{NodeId, Tree};
use crate::metadata::Metadata;

/// Result of content extraction from an HTML document.
///
/// Owns the normalized element tree; `body` (and `comments_body` when
/// comment extraction ran) point at the roots of the editorial
/// content inside it.
#[derive(Debug)]
pub struct ExtractedDocument {
    /// Extracted metadata, including fingerprint and record id.
    pub metadata: Metadata,

    /// Flattened body text (concatenated text/tail fields).
    pub raw_text: String,

    /// Text projection of the body, with formatting markers when
    /// requested.
    pub text: String,

    /// Text projection of the comments, empty when comments were not
    /// extracted.
    pub comments: String,

    tree: Tree,
    body: NodeId,
    comments_body: Option<NodeId>,
}

impl ExtractedDocument {
    pub(crate) fn new(
        metadata: Metadata,
        raw_text: String,
        text: String,
        comments: String,
        tree: Tree,
        body: NodeId,
        comments_body: Option<NodeId>,
    ) -> Self {
        Self {
            metadata,
            raw_text,
            text,
            comments,
            tree,
            body,
            comments_body,
        }
    }

    /// The element tree and the root of the extracted body.
    #[must_use]
    pub fn body(&self) -> (&Tree, NodeId) {
        (&self.tree, self.body)
    }

    /// The root of the extracted comments, when comment extraction ran.
    #[must_use]
    pub fn comments_body(&self) -> Option<(&Tree, NodeId)> {
        self.comments_body.map(|id| (&self.tree, id))
    }
}
