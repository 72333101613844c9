//! Content extraction: state tracking, element policies, the candidate
//! selector and the fallback arbiter.

pub mod comments;
pub mod fallback;
pub mod handlers;
pub mod pipeline;
pub mod state;

/// Default set of tags permitted in the output for an extraction
/// round, in the internal vocabulary. Grows with `table`, `graphic`
/// and `ref` depending on the options, and with `div` when a round
/// looks weak.
pub static TAG_CATALOG: [&str; 11] = [
    "blockquote", "code", "del", "fw", "head", "hi", "item", "lb", "list", "p", "quote",
];

/// Blocks that protect inline formatting: a formatting element whose
/// parent is one of these is emitted directly instead of being wrapped
/// in a fresh paragraph.
pub static FORMATTING_PROTECTED: [&str; 7] = ["cell", "head", "hi", "item", "p", "quote", "td"];

/// Inline tags preserved inside paragraphs.
pub static P_FORMATTING: [&str; 3] = ["hi", "ref", "del"];

/// Cell-producing table elements.
pub static TABLE_ELEMS: [&str; 2] = ["td", "th"];

/// Tags handled as plain inline text inside table cells.
pub static TABLE_ALL: [&str; 3] = ["td", "th", "hi"];

/// Formatting elements that may appear outside paragraphs.
pub static FORMATTING: [&str; 3] = ["hi", "ref", "span"];

/// Block quotation and code tags.
pub static CODES_QUOTES: [&str; 2] = ["code", "quote"];

/// Heading-like tags.
pub static HEADINGS: [&str; 2] = ["fw", "head"];

/// Tags every extraction result may contain.
pub static OUTPUT_VOCABULARY: [&str; 16] = [
    "body", "p", "head", "hi", "ref", "list", "item", "table", "row", "cell", "quote",
    "code", "graphic", "lb", "del", "fw",
];
