//! Compiled regex patterns for boilerplate detection.
//!
//! All patterns are compiled once at startup using `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// Class/id names indicating navigation chrome.
pub static NAVIGATION_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^nav$|^nav[-_]|[-_]nav$|navbar|navigation|top[-_]?nav|main[-_]?menu|site[-_]?nav|\bmenu\b|breadcrumbs?|\bcrumbs?\b|pagination|pager)",
    )
    .expect("NAVIGATION_CLASS regex")
});

/// Class/id names indicating non-editorial page furniture.
pub static BOILERPLATE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(shar(?:e|ing)|social|related|recommend(?:ed)?|\bfooter\b|site[-_]?footer|site[-_]?header|copyright|disclaimer|you[-_]?may[-_]?like|taboola|outbrain|cookie[-_]?(?:banner|consent|notice)|consent[-_]?banner|gdpr|\blogin\b|\bsignin\b|\bsign[-_]?in\b|\bsignup\b|\bsign[-_]?up\b|\bsubscribe\b|subscription|newsletter|trending|popular|most[-_]?read|top[-_]?stories|\bbyline\b|timestamp|dateline|tag[-_]?cloud|category[-_]?list|filed[-_]?under|posted[-_]?in|post[-_]?meta|entry[-_]?meta|meta[-_]?info|\bwidget\b|\bsidebar\b|\bpromo\b|sponsor(?:ed)?|advert(?:isement)?|\bads?\b|\bbanner\b|\bmodal\b|\bpopup\b|print[-_]?only|skip[-_]?link)",
    )
    .expect("BOILERPLATE_CLASS regex")
});

/// Class/id names marking comment sections.
pub static COMMENT_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(comments?|comment[-_]?list|comment[-_]?section|respond|replies|discussion|disqus)\b")
        .expect("COMMENT_CLASS regex")
});

/// Exact id values marking comment sections.
pub static COMMENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(comments?|comment-section|disqus_thread|respond|discussion)$")
        .expect("COMMENT_ID regex")
});

/// Class/id names marking comment forms and reply widgets, pruned out
/// of the comment region before rewriting.
pub static COMMENT_DISCARD_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(comment[-_]?form|reply[-_]?form|comment[-_]?respond|leave[-_]?a?[-_]?comment|\brespond\b|comment[-_]?login|comment[-_]?meta|akismet)")
        .expect("COMMENT_DISCARD_CLASS regex")
});

/// Class/id names marking image carriers and captions, pruned when
/// images are disabled.
pub static IMAGE_CARRIER_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\bcaption\b|\bgallery\b|image[-_]?(?:box|wrapper|container)|\bthumbnail\b|\bphoto\b|\blightbox\b)")
        .expect("IMAGE_CARRIER_CLASS regex")
});

/// Standalone share-button / social-widget line.
pub static SHARE_BUTTON_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\W*(print|share|tweet|save|comment|feedback|facebook|twitter|whatsapp|telegram|linkedin|pinterest|reddit|instagram|flipboard|e-?mail|subscribe(?:\s+(?:now|to.*))?|sign\s+up|read\s+more|more\s+on\s+this|advertisement|sponsored)\W*$",
    )
    .expect("SHARE_BUTTON_TEXT regex")
});

/// Quick probe for an extension that looks like an image file.
pub static IMAGE_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(avif|bmp|gif|ico|jpe?g|png|svg|tiff?|webp)$").expect("IMAGE_EXTENSION regex")
});
