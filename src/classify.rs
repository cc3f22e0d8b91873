//! Content classification for extracted messages.
//!
//! Pure lexical pass over final message text. DOM-aware strategies run a
//! second, structural pass (probing descendant elements) and OR the two
//! results together; see `ContentFlags::merge`.

use crate::patterns::{CODE_FENCE, CODE_KEYWORDS, IMAGE_TOKEN, INLINE_CODE, LINK_TOKEN};

/// Classification flags for one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentFlags {
    pub code: bool,
    pub link: bool,
    pub image: bool,
}

impl ContentFlags {
    /// Combines two classification passes.
    ///
    /// A flag set by either pass stays set; structural evidence never
    /// clears a lexical match and vice versa.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            code: self.code || other.code,
            link: self.link || other.link,
            image: self.image || other.image,
        }
    }
}

/// Classifies message text for code, link, and image evidence.
///
/// Pure and total: any input (including the empty string) yields a result,
/// and identical input always yields identical flags.
#[must_use]
pub fn classify(text: &str) -> ContentFlags {
    ContentFlags {
        code: CODE_FENCE.is_match(text)
            || INLINE_CODE.is_match(text)
            || CODE_KEYWORDS.is_match(text),
        link: LINK_TOKEN.is_match(text),
        image: IMAGE_TOKEN.is_match(text),
    }
}
