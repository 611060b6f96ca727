//! Prompt visibility rule shared by every prompt-reading tool.
//!
//! The store is opened with full read access, so handlers apply this
//! themselves. A prompt the caller may not see is reported as missing,
//! never as forbidden.

/// A prompt is visible to its owner, and to everyone when public.
pub fn is_visible(caller: Option<&str>, owner: &str, is_public: bool) -> bool {
    is_public || caller.is_some_and(|id| id == owner)
}
