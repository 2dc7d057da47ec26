use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Raw mapping text of one class section, shared between the fragment cache
/// and the lookup that requested it.
#[derive(Clone, PartialEq, Eq)]
pub struct Fragment(Arc<str>);

impl Fragment {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Fragment {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fragment").field("len", &self.0.len()).finish()
    }
}
