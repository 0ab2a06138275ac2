use core::ptr::NonNull;

use tether::{
    container_of_non_null,
    linked_list::{Iter, Link, LinkedList},
    Node,
};

/// A display timing descriptor advertised by an output backend.
///
/// Modes are allocated and owned by the backend; the embedded link only
/// threads them into that backend's [`ModeList`].
#[derive(Debug)]
pub struct OutputMode {
    pub width: i32,
    pub height: i32,
    /// Refresh rate in millihertz.
    pub refresh: i32,
    pub preferred: bool,
    link: Link,
}

impl OutputMode {
    pub const fn new(width: i32, height: i32, refresh: i32) -> Self {
        OutputMode {
            width,
            height,
            refresh,
            preferred: false,
            link: Link::new(),
        }
    }
}

/// A non-owning handle to a backend-owned [`OutputMode`].
#[derive(Debug, Clone, Copy)]
pub struct OutputModeRef(NonNull<OutputMode>);

impl OutputModeRef {
    pub fn new(mode: &OutputMode) -> Self {
        Self(NonNull::from(mode))
    }

    pub fn mode(&self) -> &OutputMode {
        unsafe { self.0.as_ref() }
    }

    pub fn as_ptr(&self) -> *const OutputMode {
        self.0.as_ptr()
    }
}

impl Node<Link> for OutputModeRef {
    fn into_link(node: Self) -> NonNull<Link> {
        NonNull::from(&node.mode().link)
    }

    unsafe fn from_link(link: NonNull<Link>) -> Self {
        Self(container_of_non_null!(link, OutputMode, link))
    }
}

/// Recovers the mode descriptor a list link is embedded in.
///
/// # Safety
/// The link must point at the link field of a live, backend-owned
/// [`OutputMode`]. Passing a link embedded in any other type is undefined
/// behavior.
pub unsafe fn resolve_output_mode(link: NonNull<Link>) -> OutputModeRef {
    OutputModeRef::from_link(link)
}

/// The list of modes an output backend advertises.
#[derive(Debug, Default)]
pub struct ModeList {
    inner: LinkedList<OutputModeRef>,
}

impl ModeList {
    pub const fn new() -> Self {
        Self {
            inner: LinkedList::new(),
        }
    }

    /// # Safety
    /// The mode must outlive its list membership and must not already be
    /// threaded into a list.
    pub unsafe fn push_back(&mut self, mode: OutputModeRef) {
        self.inner.push_back(mode);
    }

    /// # Safety
    /// The mode must currently be threaded into this list.
    pub unsafe fn remove(&mut self, mode: OutputModeRef) {
        self.inner.remove(mode);
    }

    pub fn iter(&self) -> Iter<'_, OutputModeRef> {
        self.inner.iter()
    }

    /// The first mode the backend flagged as preferred, if any.
    pub fn preferred(&self) -> Option<OutputModeRef> {
        self.iter().find(|m| m.mode().preferred)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
