use core::ptr::NonNull;

use log::trace;
use spin::mutex::SpinMutex;
use tether::{
    container_of_non_null,
    linked_list::{Link, LinkedList},
    Node,
};

/// A client-facing protocol object handle.
///
/// Resources are allocated and destroyed by the resource layer; the
/// embedded link threads them into that layer's [`ResourceList`] of live
/// handles.
#[derive(Debug)]
pub struct Resource {
    pub id: u32,
    pub version: u32,
    /// Numeric id of the owning client connection.
    pub client: u32,
    pub interface: &'static str,
    link: Link,
}

impl Resource {
    pub const fn new(id: u32, version: u32, client: u32, interface: &'static str) -> Self {
        Resource {
            id,
            version,
            client,
            interface,
            link: Link::new(),
        }
    }
}

/// A non-owning handle to a live [`Resource`].
#[derive(Debug, Clone, Copy)]
pub struct ResourceRef(NonNull<Resource>);

impl ResourceRef {
    pub fn new(resource: &Resource) -> Self {
        Self(NonNull::from(resource))
    }

    pub fn resource(&self) -> &Resource {
        unsafe { self.0.as_ref() }
    }

    pub fn as_ptr(&self) -> *const Resource {
        self.0.as_ptr()
    }
}

impl Node<Link> for ResourceRef {
    fn into_link(node: Self) -> NonNull<Link> {
        NonNull::from(&node.resource().link)
    }

    unsafe fn from_link(link: NonNull<Link>) -> Self {
        Self(container_of_non_null!(link, Resource, link))
    }
}

/// Recovers the resource handle a list link is embedded in.
///
/// # Safety
/// The link must point at the link field of a live [`Resource`]. Passing
/// a link embedded in any other type is undefined behavior.
pub unsafe fn resolve_resource(link: NonNull<Link>) -> ResourceRef {
    ResourceRef::from_link(link)
}

/// The resource layer's list of live handles.
///
/// Inserts, removals, and traversals are serialized behind a spin lock;
/// the resolution itself stays lock-free.
#[derive(Debug, Default)]
pub struct ResourceList {
    list: SpinMutex<LinkedList<ResourceRef>>,
}

impl ResourceList {
    pub const fn new() -> Self {
        Self {
            list: SpinMutex::new(LinkedList::new()),
        }
    }

    /// # Safety
    /// The resource must outlive its list membership and must not already
    /// be threaded into a list.
    pub unsafe fn insert(&self, resource: ResourceRef) {
        trace!("resource.insert({:?})", resource);
        self.list.lock().push_back(resource);
    }

    /// # Safety
    /// The resource must currently be threaded into this list.
    pub unsafe fn remove(&self, resource: ResourceRef) {
        trace!("resource.remove({:?})", resource);
        self.list.lock().remove(resource);
    }

    /// Visits every live resource, e.g. to broadcast an event to all
    /// clients holding one.
    ///
    /// The lock is held for the whole traversal: the callback must not
    /// call back into this list (`insert`, `remove`, `len`, another
    /// `for_each`), or it will deadlock. Destroying a resource in
    /// response to a broadcast has to be deferred until the traversal
    /// returns.
    pub fn for_each(&self, mut f: impl FnMut(ResourceRef)) {
        let list = self.list.lock();
        for resource in list.iter() {
            f(resource);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.list.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.list.lock().len()
    }
}
