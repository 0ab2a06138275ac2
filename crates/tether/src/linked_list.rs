use core::{cell::Cell, fmt::Debug, marker::PhantomData, ptr::NonNull};

use crate::Node;

/// A doubly-linked intrusive list of externally-owned nodes.
///
/// The list value itself plays the sentinel role: traversal starts and
/// ends at it, and the links only carry next/prev relations between
/// sibling nodes. Elements are allocated and owned elsewhere; pushing a
/// node merely splices its embedded [`Link`] into the chain.
pub struct LinkedList<T> {
    inner: UnsafeLinkedList,
    _p: PhantomData<fn(T)>,
}

impl<T> LinkedList<T> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeLinkedList::new(),
            _p: PhantomData,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T> Debug for LinkedList<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LinkedList").finish_non_exhaustive()
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinkedList<T>
where
    T: Node<Link>,
{
    #[inline]
    pub fn push_back(&mut self, node: T) {
        let link = T::into_link(node);
        unsafe { self.inner.push_back(link) };
    }

    #[inline]
    pub fn push_front(&mut self, node: T) {
        let link = T::into_link(node);
        unsafe { self.inner.push_front(link) };
    }

    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        unsafe {
            let link = self.inner.pop_front()?;
            Some(T::from_link(link))
        }
    }

    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        unsafe {
            let link = self.inner.pop_back()?;
            Some(T::from_link(link))
        }
    }

    /// Unlinks `node` from this list.
    ///
    /// # Safety
    /// The node's link must currently be threaded into this list and no
    /// other.
    #[inline]
    pub unsafe fn remove(&mut self, node: T) {
        let link = T::into_link(node);
        self.inner.remove(link);
    }

    pub fn len(&self) -> usize {
        unsafe { self.inner.len() }
    }
}

impl<T> LinkedList<T>
where
    T: Node<Link> + Copy,
{
    /// Visits every node in order, resolving each link back to its owner
    /// handle. The list is left untouched.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            cur: self.inner.head,
            _p: PhantomData,
        }
    }
}

pub struct Iter<'a, T> {
    cur: Option<NonNull<Link>>,
    _p: PhantomData<&'a LinkedList<T>>,
}

impl<'a, T> Iterator for Iter<'a, T>
where
    T: Node<Link> + Copy,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.cur?;
        self.cur = unsafe { link.as_ref().next.get() };
        Some(unsafe { T::from_link(link) })
    }
}

#[derive(Debug, Default)]
pub struct UnsafeLinkedList {
    head: Option<NonNull<Link>>,
    tail: Option<NonNull<Link>>,
}

impl UnsafeLinkedList {
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub unsafe fn push_back(&mut self, link: NonNull<Link>) {
        link.as_ref().next.set(None);
        link.as_ref().prev.set(self.tail);

        if let Some(tail) = self.tail {
            tail.as_ref().next.set(Some(link));
        } else {
            self.head = Some(link);
        }
        self.tail = Some(link);
    }

    pub unsafe fn push_front(&mut self, link: NonNull<Link>) {
        link.as_ref().prev.set(None);
        link.as_ref().next.set(self.head);

        if let Some(head) = self.head {
            head.as_ref().prev.set(Some(link));
        } else {
            self.tail = Some(link);
        }
        self.head = Some(link);
    }

    pub unsafe fn pop_front(&mut self) -> Option<NonNull<Link>> {
        let head = self.head?;
        match head.as_ref().next.get() {
            Some(next) => {
                next.as_ref().prev.set(None);
                self.head = Some(next);
            }
            None => {
                self.head = None;
                self.tail = None;
            }
        }
        head.as_ref().clear();
        Some(head)
    }

    pub unsafe fn pop_back(&mut self) -> Option<NonNull<Link>> {
        let tail = self.tail?;
        match tail.as_ref().prev.get() {
            Some(prev) => {
                prev.as_ref().next.set(None);
                self.tail = Some(prev);
            }
            None => {
                self.head = None;
                self.tail = None;
            }
        }
        tail.as_ref().clear();
        Some(tail)
    }

    pub unsafe fn remove(&mut self, link: NonNull<Link>) {
        let prev = link.as_ref().prev.get();
        let next = link.as_ref().next.get();

        match prev {
            Some(prev) => prev.as_ref().next.set(next),
            None => self.head = next,
        }
        match next {
            Some(next) => next.as_ref().prev.set(prev),
            None => self.tail = prev,
        }
        link.as_ref().clear();
    }

    pub unsafe fn insert_after(&mut self, after: NonNull<Link>, link: NonNull<Link>) {
        let next = after.as_ref().next.get();
        link.as_ref().prev.set(Some(after));
        link.as_ref().next.set(next);
        after.as_ref().next.set(Some(link));

        match next {
            Some(next) => next.as_ref().prev.set(Some(link)),
            None => self.tail = Some(link),
        }
    }

    pub unsafe fn insert_before(&mut self, before: NonNull<Link>, link: NonNull<Link>) {
        let prev = before.as_ref().prev.get();
        link.as_ref().next.set(Some(before));
        link.as_ref().prev.set(prev);
        before.as_ref().prev.set(Some(link));

        match prev {
            Some(prev) => prev.as_ref().next.set(Some(link)),
            None => self.head = Some(link),
        }
    }

    /// Splices every node of `other` onto the back of this list, leaving
    /// `other` empty.
    pub unsafe fn append(&mut self, other: &mut UnsafeLinkedList) {
        let other_head = match other.head {
            Some(head) => head,
            None => return,
        };

        match self.tail {
            Some(tail) => {
                tail.as_ref().next.set(Some(other_head));
                other_head.as_ref().prev.set(Some(tail));
            }
            None => self.head = other.head,
        }
        self.tail = other.tail;

        other.head = None;
        other.tail = None;
    }

    pub unsafe fn len(&self) -> usize {
        let mut count = 0;
        let mut cur = self.head;
        while let Some(link) = cur {
            count += 1;
            cur = link.as_ref().next.get();
        }
        count
    }
}

unsafe impl Send for UnsafeLinkedList {}
unsafe impl Sync for UnsafeLinkedList {}

/// The embedded list node.
///
/// Owners hold a `Link` by value; it carries only next/prev relations and
/// no owner pointer. A link may be threaded into at most one list at a
/// time, and mutation of the surrounding list must be externally
/// serialized.
#[derive(Debug, Default)]
pub struct Link {
    next: Cell<Option<NonNull<Link>>>,
    prev: Cell<Option<NonNull<Link>>>,
}

impl Link {
    #[inline]
    pub const fn new() -> Self {
        Link {
            next: Cell::new(None),
            prev: Cell::new(None),
        }
    }

    fn clear(&self) {
        self.next.set(None);
        self.prev.set(None);
    }
}

unsafe impl Send for Link {}
unsafe impl Sync for Link {}

#[cfg(test)]
mod tests {
    use core::ptr::NonNull;

    use super::{Link, LinkedList};
    use crate::{container_of_non_null, offset_of, Node};

    struct Entry {
        value: u32,
        link: Link,
    }

    impl Entry {
        fn new(value: u32) -> Self {
            Entry {
                value,
                link: Link::new(),
            }
        }
    }

    #[derive(Clone, Copy)]
    struct EntryRef(NonNull<Entry>);

    impl EntryRef {
        fn new(entry: &Entry) -> Self {
            Self(NonNull::from(entry))
        }

        fn value(&self) -> u32 {
            unsafe { self.0.as_ref().value }
        }
    }

    impl Node<Link> for EntryRef {
        fn into_link(node: Self) -> NonNull<Link> {
            unsafe { NonNull::from(&node.0.as_ref().link) }
        }

        unsafe fn from_link(link: NonNull<Link>) -> Self {
            Self(container_of_non_null!(link, Entry, link))
        }
    }

    #[test]
    fn push_pop_fifo() {
        let a = Entry::new(1);
        let b = Entry::new(2);
        let c = Entry::new(3);

        let mut list = LinkedList::new();
        list.push_back(EntryRef::new(&a));
        list.push_back(EntryRef::new(&b));
        list.push_back(EntryRef::new(&c));

        assert_eq!(list.len(), 3);
        assert_eq!(list.pop_front().unwrap().value(), 1);
        assert_eq!(list.pop_front().unwrap().value(), 2);
        assert_eq!(list.pop_front().unwrap().value(), 3);
        assert!(list.pop_front().is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn push_front_and_pop_back() {
        let a = Entry::new(1);
        let b = Entry::new(2);

        let mut list = LinkedList::new();
        list.push_front(EntryRef::new(&a));
        list.push_front(EntryRef::new(&b));

        assert_eq!(list.pop_back().unwrap().value(), 1);
        assert_eq!(list.pop_back().unwrap().value(), 2);
        assert!(list.pop_back().is_none());
    }

    #[test]
    fn remove_middle() {
        let a = Entry::new(1);
        let b = Entry::new(2);
        let c = Entry::new(3);

        let mut list = LinkedList::new();
        list.push_back(EntryRef::new(&a));
        list.push_back(EntryRef::new(&b));
        list.push_back(EntryRef::new(&c));

        unsafe { list.remove(EntryRef::new(&b)) };

        let values: Vec<u32> = list.iter().map(|e| e.value()).collect();
        assert_eq!(values, [1, 3]);
    }

    #[test]
    fn remove_ends_updates_list() {
        let a = Entry::new(1);
        let b = Entry::new(2);
        let c = Entry::new(3);

        let mut list = LinkedList::new();
        list.push_back(EntryRef::new(&a));
        list.push_back(EntryRef::new(&b));
        list.push_back(EntryRef::new(&c));

        unsafe { list.remove(EntryRef::new(&a)) };
        unsafe { list.remove(EntryRef::new(&c)) };

        assert_eq!(list.len(), 1);
        assert_eq!(list.pop_front().unwrap().value(), 2);
        assert!(list.is_empty());
    }

    #[test]
    fn single_element_removal_empties_both_ends() {
        let a = Entry::new(1);

        let mut list = LinkedList::new();
        list.push_back(EntryRef::new(&a));
        unsafe { list.remove(EntryRef::new(&a)) };

        assert!(list.is_empty());
        assert!(list.pop_front().is_none());
        assert!(list.pop_back().is_none());
    }

    #[test]
    fn insert_after_and_before_update_ends() {
        let a = Entry::new(1);
        let b = Entry::new(2);
        let c = Entry::new(3);
        let d = Entry::new(4);

        let mut list: LinkedList<EntryRef> = LinkedList::new();
        list.push_back(EntryRef::new(&b));

        let link_a = EntryRef::into_link(EntryRef::new(&a));
        let link_b = EntryRef::into_link(EntryRef::new(&b));
        let link_c = EntryRef::into_link(EntryRef::new(&c));
        let link_d = EntryRef::into_link(EntryRef::new(&d));

        unsafe {
            // b is both head and tail; both inserts must move an end.
            list.inner.insert_before(link_b, link_a);
            list.inner.insert_after(link_b, link_c);
            list.inner.insert_after(link_c, link_d);
        }

        let values: Vec<u32> = list.iter().map(|e| e.value()).collect();
        assert_eq!(values, [1, 2, 3, 4]);

        assert_eq!(list.pop_front().unwrap().value(), 1);
        assert_eq!(list.pop_back().unwrap().value(), 4);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn append_splices_and_drains() {
        let a = Entry::new(1);
        let b = Entry::new(2);
        let c = Entry::new(3);

        let mut left: LinkedList<EntryRef> = LinkedList::new();
        let mut right: LinkedList<EntryRef> = LinkedList::new();
        left.push_back(EntryRef::new(&a));
        right.push_back(EntryRef::new(&b));
        right.push_back(EntryRef::new(&c));

        unsafe { left.inner.append(&mut right.inner) };

        let values: Vec<u32> = left.iter().map(|e| e.value()).collect();
        assert_eq!(values, [1, 2, 3]);
        assert!(right.is_empty());
    }

    #[test]
    fn round_trip_resolves_to_original_address() {
        let a = Entry::new(7);

        let link = EntryRef::into_link(EntryRef::new(&a));
        let resolved = unsafe { EntryRef::from_link(link) };

        assert!(core::ptr::eq(resolved.0.as_ptr(), &a));
    }

    #[test]
    fn raw_container_of_matches_typed_resolution() {
        let a = Entry::new(9);

        let link: *const Link = &a.link;
        let owner = unsafe { crate::container_of!(link, Entry, link) };

        assert!(core::ptr::eq(owner, &a));
    }

    #[test]
    fn offset_is_instance_independent() {
        let a = Entry::new(1);
        let b = Entry::new(2);

        let offset = offset_of!(Entry, link);
        let offset_a = &a.link as *const Link as usize - &a as *const Entry as usize;
        let offset_b = &b.link as *const Link as usize - &b as *const Entry as usize;

        assert_eq!(offset, offset_a);
        assert_eq!(offset, offset_b);
    }

    #[test]
    fn resolution_does_not_mutate_owner() {
        let a = Entry::new(42);
        let mut list = LinkedList::new();
        list.push_back(EntryRef::new(&a));

        let next_before = a.link.next.get();
        let prev_before = a.link.prev.get();

        for entry in list.iter() {
            assert_eq!(entry.value(), 42);
        }

        assert_eq!(a.value, 42);
        assert_eq!(a.link.next.get(), next_before);
        assert_eq!(a.link.prev.get(), prev_before);
    }

    #[test]
    fn iter_preserves_list() {
        let a = Entry::new(1);
        let b = Entry::new(2);

        let mut list = LinkedList::new();
        list.push_back(EntryRef::new(&a));
        list.push_back(EntryRef::new(&b));

        let first: Vec<u32> = list.iter().map(|e| e.value()).collect();
        let second: Vec<u32> = list.iter().map(|e| e.value()).collect();
        assert_eq!(first, second);
        assert_eq!(list.len(), 2);
    }
}
