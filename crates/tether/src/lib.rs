//! Intrusive linked lists for externally-owned objects.
//!
//! Owners embed a [`linked_list::Link`] by value and are threaded into a
//! list through it; the list never allocates or owns its elements. Walking
//! a list yields link pointers, and the [`Node`] trait (or the raw
//! [`container_of!`] macros) translates a link back to the structure it is
//! embedded in.

#![cfg_attr(not(test), no_std)]

use core::ptr::NonNull;

pub use memoffset::offset_of;

pub mod linked_list;

/// Conversion between an owner handle and the link embedded inside it.
///
/// `from_link` is the inverse of `into_link`: it recovers the owner from a
/// pointer to its embedded link by subtracting the link field's offset. It
/// performs no allocation, no mutation, and no validation.
pub trait Node<Link> {
    /// Yields a pointer to the link embedded in this node.
    ///
    /// A pure address computation; the node may or may not currently be
    /// threaded into a list. A link must be unlinked before it is spliced
    /// into a list, but that obligation sits on the splicing operation,
    /// not here.
    fn into_link(node: Self) -> NonNull<Link>;

    /// # Safety
    /// The link pointer must point at the link field of a live owner of
    /// this type. It must have been produced by `into_link` or by walking
    /// a list that only ever held links of this owner type.
    unsafe fn from_link(link: NonNull<Link>) -> Self;
}

/// Recovers a raw pointer to the structure containing `$field`.
///
/// Must be invoked in an unsafe context. The pointer must point at the
/// named field of a live instance of `$container`; anything else is
/// undefined behavior.
#[macro_export]
macro_rules! container_of {
    ($ptr:expr, $container:path, $field:ident) => {{
        ($ptr as *const _ as *const u8).sub($crate::offset_of!($container, $field))
            as *const $container
    }};
}

/// [`container_of!`] over [`core::ptr::NonNull`] pointers.
///
/// Must be invoked in an unsafe context, with the same preconditions as
/// [`container_of!`].
#[macro_export]
macro_rules! container_of_non_null {
    ($ptr:expr, $container:path, $field:ident) => {{
        ::core::ptr::NonNull::new_unchecked(
            ($ptr.cast::<u8>().as_ptr()).sub($crate::offset_of!($container, $field))
                as *mut $container,
        )
    }};
}
