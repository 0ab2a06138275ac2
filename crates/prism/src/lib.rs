//! Intrusively-listed display-server objects: output modes and client
//! resource handles.
//!
//! Both object kinds embed a [`tether::linked_list::Link`] and are owned
//! by their respective subsystems (the output backend, the resource
//! layer); the lists here only thread through them. Each kind resolves
//! through its own handle type, so a link threaded through one list
//! cannot be resolved against the other owner type:
//!
//! ```compile_fail
//! use prism::{ModeList, Resource, ResourceRef};
//!
//! let res = Resource::new(1, 1, 1, "wl_output");
//! let mut modes = ModeList::new();
//! // A resource handle is not an output mode.
//! unsafe { modes.push_back(ResourceRef::new(&res)) };
//! ```

#![cfg_attr(not(test), no_std)]

pub mod mode;
pub mod resource;

pub use mode::{resolve_output_mode, ModeList, OutputMode, OutputModeRef};
pub use resource::{resolve_resource, Resource, ResourceList, ResourceRef};
