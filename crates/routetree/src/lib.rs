#![forbid(unsafe_code)]

//! Route tree public facade and prelude.
//!
//! This crate provides the stable surface area for users. It re-exports the
//! tree engine and the signal primitive and offers a lightweight prelude for
//! day-to-day usage.
//!
//! # Example
//!
//! ```
//! use routetree::prelude::*;
//!
//! let mut tree = RouteTree::new(Segment::new("app").unwrap());
//! let root = tree.root();
//!
//! let mut feed = tree.subscribe_active_descendants(root);
//!
//! let path: RoutePath = "/settings/profile".parse().unwrap();
//! let profile = tree.resolve(root, &path);
//! tree.set_active(profile, true);
//!
//! assert_eq!(tree.active_path(root).len(), 2);
//! assert_eq!(feed.drain().last().unwrap().len(), 2);
//! ```

// --- Core re-exports -------------------------------------------------------

pub use routetree_core::path::{InvalidName, PathStep, RoutePath, SEPARATOR, Segment};
pub use routetree_core::tree::{NodeId, RouteTree};

// --- Signal re-exports -----------------------------------------------------

pub use routetree_signal::{ChangeSignal, SignalFeed};

// --- Prelude ---------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ChangeSignal, InvalidName, NodeId, PathStep, RoutePath, RouteTree, Segment, SignalFeed,
    };
}
