#![forbid(unsafe_code)]

//! Core: the route tree, active-state propagation, and the path boundary.

pub mod path;
pub mod tree;

pub use path::{InvalidName, PathStep, RoutePath, SEPARATOR, Segment};
pub use tree::{NodeId, RouteTree};
