//! Edge types exchanged with the editor.
//!
//! The engine consumes the editor's edge list either one edge at a time
//! (`add_edge`) or wholesale (`build_from_edges`). See [`Edge`].

mod edge;

pub use edge::{Edge, EdgeKind};
