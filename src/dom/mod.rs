//! Document Model
//!
//! A typed stand-in for the host page's live tree. The update client patches
//! this tree instead of splicing raw markup strings, which makes the
//! single-root precondition on incoming fragments explicit and checkable.

mod fragment;
mod node;

pub use fragment::{FragmentError, FragmentResult, parse_fragment};
pub use node::{Element, Node, escape_html};
