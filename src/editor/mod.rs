pub mod registry;

pub use registry::{Node, NodeKind, NodeView, NodeViewRegistry, RenderFn};
