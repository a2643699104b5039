//! Ownership and visibility checks.
//!
//! Callers turn a failed check into `NotFound` so that a node the caller
//! may not see is indistinguishable from one that does not exist.

use super::Node;

/// Whether `caller` may read `node`. Anonymous callers see public nodes only.
pub fn can_read(node: &Node, caller: Option<i64>) -> bool {
    node.is_public || caller == Some(node.user_id)
}

/// Whether `caller` may publish, unpublish or delete `node`.
pub fn can_modify(node: &Node, caller: i64) -> bool {
    node.user_id == caller
}
