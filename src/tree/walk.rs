//! Root-to-leaf path traversal.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};

use super::node::Node;
use super::{dir, Mount};

/// Visitor verdict for [`walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    Stop,
}

/// Call `visit` for the root and each successive component of `path`,
/// target included. Each component resolves registry-first, falling back
/// to a listing lookup in the already-visited parent; an unresolvable
/// component fails the walk with [`Error::NotFound`].
///
/// The walker holds a reference on the current entry at all times and
/// hands it to `visit`; the visitor clones the `Arc` if it wants to
/// retain it.
pub fn walk<F>(ctx: &Mount, path: &str, mut visit: F) -> Result<()>
where
    F: FnMut(&Arc<Node>) -> Walk,
{
    let mut cur = ctx.root().clone();
    if visit(&cur) == Walk::Stop {
        return Ok(());
    }

    let mut prefix = String::new();
    for component in path.split('/').filter(|c| !c.is_empty()) {
        prefix.push('/');
        prefix.push_str(component);

        let next = match ctx.registry().get(&prefix) {
            Some(node) => node,
            None => match dir::find(ctx, &cur, component)? {
                Some(node) => node,
                None => {
                    debug!(path, component, "walk failed to resolve component");
                    return Err(Error::NotFound);
                }
            },
        };

        cur = next;
        if visit(&cur) == Walk::Stop {
            return Ok(());
        }
    }
    Ok(())
}

/// Resolve a normalised path to a referenced entry.
pub fn lookup(ctx: &Mount, path: &str) -> Result<Arc<Node>> {
    let mut found = ctx.root().clone();
    walk(ctx, path, |node| {
        found = node.clone();
        Walk::Continue
    })?;
    Ok(found)
}
