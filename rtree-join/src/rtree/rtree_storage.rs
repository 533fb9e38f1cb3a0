//! Disk storage for R-Trees.
//!
//! A tree is stored as a flat sequence of fixed-size pages, one per node,
//! where page `i` holds node `i`. Only level-ordered trees can be written,
//! so the root is always page 0.
//!
//! Loading reads the whole file into one buffer before decoding it. The
//! buffer is reserved up front and a failed reservation is reported as
//! [`SpatialError::Capacity`] instead of aborting the process.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::config::LoadOptions;

use super::page_codec::{decode_page, encode_node, PageLayout};
use super::rtree_impl::RTree;
use super::rtree_types::{Node, NodeId, SpatialError, SpatialResult};

/// Writes every node of `tree` as one page, in node id order.
pub fn save_tree(tree: &RTree, path: &Path, max_entries: usize) -> SpatialResult<()> {
    if !tree.is_level_ordered() {
        return Err(SpatialError::Format(
            "tree must be renumbered in level order before it can be saved".to_string(),
        ));
    }
    if let Some(node) = tree.nodes().iter().find(|n| n.len() > max_entries) {
        return Err(SpatialError::Format(format!(
            "node {} holds {} entries but pages are sized for {}",
            node.id,
            node.len(),
            max_entries
        )));
    }

    let layout = PageLayout::new(max_entries);
    let mut writer = BufWriter::new(File::create(path)?);
    let mut page = vec![0u8; layout.page_bytes()];
    for node in tree.nodes() {
        encode_node(node, &layout, &mut page)?;
        writer.write_all(&page)?;
    }
    writer.flush()?;

    log::info!(
        "Saved {} nodes ({} bytes per page) to {:?}",
        tree.node_count(),
        layout.page_bytes(),
        path
    );
    Ok(())
}

/// Reads a whole file into memory, refusing files that exceed `limit` or
/// that cannot be buffered.
pub(crate) fn read_file_bounded(path: &Path, limit: Option<u64>) -> SpatialResult<Vec<u8>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    let capacity_error = || SpatialError::Capacity {
        requested: len,
        limit,
    };
    if limit.is_some_and(|limit| len > limit) {
        return Err(capacity_error());
    }
    let size = usize::try_from(len).map_err(|_| capacity_error())?;

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(size)
        .map_err(|_| capacity_error())?;
    file.read_to_end(&mut buffer)?;

    log::debug!("Buffered {} bytes from {:?}", buffer.len(), path);
    Ok(buffer)
}

/// Reads a tree written by [`save_tree`] with the same `max_entries`.
///
/// Fails with [`SpatialError::Format`] when the pages do not form a sound
/// tree, including stored bounds that differ from the entries they cover.
pub fn load_tree(path: &Path, options: &LoadOptions) -> SpatialResult<RTree> {
    if options.max_entries == 0 {
        return Err(SpatialError::Format(
            "max_entries must be at least 1 to size pages".to_string(),
        ));
    }
    let layout = PageLayout::new(options.max_entries);
    let buffer = read_file_bounded(path, options.buffer_limit)?;
    let nodes = decode_pages(&buffer, &layout)?;

    let tree = RTree::from_parts(nodes, 0, options.max_entries, 0);
    // joins prune on the stored bounds, so they must match the entries
    tree.check_bounds()?;

    log::info!("Loaded {} nodes from {:?}", tree.node_count(), path);
    Ok(tree)
}

/// Decodes every page, then resolves child references.
fn decode_pages(buffer: &[u8], layout: &PageLayout) -> SpatialResult<Vec<Node>> {
    let page_bytes = layout.page_bytes();
    if buffer.is_empty() {
        return Err(SpatialError::Format("index file is empty".to_string()));
    }
    if buffer.len() % page_bytes != 0 {
        return Err(SpatialError::Format(format!(
            "file size {} is not a multiple of the page size {}",
            buffer.len(),
            page_bytes
        )));
    }
    let page_count = buffer.len() / page_bytes;
    if page_count > NodeId::MAX as usize {
        return Err(SpatialError::Format(format!(
            "file holds {} pages, more than node ids can address",
            page_count
        )));
    }

    let mut nodes = Vec::with_capacity(page_count);
    for (index, page) in buffer.chunks_exact(page_bytes).enumerate() {
        let raw = decode_page(page, layout)?;
        if raw.node_id as usize != index {
            return Err(SpatialError::Format(format!(
                "page {} carries node id {}",
                index, raw.node_id
            )));
        }
        nodes.push(raw.into_node());
    }

    resolve_children(&nodes)?;
    Ok(nodes)
}

/// Every child id must name a later page, and every page except the root
/// must be referenced exactly once.
fn resolve_children(nodes: &[Node]) -> SpatialResult<()> {
    let mut referenced = vec![false; nodes.len()];
    for node in nodes {
        for child in node.children() {
            let target = child.child as usize;
            if target >= nodes.len() {
                return Err(SpatialError::Format(format!(
                    "node {} references child {} but the file has {} pages",
                    node.id,
                    child.child,
                    nodes.len()
                )));
            }
            if child.child <= node.id {
                return Err(SpatialError::Format(format!(
                    "node {} references child {} out of level order",
                    node.id, child.child
                )));
            }
            if referenced[target] {
                return Err(SpatialError::Format(format!(
                    "node {} is referenced more than once",
                    child.child
                )));
            }
            referenced[target] = true;
        }
    }
    if let Some(orphan) = referenced.iter().skip(1).position(|seen| !seen) {
        return Err(SpatialError::Format(format!(
            "node {} is not reachable from the root",
            orphan + 1
        )));
    }
    Ok(())
}
