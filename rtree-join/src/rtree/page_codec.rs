//! Fixed-size page encoding of R-Tree nodes.
//!
//! Every node occupies one page of [`PageLayout::page_bytes`] bytes:
//!
//! ```text
//! header (64 bytes):  leaf u32 | count u32 | node_id u32 | low0 high0 low1 high1 (f32 x4) | zero padding
//! data (64 bytes per block, ceil(max_entries / 3) blocks):
//!     3 slots per block, each: id u32 | low0 high0 low1 high1 (f32 x4); 4 bytes zero padding
//! ```
//!
//! All fields are little-endian. In a leaf the slot id is an object id, in a
//! directory it is the node id of the child. Unused slots and padding are zero.

use serde::{Deserialize, Serialize};

use crate::mbr::Mbr;

use super::rtree_constants::{
    DATA_BLOCK_BYTES, ENTRY_SLOT_BYTES, PAGE_HEADER_BYTES, PAGE_HEADER_META_BYTES,
    SLOTS_PER_BLOCK,
};
use super::rtree_types::{
    ChildRef, Entry, Node, NodeEntries, NodeId, SpatialError, SpatialResult,
};

/// Page geometry derived from `max_entries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    max_entries: usize,
}

impl PageLayout {
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn header_bytes(&self) -> usize {
        PAGE_HEADER_BYTES
    }

    pub fn data_blocks(&self) -> usize {
        self.max_entries.div_ceil(SLOTS_PER_BLOCK)
    }

    pub fn data_bytes(&self) -> usize {
        self.data_blocks() * DATA_BLOCK_BYTES
    }

    pub fn page_bytes(&self) -> usize {
        self.header_bytes() + self.data_bytes()
    }

    /// Number of slots the data area holds (a multiple of 3, at least `max_entries`).
    pub fn slot_capacity(&self) -> usize {
        self.data_blocks() * SLOTS_PER_BLOCK
    }

    /// Byte offset of slot `i` within a page.
    #[inline]
    pub fn slot_offset(&self, i: usize) -> usize {
        PAGE_HEADER_BYTES
            + (i / SLOTS_PER_BLOCK) * DATA_BLOCK_BYTES
            + (i % SLOTS_PER_BLOCK) * ENTRY_SLOT_BYTES
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct PageHeader {
    leaf: u32,
    count: u32,
    node_id: u32,
    mbr: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct EntrySlot {
    id: u32,
    mbr: [f32; 4],
}

/// A decoded page whose child references are not yet checked against the
/// rest of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub node_id: NodeId,
    pub mbr: Mbr,
    pub leaf: bool,
    /// `(id, rectangle)` per used slot
    pub slots: Vec<(u32, Mbr)>,
}

impl RawPage {
    pub fn into_node(self) -> Node {
        let entries = if self.leaf {
            NodeEntries::Leaf(
                self.slots
                    .into_iter()
                    .map(|(id, mbr)| Entry::new(id, mbr))
                    .collect(),
            )
        } else {
            NodeEntries::Directory(
                self.slots
                    .into_iter()
                    .map(|(child, mbr)| ChildRef { mbr, child })
                    .collect(),
            )
        };
        Node {
            id: self.node_id,
            mbr: self.mbr,
            entries,
        }
    }
}

fn encode_into<T: Serialize>(value: &T, dst: &mut [u8]) -> SpatialResult<usize> {
    bincode::serde::encode_into_slice(value, dst, bincode::config::legacy())
        .map_err(|e| SpatialError::Format(format!("failed to encode page: {}", e)))
}

fn decode_from<T: serde::de::DeserializeOwned>(src: &[u8]) -> SpatialResult<T> {
    bincode::serde::decode_from_slice(src, bincode::config::legacy())
        .map(|(value, _)| value)
        .map_err(|e| SpatialError::Format(format!("failed to decode page: {}", e)))
}

/// Writes `node` into `page`, which must be exactly `layout.page_bytes()` long.
///
/// The page is zeroed first, so padding and unused slots are always zero.
pub fn encode_node(node: &Node, layout: &PageLayout, page: &mut [u8]) -> SpatialResult<()> {
    if page.len() != layout.page_bytes() {
        return Err(SpatialError::Format(format!(
            "page buffer is {} bytes, layout needs {}",
            page.len(),
            layout.page_bytes()
        )));
    }
    if node.len() > layout.max_entries() {
        return Err(SpatialError::Format(format!(
            "node {} holds {} entries, page fits {}",
            node.id,
            node.len(),
            layout.max_entries()
        )));
    }

    page.fill(0);
    let header = PageHeader {
        leaf: u32::from(node.is_leaf()),
        count: node.len() as u32,
        node_id: node.id,
        mbr: node.mbr.to_array(),
    };
    encode_into(&header, &mut page[..PAGE_HEADER_META_BYTES])?;

    let slots: Vec<EntrySlot> = match &node.entries {
        NodeEntries::Leaf(entries) => entries
            .iter()
            .map(|e| EntrySlot {
                id: e.id,
                mbr: e.mbr.to_array(),
            })
            .collect(),
        NodeEntries::Directory(children) => children
            .iter()
            .map(|c| EntrySlot {
                id: c.child,
                mbr: c.mbr.to_array(),
            })
            .collect(),
    };
    for (i, slot) in slots.iter().enumerate() {
        let offset = layout.slot_offset(i);
        encode_into(slot, &mut page[offset..offset + ENTRY_SLOT_BYTES])?;
    }
    Ok(())
}

/// Reads one page. Checks the header fields but not child references.
pub fn decode_page(page: &[u8], layout: &PageLayout) -> SpatialResult<RawPage> {
    if page.len() != layout.page_bytes() {
        return Err(SpatialError::Format(format!(
            "page is {} bytes, layout needs {}",
            page.len(),
            layout.page_bytes()
        )));
    }

    let header: PageHeader = decode_from(&page[..PAGE_HEADER_META_BYTES])?;
    let leaf = match header.leaf {
        0 => false,
        1 => true,
        other => {
            return Err(SpatialError::Format(format!(
                "page of node {} has leaf flag {}",
                header.node_id, other
            )))
        }
    };
    let count = header.count as usize;
    // slots past max_entries are block padding, never entries
    if count == 0 || count > layout.max_entries() {
        return Err(SpatialError::Format(format!(
            "page of node {} claims {} entries, page fits 1..={}",
            header.node_id,
            count,
            layout.max_entries()
        )));
    }

    let mut slots = Vec::with_capacity(count);
    for i in 0..count {
        let offset = layout.slot_offset(i);
        let slot: EntrySlot = decode_from(&page[offset..offset + ENTRY_SLOT_BYTES])?;
        slots.push((slot.id, Mbr::from_array(slot.mbr)));
    }

    Ok(RawPage {
        node_id: header.node_id,
        mbr: Mbr::from_array(header.mbr),
        leaf,
        slots,
    })
}
