// src/extractors/hierarchy.rs
//! Parent/child relationships between index entries.
//!
//! SECTION-N markers are siblings in the markup, so nesting is derived from
//! the ordering key and the level number alone: a section's children are the
//! level L+1 entries that follow it before the next entry at level <= L.
//! Entries more than one level deeper that appear before any L+1 entry
//! (level gaps in malformed reports) belong to no parent and are left out.

use crate::extractors::index::{IndexEntry, SectionIndex};

/// Direct children of `entry`, in key order.
pub fn children_of<'i, 'a>(entry: &IndexEntry<'_>, index: &'i SectionIndex<'a>) -> Vec<&'i IndexEntry<'a>> {
    let level = entry.level();
    let mut children = Vec::new();

    for candidate in index.entries_after(entry) {
        if candidate.level() <= level {
            break; // sibling of `entry`, or an ancestor's next sibling
        }
        if candidate.level() == level + 1 {
            children.push(candidate);
        }
    }

    children
}

/// The entry whose [`children_of`] contains `entry`, if any.
pub fn parent_of<'i, 'a>(entry: &IndexEntry<'_>, index: &'i SectionIndex<'a>) -> Option<&'i IndexEntry<'a>> {
    let level = entry.level();
    index
        .entries_before(entry)
        .iter()
        .rev()
        .find(|candidate| candidate.level() < level)
        .filter(|candidate| candidate.level() + 1 == level)
}

/// Ancestors of `entry`, outermost first.
pub fn ancestors_of<'i, 'a>(entry: &IndexEntry<'_>, index: &'i SectionIndex<'a>) -> Vec<&'i IndexEntry<'a>> {
    let mut ancestors = Vec::new();
    let mut current = parent_of(entry, index);
    while let Some(parent) = current {
        ancestors.push(parent);
        current = parent_of(parent, index);
    }
    ancestors.reverse();
    ancestors
}
