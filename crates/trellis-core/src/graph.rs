//! Forward/reverse link adjacency over the note store
//!
//! The reverse map is maintained as the exact transpose of the forward map
//! after every mutation: `b ∈ forward[a] ⟺ a ∈ reverse[b]`. Dangling
//! targets appear as reverse-map keys so that a note created later
//! immediately sees the incoming links that were authored before it
//! existed.

use std::collections::{BTreeSet, HashMap};

use crate::model::{DirectedLink, Note, NoteId};

/// Notes whose cached analysis is affected by a mutation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TouchedNotes {
    pub ids: BTreeSet<NoteId>,
    /// Set when the total note count changed; density depends on corpus
    /// size, so this widens invalidation to every cached analysis.
    pub count_changed: bool,
}

impl TouchedNotes {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && !self.count_changed
    }

    pub fn merge(&mut self, other: TouchedNotes) {
        self.ids.extend(other.ids);
        self.count_changed |= other.count_changed;
    }
}

/// The link graph: note records plus forward and derived reverse adjacency.
#[derive(Default)]
pub struct LinkGraph {
    notes: HashMap<NoteId, Note>,
    forward: HashMap<NoteId, BTreeSet<NoteId>>,
    reverse: HashMap<NoteId, BTreeSet<NoteId>>,
}

impl std::fmt::Debug for LinkGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkGraph")
            .field("note_count", &self.notes.len())
            .field("link_count", &self.link_count())
            .finish()
    }
}

impl LinkGraph {
    pub fn new() -> Self {
        LinkGraph::default()
    }

    /// Insert or replace a note, patching only the reverse entries in the
    /// symmetric difference of the old and new target sets.
    pub fn upsert(&mut self, note: Note) -> TouchedNotes {
        let id = note.id.clone();
        let old_targets = self.forward.get(&id).cloned().unwrap_or_default();
        let new_targets = note.links.clone();

        for gone in old_targets.difference(&new_targets) {
            if let Some(sources) = self.reverse.get_mut(gone) {
                sources.remove(&id);
                if sources.is_empty() {
                    self.reverse.remove(gone);
                }
            }
        }
        for added in new_targets.difference(&old_targets) {
            self.reverse.entry(added.clone()).or_default().insert(id.clone());
        }

        let is_new = !self.notes.contains_key(&id);
        self.forward.insert(id.clone(), new_targets.clone());
        self.notes.insert(id.clone(), note);

        let mut ids: BTreeSet<NoteId> = old_targets
            .symmetric_difference(&new_targets)
            .cloned()
            .collect();
        ids.insert(id);
        TouchedNotes { ids, count_changed: is_new }
    }

    /// Delete a note and its outgoing edges. Links *to* the removed id are
    /// kept: they become dangling data and resolve again if the note is
    /// recreated. Returns `None` when the id was not indexed.
    pub fn remove(&mut self, id: &NoteId) -> Option<TouchedNotes> {
        self.notes.remove(id)?;
        let old_targets = self.forward.remove(id).unwrap_or_default();
        for target in &old_targets {
            if let Some(sources) = self.reverse.get_mut(target) {
                sources.remove(id);
                if sources.is_empty() {
                    self.reverse.remove(target);
                }
            }
        }

        let mut ids = old_targets;
        ids.extend(self.incoming(id).cloned());
        ids.insert(id.clone());
        Some(TouchedNotes { ids, count_changed: true })
    }

    pub fn clear(&mut self) {
        self.notes.clear();
        self.forward.clear();
        self.reverse.clear();
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.notes.contains_key(id)
    }

    /// Outgoing targets of a note, dangling targets included.
    pub fn outgoing(&self, id: &NoteId) -> impl Iterator<Item = &NoteId> {
        self.forward.get(id).into_iter().flatten()
    }

    /// Sources linking to an id. Defined for dangling targets too.
    pub fn incoming(&self, id: &NoteId) -> impl Iterator<Item = &NoteId> {
        self.reverse.get(id).into_iter().flatten()
    }

    /// Neighbors reachable by following a link in either direction,
    /// restricted to indexed notes. Dangling targets are data, not
    /// traversable nodes.
    pub fn undirected_neighbors(&self, id: &NoteId) -> BTreeSet<NoteId> {
        self.outgoing(id)
            .chain(self.incoming(id))
            .filter(|n| self.notes.contains_key(*n))
            .cloned()
            .collect()
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    /// Total authored links, dangling included.
    pub fn link_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Links whose target is an indexed note.
    pub fn resolved_link_count(&self) -> usize {
        self.forward
            .values()
            .map(|targets| targets.iter().filter(|t| self.notes.contains_key(*t)).count())
            .sum()
    }

    pub fn all_ids(&self) -> impl Iterator<Item = &NoteId> {
        self.notes.keys()
    }

    pub fn all_notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    pub fn all_links(&self) -> impl Iterator<Item = DirectedLink> + '_ {
        self.forward.iter().flat_map(|(source, targets)| {
            targets.iter().map(move |target| DirectedLink {
                source: source.clone(),
                target: target.clone(),
            })
        })
    }

    /// Link targets that do not currently resolve to an indexed note.
    pub fn dangling_targets(&self) -> BTreeSet<NoteId> {
        self.reverse
            .keys()
            .filter(|t| !self.notes.contains_key(*t))
            .cloned()
            .collect()
    }
}
