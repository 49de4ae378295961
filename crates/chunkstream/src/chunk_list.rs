//! Doubly linked list of chunks with a movable consumption window.

use std::sync::Arc;

use log::trace;

use crate::Chunk;

#[derive(Debug, Clone)]
struct Node {
    chunk: Chunk,
    prev: Option<usize>,
    next: Option<usize>,
}

/// An ordered collection of [`Chunk`]s presented as one logical byte stream.
///
/// Chunks are linked once, at append time, and are never removed. The node
/// arena is shared between forks and copied on write, the first time a fork
/// appends. The list
/// tracks a window that starts at `first` and ends at `last`: [`advance`]
/// drops the head of the window, [`rewind`] restores it. Advancing past the
/// last chunk leaves `first` unset, but every link stays in place so that
/// rewinding can walk back into the list.
///
/// [`advance`]: ChunkList::advance
/// [`rewind`]: ChunkList::rewind
///
/// # Example
///
/// ```
/// use chunkstream::{Chunk, ChunkList};
///
/// let mut list = ChunkList::new();
/// list.append(Chunk::from(vec![1, 2, 3]));
/// list.append(Chunk::from(vec![4, 5]));
/// assert_eq!(list.available_bytes(), 5);
///
/// assert!(list.advance());
/// assert_eq!(list.available_bytes(), 2);
/// assert!(list.rewind());
/// assert_eq!(list.available_bytes(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChunkList {
    nodes: Arc<Vec<Node>>,
    first: Option<usize>,
    last: Option<usize>,
    available_bytes: usize,
    available_chunks: usize,
}

impl ChunkList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fork of this list.
    ///
    /// The fork shares the node arena with `self` and duplicates only the
    /// window bookkeeping. Moving or appending on one never affects the other.
    pub fn copy(&self) -> Self {
        Self {
            nodes: Arc::clone(&self.nodes),
            first: self.first,
            last: self.last,
            available_bytes: self.available_bytes,
            available_chunks: self.available_chunks,
        }
    }

    /// Links `chunk` at the tail and returns its insertion index.
    pub fn append(&mut self, chunk: impl Into<Chunk>) -> usize {
        let chunk = chunk.into();
        let len = chunk.len();
        let nodes = Arc::make_mut(&mut self.nodes);
        let index = nodes.len();

        nodes.push(Node {
            chunk,
            prev: self.last,
            next: None,
        });
        if let Some(last) = self.last {
            nodes[last].next = Some(index);
        }
        self.last = Some(index);
        if self.first.is_none() {
            self.first = Some(index);
        }

        self.available_bytes += len;
        self.available_chunks += 1;
        trace!("appended chunk #{index} ({len} bytes)");
        index
    }

    /// Moves the window past the current first chunk.
    ///
    /// Returns whether a chunk is still available afterwards.
    pub fn advance(&mut self) -> bool {
        let Some(first) = self.first else {
            return false;
        };
        let node = &self.nodes[first];
        self.available_bytes -= node.chunk.len();
        self.available_chunks -= 1;
        self.first = node.next;
        trace!("advanced past chunk #{first}");
        self.first.is_some()
    }

    /// Moves the window back by one chunk.
    ///
    /// When the window is exhausted this restores `last`. At the head of the
    /// list nothing changes and `false` is returned.
    pub fn rewind(&mut self) -> bool {
        let target = match self.first {
            None => self.last,
            Some(first) => match self.nodes[first].prev {
                Some(prev) => Some(prev),
                None => return false,
            },
        };
        let Some(index) = target else {
            return false;
        };

        self.first = Some(index);
        self.available_bytes += self.nodes[index].chunk.len();
        self.available_chunks += 1;
        trace!("rewound to chunk #{index}");
        true
    }

    /// Rewinds to the earliest linked chunk.
    pub fn reset(&mut self) {
        while self.rewind() {}
    }

    pub fn can_advance(&self) -> bool {
        self.first
            .is_some_and(|first| self.nodes[first].next.is_some())
    }

    pub fn can_rewind(&self) -> bool {
        self.first
            .is_some_and(|first| self.nodes[first].prev.is_some())
    }

    /// Current head of the window, if any.
    pub fn first(&self) -> Option<&Chunk> {
        self.first.map(|index| &self.nodes[index].chunk)
    }

    /// Index of the current head of the window.
    pub fn first_index(&self) -> Option<usize> {
        self.first
    }

    /// Most recently appended chunk.
    pub fn last(&self) -> Option<&Chunk> {
        self.last.map(|index| &self.nodes[index].chunk)
    }

    /// Chunk at insertion `index`.
    pub fn get(&self, index: usize) -> Option<&Chunk> {
        self.nodes.get(index).map(|node| &node.chunk)
    }

    /// Index of the chunk linked after `index`.
    pub fn next(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(|node| node.next)
    }

    /// Index of the chunk linked before `index`.
    pub fn prev(&self, index: usize) -> Option<usize> {
        self.nodes.get(index).and_then(|node| node.prev)
    }

    /// Iterates over the chunks in the window, from `first` to `last`.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            index: self.first,
        }
    }

    /// Total number of chunks ever appended.
    pub fn num_chunks(&self) -> usize {
        self.nodes.len()
    }

    /// Number of chunks in the window.
    pub fn available_chunks(&self) -> usize {
        self.available_chunks
    }

    /// Number of bytes in the window.
    pub fn available_bytes(&self) -> usize {
        self.available_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Iterator over the chunks of a [`ChunkList`] window.
pub struct Iter<'a> {
    list: &'a ChunkList,
    index: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index?;
        let node = &self.list.nodes[index];
        self.index = node.next;
        Some(&node.chunk)
    }
}

impl<'a> IntoIterator for &'a ChunkList {
    type Item = &'a Chunk;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl<C: Into<Chunk>> Extend<C> for ChunkList {
    fn extend<T: IntoIterator<Item = C>>(&mut self, iter: T) {
        for chunk in iter {
            self.append(chunk);
        }
    }
}

impl<C: Into<Chunk>> FromIterator<C> for ChunkList {
    fn from_iter<T: IntoIterator<Item = C>>(iter: T) -> Self {
        let mut list = ChunkList::new();
        list.extend(iter);
        list
    }
}
