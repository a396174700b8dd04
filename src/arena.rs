//! Fast, but limited allocator backing the tree nodes.

use std::collections::TryReserveError;
use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

/// A generation-checked handle to an object in a `TypedArena<T>`.
///
/// A slot is reused after it is freed, but its generation is bumped first, so an `Entry` to a
/// freed object never aliases the object that later takes its slot.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Entry {
    chunk_index: usize,
    block_index: usize,
    generation: u32,
}

enum Block<T> {
    Occupied { value: T, generation: u32 },
    Vacant { next: Option<Entry>, generation: u32 },
}

/// A fast, but limited allocator that only allocates a single type of object.
///
/// Objects are stored in fixed-size chunks that are never reallocated once created, and freed
/// slots are threaded onto a free list for reuse. Growing the arena reserves memory fallibly, so
/// running out of memory surfaces as an error instead of an abort.
///
/// # Examples
///
/// ```
/// use rb_collections::arena::TypedArena;
///
/// let mut arena = TypedArena::new(1024);
///
/// let x = arena.allocate(1).unwrap();
/// assert_eq!(arena[x], 1);
///
/// arena[x] += 1;
/// assert_eq!(arena[x], 2);
///
/// assert_eq!(arena.free(&x), 2);
/// assert_eq!(arena.get(&x), None);
/// ```
pub struct TypedArena<T> {
    head: Option<Entry>,
    chunks: Vec<Vec<Block<T>>>,
    chunk_size: usize,
    size: usize,
    capacity: usize,
}

impl<T> TypedArena<T> {
    fn block(&self, entry: &Entry) -> Option<&Block<T>> {
        self.chunks
            .get(entry.chunk_index)
            .and_then(|chunk| chunk.get(entry.block_index))
    }

    fn block_mut(&mut self, entry: &Entry) -> Option<&mut Block<T>> {
        self.chunks
            .get_mut(entry.chunk_index)
            .and_then(|chunk| chunk.get_mut(entry.block_index))
    }

    /// Constructs a new, empty `TypedArena<T>` with a specific number of objects per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::arena::TypedArena;
    ///
    /// // creates a new TypedArena<T> that contains a maximum of 1024 u32's per chunk
    /// let arena: TypedArena<u32> = TypedArena::new(1024);
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Error: chunk size must be positive.");
        TypedArena {
            head: None,
            chunks: Vec::new(),
            chunk_size,
            size: 0,
            capacity: 0,
        }
    }

    /// Allocates an object in the typed arena and returns an `Entry` that can later be used to
    /// retrieve references to the object and to deallocate it. Returns an error if a new chunk
    /// is needed and its memory cannot be reserved; the arena is unchanged in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0).unwrap();
    /// assert_eq!(arena.len(), 1);
    /// ```
    pub fn allocate(&mut self, value: T) -> Result<Entry, TryReserveError> {
        if self.size == self.capacity {
            let mut chunk = Vec::new();
            chunk.try_reserve_exact(self.chunk_size)?;
            self.chunks.try_reserve(1)?;
            self.chunks.push(chunk);
            self.capacity += self.chunk_size;
        }
        self.size += 1;

        match self.head.take() {
            None => {
                let chunk_count = self.chunks.len();
                let last_chunk = &mut self.chunks[chunk_count - 1];
                last_chunk.push(Block::Occupied {
                    value,
                    generation: 0,
                });
                Ok(Entry {
                    chunk_index: chunk_count - 1,
                    block_index: last_chunk.len() - 1,
                    generation: 0,
                })
            }
            Some(entry) => {
                let block = &mut self.chunks[entry.chunk_index][entry.block_index];
                let (next, generation) = match block {
                    Block::Vacant { next, generation } => (*next, *generation),
                    Block::Occupied { .. } => panic!("Expected a vacant block."),
                };
                *block = Block::Occupied { value, generation };
                self.head = next;
                Ok(Entry {
                    chunk_index: entry.chunk_index,
                    block_index: entry.block_index,
                    generation,
                })
            }
        }
    }

    /// Deallocates an object in the typed arena and returns the object.
    ///
    /// # Panics
    ///
    /// Panics if entry corresponds to an invalid, vacant, or reused slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0).unwrap();
    /// assert_eq!(arena.free(&x), 0);
    /// ```
    pub fn free(&mut self, entry: &Entry) -> T {
        if !self.contains(entry) {
            panic!("Error: attempting to free invalid block.");
        }
        let next_generation = entry.generation.wrapping_add(1);
        let next = self.head.take();
        let old_block = mem::replace(
            &mut self.chunks[entry.chunk_index][entry.block_index],
            Block::Vacant {
                next,
                generation: next_generation,
            },
        );
        match old_block {
            Block::Vacant { .. } => panic!("Error: attempting to free vacant block."),
            Block::Occupied { value, .. } => {
                self.size -= 1;
                self.head = Some(Entry {
                    chunk_index: entry.chunk_index,
                    block_index: entry.block_index,
                    generation: next_generation,
                });
                value
            }
        }
    }

    /// Returns `true` if the entry refers to a live object in this arena.
    pub fn contains(&self, entry: &Entry) -> bool {
        match self.block(entry) {
            Some(Block::Occupied { generation, .. }) => *generation == entry.generation,
            _ => false,
        }
    }

    /// Returns an immutable reference to an object in the typed arena. Returns `None` if the entry
    /// does not correspond to a live object.
    ///
    /// # Examples
    ///
    /// ```
    /// use rb_collections::arena::TypedArena;
    ///
    /// let mut arena = TypedArena::new(1024);
    /// let x = arena.allocate(0).unwrap();
    /// assert_eq!(arena.get(&x), Some(&0));
    /// ```
    pub fn get(&self, entry: &Entry) -> Option<&T> {
        match self.block(entry) {
            Some(Block::Occupied { value, generation }) if *generation == entry.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Returns a mutable reference to an object in the typed arena. Returns `None` if the entry
    /// does not correspond to a live object.
    pub fn get_mut(&mut self, entry: &Entry) -> Option<&mut T> {
        match self.block_mut(entry) {
            Some(Block::Occupied { value, generation }) if *generation == entry.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    /// Returns the number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the arena holds no live objects.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots reserved across all chunks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Index<Entry> for TypedArena<T> {
    type Output = T;

    fn index(&self, entry: Entry) -> &Self::Output {
        self.get(&entry).expect("Error: entry out of bounds.")
    }
}

impl<T> IndexMut<Entry> for TypedArena<T> {
    fn index_mut(&mut self, entry: Entry) -> &mut Self::Output {
        self.get_mut(&entry).expect("Error: entry out of bounds.")
    }
}

#[cfg(test)]
mod tests {
    use super::Entry;
    use super::TypedArena;

    fn entry(chunk_index: usize, block_index: usize, generation: u32) -> Entry {
        Entry {
            chunk_index,
            block_index,
            generation,
        }
    }

    #[test]
    #[should_panic]
    fn test_free_invalid_block() {
        let mut arena: TypedArena<u32> = TypedArena::new(1024);
        arena.free(&entry(0, 0, 0));
    }

    #[test]
    #[should_panic]
    fn test_free_vacant_block() {
        let mut arena = TypedArena::new(1024);
        let x = arena.allocate(0).unwrap();
        arena.free(&x);
        arena.free(&x);
    }

    #[test]
    #[should_panic]
    fn test_zero_chunk_size() {
        let _arena: TypedArena<u32> = TypedArena::new(0);
    }

    #[test]
    fn test_insert() {
        let mut pool = TypedArena::new(1024);
        assert_eq!(pool.allocate(0).unwrap(), entry(0, 0, 0));
        assert_eq!(pool.allocate(0).unwrap(), entry(0, 1, 0));
        assert_eq!(pool.allocate(0).unwrap(), entry(0, 2, 0));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.capacity(), 1024);
    }

    #[test]
    fn test_insert_multiple_chunks() {
        let mut pool = TypedArena::new(2);
        assert_eq!(pool.allocate(0).unwrap(), entry(0, 0, 0));
        assert_eq!(pool.allocate(0).unwrap(), entry(0, 1, 0));
        assert_eq!(pool.allocate(0).unwrap(), entry(1, 0, 0));
        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn test_free_bumps_generation() {
        let mut pool = TypedArena::new(1024);
        let old = pool.allocate(0).unwrap();
        assert_eq!(pool.free(&old), 0);
        assert!(pool.is_empty());

        let new = pool.allocate(1).unwrap();
        assert_eq!(new, entry(0, 0, 1));
        assert!(!pool.contains(&old));
        assert_eq!(pool.get(&old), None);
        assert_eq!(pool.get(&new), Some(&1));
    }

    #[test]
    fn test_free_list_order() {
        let mut pool = TypedArena::new(1024);
        let a = pool.allocate(0).unwrap();
        let b = pool.allocate(1).unwrap();
        pool.free(&a);
        pool.free(&b);
        assert_eq!(pool.allocate(2).unwrap(), entry(0, 1, 1));
        assert_eq!(pool.allocate(3).unwrap(), entry(0, 0, 1));
        assert_eq!(pool.capacity(), 1024);
    }

    #[test]
    fn test_get_invalid_block() {
        let pool: TypedArena<u32> = TypedArena::new(1024);
        assert_eq!(pool.get(&entry(0, 0, 0)), None);
    }

    #[test]
    fn test_get_mut() {
        let mut pool = TypedArena::new(1024);
        let x = pool.allocate(0).unwrap();
        *pool.get_mut(&x).unwrap() = 1;
        assert_eq!(pool.get(&x), Some(&1));
        pool.free(&x);
        assert_eq!(pool.get_mut(&x), None);
    }
}
