use std::{fmt, mem};

/// Handle to a single node in [`RbTree`][crate::RbTree]. Handles stay
/// valid until the node they name is destroyed by a removal, after that
/// they never resolve again, even when the slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    gen: u32,
}

/// Node color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Color::Red => write!(f, "R"),
            Color::Black => write!(f, "B"),
        }
    }
}

/// Node corresponds to a single entry in the tree. `parent` is a
/// back-link for upward navigation, children are owned through the arena.
#[derive(Clone)]
pub(crate) struct Node<K> {
    pub(crate) key: K,
    pub(crate) color: Color,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<K> Node<K> {
    #[inline]
    pub(crate) fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    #[inline]
    pub(crate) fn set_black(&mut self) {
        self.color = Color::Black
    }

    #[inline]
    pub(crate) fn set_red(&mut self) {
        self.color = Color::Red
    }
}

#[derive(Clone)]
struct Slot<K> {
    gen: u32, // bumped every time the slot is freed.
    node: Option<Node<K>>,
}

/// Slab of nodes, freed slots are recycled through a free list. A
/// handle only resolves while its generation matches the slot's.
#[derive(Clone)]
pub(crate) struct Arena<K> {
    slots: Vec<Slot<K>>,
    free: Vec<usize>,
}

impl<K> Arena<K> {
    pub(crate) fn new() -> Arena<K> {
        Arena {
            slots: vec![],
            free: vec![],
        }
    }

    pub(crate) fn alloc(&mut self, key: K, color: Color, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            key,
            color,
            parent,
            left: None,
            right: None,
        };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId {
                    index,
                    gen: slot.gen,
                }
            }
            None => {
                self.slots.push(Slot {
                    gen: 0,
                    node: Some(node),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    gen: 0,
                }
            }
        }
    }

    /// Destroy the node and hand back its contents. Links held by other
    /// nodes are the caller's responsibility.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K> {
        match self.slot_mut(id).and_then(|slot| slot.node.take()) {
            Some(node) => {
                let slot = &mut self.slots[id.index];
                slot.gen = slot.gen.wrapping_add(1);
                self.free.push(id.index);
                node
            }
            None => panic!("free(): stale handle {:?}, call the programmer", id),
        }
    }

    #[inline]
    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot<K>> {
        self.slots.get_mut(id.index).filter(|slot| slot.gen == id.gen)
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.gen == id.gen)
            .and_then(|slot| slot.node.as_ref())
    }

    #[inline]
    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node(): stale handle {:?}, call the programmer", id),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<K> {
        match self.slot_mut(id).and_then(|slot| slot.node.as_mut()) {
            Some(node) => node,
            None => panic!("node_mut(): stale handle {:?}, call the programmer", id),
        }
    }

    pub(crate) fn swap_keys(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        if !self.is_live(a) || !self.is_live(b) {
            panic!("swap_keys(): stale handle {:?} {:?}", a, b);
        }
        let (lo, hi) = if a.index < b.index {
            (a.index, b.index)
        } else {
            (b.index, a.index)
        };
        let (head, tail) = self.slots.split_at_mut(hi);
        match (head[lo].node.as_mut(), tail[0].node.as_mut()) {
            (Some(x), Some(y)) => mem::swap(&mut x.key, &mut y.key),
            _ => panic!("swap_keys(): stale handle {:?} {:?}", a, b),
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_free_reuse() {
        let mut arena: Arena<i64> = Arena::new();
        let a = arena.alloc(10, Color::Black, None);
        let b = arena.alloc(20, Color::Red, Some(a));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.node(b).parent, Some(a));
        assert!(arena.node(b).is_red());

        let node = arena.free(a);
        assert_eq!(node.key, 10);
        assert!(!arena.is_live(a));
        assert_eq!(arena.len(), 1);

        let c = arena.alloc(30, Color::Red, None);
        assert_eq!(c.index, a.index);
        assert_ne!(c, a);
        assert!(!arena.is_live(a));
        assert!(arena.get(a).is_none());
        assert_eq!(arena.node(c).key, 30);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_swap_keys() {
        let mut arena: Arena<i64> = Arena::new();
        let a = arena.alloc(1, Color::Black, None);
        let b = arena.alloc(2, Color::Red, None);
        arena.swap_keys(b, a);
        assert_eq!(arena.node(a).key, 2);
        assert_eq!(arena.node(b).key, 1);
        arena.swap_keys(a, a);
        assert_eq!(arena.node(a).key, 2);
    }

    #[test]
    fn test_colors() {
        let mut arena: Arena<i64> = Arena::new();
        let a = arena.alloc(1, Color::Red, None);
        arena.node_mut(a).set_black();
        assert!(arena.node(a).is_black());
        arena.node_mut(a).set_red();
        assert!(arena.node(a).is_red());
        assert_eq!(format!("{}{}", Color::Red, Color::Black), "RB");
    }

    #[test]
    #[should_panic]
    fn test_node_mut_reused_slot() {
        let mut arena: Arena<i64> = Arena::new();
        let a = arena.alloc(1, Color::Red, None);
        arena.free(a);
        arena.alloc(2, Color::Red, None);
        arena.node_mut(a).set_black();
    }

    #[test]
    #[should_panic]
    fn test_double_free() {
        let mut arena: Arena<i64> = Arena::new();
        let a = arena.alloc(1, Color::Red, None);
        arena.free(a);
        arena.free(a);
    }
}
