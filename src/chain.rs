use std::ptr::NonNull;

use crate::{DxfError, DxfResult, Record};

/// One link of a record chain.  A node owns its record and, while linked, the rest of the
/// chain behind it.  A node can only be turned back into its record once it is detached
/// (its successor link empty); releasing a still-linked node is a contract violation.
pub struct ChainNode {
    record: Record,
    next: Option<Box<ChainNode>>,
}

impl ChainNode {
    pub fn new(record: Record) -> Self {
        ChainNode { record, next: None }
    }
    pub fn record(&self) -> &Record {
        &self.record
    }
    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
    pub fn next(&self) -> Option<&ChainNode> {
        self.next.as_deref()
    }
    pub fn is_linked(&self) -> bool {
        self.next.is_some()
    }
    pub fn set_next(&mut self, node: Box<ChainNode>) {
        self.next = Some(node);
    }
    pub fn take_next(&mut self) -> Option<Box<ChainNode>> {
        self.next.take()
    }
    /// Releases the node, yielding its record.  Fails if the node still links a successor;
    /// detach first with `take_next`.
    pub fn into_record(self) -> DxfResult<Record> {
        if self.next.is_some() {
            return Err(DxfError::StillLinkedChainNode);
        }
        Ok(self.record)
    }
}

/// An insertion-ordered, singly linked chain of same-kind records.  The chain exclusively
/// owns its records; teardown detaches each node before releasing it and never recurses, so
/// chains of tens of thousands of records cannot exhaust the call stack.
pub struct RecordChain {
    head: Option<Box<ChainNode>>,
    // Always the last node of the chain rooted at `head` (None iff `head` is None).  Boxes
    // have stable heap addresses, so the pointer stays valid while the chain owns the node.
    tail: Option<NonNull<ChainNode>>,
    len: usize,
    kind: Option<String>,
}

// SAFETY: `tail` points into heap nodes owned by this chain; no aliasing escapes the
// `&mut self` methods, so the chain moves and shares across threads like the plain
// ownership tree it is.
unsafe impl Send for RecordChain {}
unsafe impl Sync for RecordChain {}

impl Default for RecordChain {
    fn default() -> Self {
        RecordChain::new()
    }
}

impl RecordChain {
    pub fn new() -> Self {
        RecordChain {
            head: None,
            tail: None,
            len: 0,
            kind: None,
        }
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// The kind of the records in this chain, pinned by the first append.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
    pub fn append(&mut self, record: Record) -> DxfResult<()> {
        match self.kind {
            Some(ref kind) => {
                if kind != record.kind() {
                    return Err(DxfError::MismatchedChainKind {
                        expected: kind.clone(),
                        actual: String::from(record.kind()),
                    });
                }
            }
            None => self.kind = Some(String::from(record.kind())),
        }

        let mut node = Box::new(ChainNode::new(record));
        let node_ptr = NonNull::from(&mut *node);
        match self.tail {
            // SAFETY: `tail` is the chain's last node and `&mut self` guarantees no other
            // reference into the chain exists right now.
            Some(mut tail) => unsafe { tail.as_mut().set_next(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node_ptr);
        self.len += 1;
        Ok(())
    }
    /// Detaches and releases the oldest record.
    pub fn pop_front(&mut self) -> Option<Record> {
        let mut node = self.head.take()?;
        self.head = node.take_next();
        if self.head.is_none() {
            self.tail = None;
            self.kind = None;
        }
        self.len -= 1;
        // the successor link was just cleared, so release cannot fail
        node.into_record().ok()
    }
    /// Tears the chain down oldest-first with an explicit worklist, never recursion, and
    /// returns how many detach+release operations ran.
    pub fn clear(&mut self) -> usize {
        let mut released = 0;
        let mut current = self.head.take();
        while let Some(mut node) = current {
            current = node.take_next();
            released += 1;
            // `node` is detached here and dropped at the end of the iteration
        }
        self.tail = None;
        self.len = 0;
        self.kind = None;
        released
    }
    /// A restartable, read-only walk in insertion order.
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            current: self.head.as_deref(),
        }
    }
}

impl Drop for RecordChain {
    fn drop(&mut self) {
        // same worklist walk as `clear`; the default drop glue would recurse once per node
        self.clear();
    }
}

impl<'a> IntoIterator for &'a RecordChain {
    type Item = &'a Record;
    type IntoIter = ChainIter<'a>;
    fn into_iter(self) -> ChainIter<'a> {
        self.iter()
    }
}

pub struct ChainIter<'a> {
    current: Option<&'a ChainNode>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a Record;
    fn next(&mut self) -> Option<&'a Record> {
        let node = self.current?;
        self.current = node.next();
        Some(node.record())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainNode, RecordChain};
    use crate::{Record, SchemaRegistry};

    fn circle_with_radius(radius: f64) -> Record {
        let mut record = Record::new(SchemaRegistry::builtin().lookup("CIRCLE").unwrap());
        record.set_f64("radius", radius).unwrap();
        record
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut chain = RecordChain::new();
        for i in 0..5 {
            chain.append(circle_with_radius(f64::from(i) + 1.0)).unwrap();
        }
        let radii: Vec<f64> = chain.iter().map(|r| r.f64_value("radius").unwrap()).collect();
        assert_eq!(vec![1.0, 2.0, 3.0, 4.0, 5.0], radii);
        assert_eq!(5, chain.len());
        assert_eq!(Some("CIRCLE"), chain.kind());
    }

    #[test]
    fn iteration_is_restartable() {
        let mut chain = RecordChain::new();
        chain.append(circle_with_radius(1.0)).unwrap();
        chain.append(circle_with_radius(2.0)).unwrap();
        assert_eq!(2, chain.iter().count());
        assert_eq!(2, chain.iter().count());
    }

    #[test]
    fn clear_detaches_and_releases_every_node() {
        let mut chain = RecordChain::new();
        for _ in 0..100 {
            chain.append(circle_with_radius(1.0)).unwrap();
        }
        assert_eq!(100, chain.clear());
        assert!(chain.is_empty());
        assert_eq!(None, chain.kind());
        // the chain is reusable afterwards
        chain.append(circle_with_radius(2.0)).unwrap();
        assert_eq!(1, chain.len());
    }

    #[test]
    fn releasing_a_linked_node_is_rejected() {
        let mut first = ChainNode::new(circle_with_radius(1.0));
        first.set_next(Box::new(ChainNode::new(circle_with_radius(2.0))));
        assert!(first.is_linked());
        let result = first.into_record();
        assert!(result.is_err());
    }

    #[test]
    fn detached_node_releases_its_record() {
        let mut first = ChainNode::new(circle_with_radius(1.0));
        first.set_next(Box::new(ChainNode::new(circle_with_radius(2.0))));
        let second = first.take_next().unwrap();
        let record = first.into_record().unwrap();
        assert_eq!(Some(1.0), record.f64_value("radius"));
        let record = second.into_record().unwrap();
        assert_eq!(Some(2.0), record.f64_value("radius"));
    }

    #[test]
    fn mismatched_kind_is_rejected() {
        let mut chain = RecordChain::new();
        chain.append(circle_with_radius(1.0)).unwrap();
        let line = Record::new(SchemaRegistry::builtin().lookup("LINE").unwrap());
        assert!(chain.append(line).is_err());
    }

    #[test]
    fn pop_front_releases_oldest_first() {
        let mut chain = RecordChain::new();
        chain.append(circle_with_radius(1.0)).unwrap();
        chain.append(circle_with_radius(2.0)).unwrap();
        assert_eq!(Some(1.0), chain.pop_front().unwrap().f64_value("radius"));
        assert_eq!(Some(2.0), chain.pop_front().unwrap().f64_value("radius"));
        assert!(chain.pop_front().is_none());
        assert!(chain.is_empty());
    }

    #[test]
    fn teardown_of_a_long_chain_does_not_recurse() {
        // large enough that one stack frame per node would overflow
        let mut chain = RecordChain::new();
        for _ in 0..50_000 {
            chain.append(circle_with_radius(1.0)).unwrap();
        }
        assert_eq!(50_000, chain.clear());
    }
}
