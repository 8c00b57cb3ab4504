use crate::org::classify::ListKind;

/// Nesting and numbering of the list currently being emitted.
///
/// `depth_stack[i]` is the kind of the open list at level `i`,
/// `item_counters[i]` the next number at that level. Both always have the
/// same length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListState {
    depth_stack: Vec<ListKind>,
    item_counters: Vec<usize>,
}

impl ListState {
    /// Record one list item and return its number when `kind` is ordered.
    ///
    /// Deeper levels are closed, missing levels are opened with `kind`, and a
    /// new item at a level resets the counters of everything nested below it.
    pub fn push_item(&mut self, kind: ListKind, level: usize) -> Option<usize> {
        let depth = level + 1;
        self.depth_stack.truncate(depth);
        self.item_counters.truncate(depth);
        while self.depth_stack.len() < depth {
            self.depth_stack.push(kind);
            self.item_counters.push(1);
        }

        match kind {
            ListKind::Ordered => {
                let number = self.item_counters[level];
                self.item_counters[level] += 1;
                Some(number)
            }
            ListKind::Unordered => {
                self.item_counters[level] = 1;
                None
            }
        }
    }

    /// Close every open list.
    pub fn clear(&mut self) {
        self.depth_stack.clear();
        self.item_counters.clear();
    }

    pub fn depth(&self) -> usize {
        self.depth_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth_stack.is_empty()
    }
}
