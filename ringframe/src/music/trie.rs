//! A trie over music patterns, so that every pattern can be matched against a row in one pass.

use std::collections::BTreeMap;

use crate::{Bell, Stage};

use super::{Elem, PatternIdx};

/// The label on an edge of the trie.  Each edge consumes one place of the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Selector {
    /// Any bell (from a `?` or part of a `*`)
    Any,
    Bell(Bell),
}

/// A trie of [`Elem`] sequences, built for a specific [`Stage`].  The node at depth `d` is reached
/// after matching the first `d` places of a row.
#[derive(Debug, Clone)]
pub(crate) struct Trie {
    root: Node,
    /// Total number of nodes, including the root
    num_nodes: usize,
}

#[derive(Debug, Clone, Default)]
struct Node {
    children: BTreeMap<Selector, Node>,
    /// Patterns which match every row that reaches this node.  Each index appears at most once.
    matches: Vec<PatternIdx>,
}

impl Trie {
    pub fn empty() -> Self {
        Self {
            root: Node::default(),
            num_nodes: 1,
        }
    }

    /// Builds a new `Trie` containing some patterns.  Branches which can't lead to a match (e.g.
    /// because a `*` has no room to fit) are removed.
    pub fn build<'e>(
        stage: Stage,
        patterns: impl IntoIterator<Item = (PatternIdx, &'e [Elem])>,
    ) -> Self {
        match Self::build_within(stage, patterns, &Self::empty(), usize::MAX) {
            Ok(trie) => trie,
            Err(_) => unreachable!("Trie ran out of nodes with no node limit"),
        }
    }

    /// Builds a new `Trie` like [`Trie::build`], but gives up as soon as the new `Trie` contains
    /// more than `budget` nodes which aren't in `existing`.  On failure, returns the number of
    /// new nodes which had been allocated.
    pub fn build_within<'e>(
        stage: Stage,
        patterns: impl IntoIterator<Item = (PatternIdx, &'e [Elem])>,
        existing: &Trie,
        budget: usize,
    ) -> Result<Self, usize> {
        let mut budget = Budget {
            new_nodes: 0,
            limit: budget,
        };
        let mut root = Node::default();
        for (idx, elems) in patterns {
            let cursor = Cursor {
                node: &mut root,
                existing: Some(&existing.root),
            };
            cursor.insert(elems, idx, 0, stage.num_bells(), &mut budget)?;
        }
        root.prune();
        Ok(Self {
            num_nodes: root.num_nodes(),
            root,
        })
    }

    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Returns `true` if `idx` is recorded anywhere in this `Trie`
    pub fn contains(&self, idx: PatternIdx) -> bool {
        self.root.contains(idx)
    }

    /// The number of nodes in `self` which don't exist in `other`, i.e. how many nodes `other`
    /// would grow by if `self` was [merged](Self::merge) into it.
    pub fn nodes_missing_from(&self, other: &Trie) -> usize {
        self.root.nodes_missing_from(&other.root)
    }

    /// Adds every path and match in `other` to `self`
    pub fn merge(&mut self, other: Trie) {
        self.num_nodes += other.nodes_missing_from(self);
        self.root.merge(other.root);
    }

    /// Calls `f` once for every pattern recorded on each path of the trie which matches `bells`
    pub fn match_row(&self, bells: &[Bell], f: &mut impl FnMut(PatternIdx)) {
        self.root.match_row(bells, 0, f);
    }
}

/// Counts the nodes which a [`Trie`] allocates on top of an existing `Trie`
struct Budget {
    new_nodes: usize,
    limit: usize,
}

/// A node being built, along with the node at the same path in the existing `Trie` (if any)
struct Cursor<'n, 'e> {
    node: &'n mut Node,
    existing: Option<&'e Node>,
}

impl<'n, 'e> Cursor<'n, 'e> {
    /// Moves to the child along `selector`, creating it if needed.  Fails if this creates one
    /// node more than the `budget` allows.
    fn child(self, selector: Selector, budget: &mut Budget) -> Result<Cursor<'n, 'e>, usize> {
        let existing = self.existing.and_then(|n| n.children.get(&selector));
        if existing.is_none() && !self.node.children.contains_key(&selector) {
            budget.new_nodes += 1;
            if budget.new_nodes > budget.limit {
                return Err(budget.new_nodes);
            }
        }
        let node = self.node;
        Ok(Cursor {
            node: node.children.entry(selector).or_default(),
            existing,
        })
    }

    fn reborrow(&mut self) -> Cursor<'_, 'e> {
        Cursor {
            node: &mut *self.node,
            existing: self.existing,
        }
    }

    /// Inserts the rest of a pattern, `elems`, given that `pos` places of the row have already
    /// been consumed by the path to this node.
    fn insert(
        mut self,
        elems: &[Elem],
        idx: PatternIdx,
        pos: usize,
        num_bells: usize,
        budget: &mut Budget,
    ) -> Result<(), usize> {
        let Some((&first, rest)) = elems.split_first() else {
            self.node.record(idx);
            return Ok(());
        };
        match first {
            Elem::Bell(b) if pos < num_bells => self
                .child(Selector::Bell(b), budget)?
                .insert(rest, idx, pos + 1, num_bells, budget),
            Elem::Any if pos < num_bells => self
                .child(Selector::Any, budget)?
                .insert(rest, idx, pos + 1, num_bells, budget),
            Elem::Bell(_) | Elem::Any => Ok(()), // Pattern runs off the end of the row
            // A trailing star matches whatever is left
            Elem::Star if rest.is_empty() => {
                self.node.record(idx);
                Ok(())
            }
            Elem::Star if !rest.contains(&Elem::Star) => {
                // The last star has to fill exactly the gap between `pos` and the suffix
                let Some(gap) = num_bells.checked_sub(pos + rest.len()) else {
                    return Ok(()); // Suffix doesn't fit
                };
                let mut cursor = self;
                for _ in 0..gap {
                    cursor = cursor.child(Selector::Any, budget)?;
                }
                cursor.insert(rest, idx, pos + gap, num_bells, budget)
            }
            Elem::Star => {
                // Either the star matches nothing ...
                self.reborrow().insert(rest, idx, pos, num_bells, budget)?;
                // ... or it consumes at least one more bell
                if pos < num_bells {
                    self.child(Selector::Any, budget)?
                        .insert(elems, idx, pos + 1, num_bells, budget)?;
                }
                Ok(())
            }
        }
    }
}

impl Node {
    fn child(&mut self, selector: Selector) -> &mut Node {
        self.children.entry(selector).or_default()
    }

    fn record(&mut self, idx: PatternIdx) {
        if !self.matches.contains(&idx) {
            self.matches.push(idx);
        }
    }

    /// Removes every subtree which contains no matches, returning `false` if `self` should also be
    /// removed.
    fn prune(&mut self) -> bool {
        self.children.retain(|_, child| child.prune());
        !self.matches.is_empty() || !self.children.is_empty()
    }

    fn num_nodes(&self) -> usize {
        1 + self.children.values().map(Node::num_nodes).sum::<usize>()
    }

    fn contains(&self, idx: PatternIdx) -> bool {
        self.matches.contains(&idx) || self.children.values().any(|c| c.contains(idx))
    }

    fn nodes_missing_from(&self, other: &Node) -> usize {
        self.children
            .iter()
            .map(|(sel, child)| match other.children.get(sel) {
                Some(other_child) => child.nodes_missing_from(other_child),
                None => child.num_nodes(),
            })
            .sum()
    }

    fn merge(&mut self, other: Node) {
        for idx in other.matches {
            self.record(idx);
        }
        for (sel, child) in other.children {
            self.child(sel).merge(child);
        }
    }

    fn match_row(&self, bells: &[Bell], pos: usize, f: &mut impl FnMut(PatternIdx)) {
        for &idx in &self.matches {
            f(idx);
        }
        let Some(&bell) = bells.get(pos) else {
            return;
        };
        if let Some(child) = self.children.get(&Selector::Any) {
            child.match_row(bells, pos + 1, f);
        }
        if let Some(child) = self.children.get(&Selector::Bell(bell)) {
            child.match_row(bells, pos + 1, f);
        }
    }
}
