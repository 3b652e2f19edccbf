//! The tagged result tree produced by every parser.

use std::borrow::Cow;

/// The semantic label of a [`ParseNode`].
///
/// Structural scaffolding is [`Kind::Untagged`]; everything else is attached
/// by [`marked`][crate::engine::marked] so that record assembly can pick it
/// out of the tree.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Kind {
    /// Structural node without meaning of its own.
    #[default]
    Untagged,
    /// The header's commit type, e.g. `feat`.
    CommitType,
    /// The header's parenthesized scope, without the parentheses.
    Scope,
    /// The `!` after the type or scope.
    BreakingChangeBang,
    /// The one-line summary after `: `.
    Description,
    /// Free-form text between the header and the footers.
    Body,
    /// A single footer, token included.
    Footer,
    /// All footers.
    Footers,
    /// The token of a `BREAKING CHANGE: ` footer.
    BreakingChange,
}

/// A successful parse.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseNode<'a> {
    value: Cow<'a, str>,
    kind: Kind,
    children: Vec<ParseNode<'a>>,
    remaining: &'a str,
}

impl<'a> ParseNode<'a> {
    /// A node that consumed the first `len` bytes of `input`.
    ///
    /// `len` must fall on a char boundary.
    pub fn leaf(input: &'a str, len: usize) -> Self {
        let (value, remaining) = input.split_at(len);
        Self {
            value: Cow::Borrowed(value),
            kind: Kind::Untagged,
            children: Vec::new(),
            remaining,
        }
    }

    /// A node that consumed nothing.
    pub fn empty(input: &'a str) -> Self {
        Self::leaf(input, 0)
    }

    /// A node aggregating `children`, whose value is their concatenation.
    ///
    /// When the children are contiguous, the value borrows from `input`.
    pub fn branch(input: &'a str, children: Vec<ParseNode<'a>>, remaining: &'a str) -> Self {
        let consumed = &input[..input.len() - remaining.len()];
        let contiguous = children.iter().map(|c| c.value.len()).sum::<usize>() == consumed.len()
            && children
                .iter()
                .scan(0, |start, c| {
                    let end = *start + c.value.len();
                    let same = consumed.get(*start..end) == Some(c.value.as_ref());
                    *start = end;
                    Some(same)
                })
                .all(|same| same);
        let value = if contiguous {
            Cow::Borrowed(consumed)
        } else {
            Cow::Owned(children.iter().map(|c| c.value.as_ref()).collect())
        };
        Self {
            value,
            kind: Kind::Untagged,
            children,
            remaining,
        }
    }

    /// The text this node stands for.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The semantic label.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Sub-results, in input order.
    pub fn children(&self) -> &[ParseNode<'a>] {
        &self.children
    }

    /// Input left over after this node.
    pub fn remaining(&self) -> &'a str {
        self.remaining
    }

    /// Relabel this node.
    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    pub(crate) fn with_remaining(mut self, remaining: &'a str) -> Self {
        self.remaining = remaining;
        self
    }

    /// Depth-first search for the first node of `kind`, this one included.
    pub fn find(&self, kind: Kind) -> Option<&ParseNode<'a>> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(kind))
    }
}
