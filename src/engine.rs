//! Grammar-agnostic parser combinators.
//!
//! A [`Parser`] takes the remaining input and either returns a [`ParseNode`]
//! (which carries the rest of the input) or a [`ParseError`]. Any
//! `Fn(&'a str) -> PResult<'a>` is a parser, so grammar rules are plain
//! functions and combinators return closures.
//!
//! Parsers never look behind their starting position and hold no state, so
//! the same parser may be applied to the same input any number of times with
//! the same outcome.
//!
//! ```rust
//! use git_cc::engine::{any, many1, sequence, tag, Parser};
//!
//! let word = any((tag("ab"), tag("c")));
//! let node = sequence((many1(word), tag("!"))).parse("abcab!?").unwrap();
//! assert_eq!(node.value(), "abcab!");
//! assert_eq!(node.remaining(), "?");
//! ```

use regex::Regex;

use crate::node::{Kind, ParseNode};
use crate::ParseError;

/// The outcome of applying a [`Parser`].
pub type PResult<'a> = Result<ParseNode<'a>, ParseError>;

/// Recognizes a prefix of its input.
pub trait Parser<'a> {
    /// Apply the parser to `input`.
    fn parse(&self, input: &'a str) -> PResult<'a>;
}

impl<'a, F> Parser<'a> for F
where
    F: Fn(&'a str) -> PResult<'a>,
{
    fn parse(&self, input: &'a str) -> PResult<'a> {
        self(input)
    }
}

/// Matches `literal` exactly.
pub fn tag<'a>(literal: &'static str) -> impl Parser<'a> {
    move |input: &'a str| -> PResult<'a> {
        if input.starts_with(literal) {
            Ok(ParseNode::leaf(input, literal.len()))
        } else {
            Err(ParseError::no_match(format!("{literal:?}"), input))
        }
    }
}

/// Matches the single code point `expected`.
pub fn literal_rune<'a>(expected: char) -> impl Parser<'a> {
    move |input: &'a str| -> PResult<'a> {
        match input.chars().next() {
            Some(c) if c == expected => Ok(ParseNode::leaf(input, c.len_utf8())),
            _ => Err(ParseError::no_match(format!("{expected:?}"), input)),
        }
    }
}

/// Matches a regular expression anchored at the start of the input.
#[derive(Clone, Debug)]
pub struct RegexParser {
    pattern: String,
    re: Regex,
}

impl RegexParser {
    /// Compile `pattern`; it only ever matches at the start of the input.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let re = Regex::new(&format!(r"\A(?:{pattern})"))?;
        Ok(Self {
            pattern: pattern.to_owned(),
            re,
        })
    }

    /// The pattern as given to [`RegexParser::new`].
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl<'a> Parser<'a> for RegexParser {
    fn parse(&self, input: &'a str) -> PResult<'a> {
        // Match offsets are bytes at char boundaries, so they can split `input`
        // directly however wide its code points are.
        match self.re.find(input) {
            Some(m) => Ok(ParseNode::leaf(input, m.end())),
            None => Err(ParseError::no_match(format!("/{}/", self.pattern), input)),
        }
    }
}

/// Succeeds, consuming nothing, only at the end of input.
pub fn empty(input: &str) -> PResult<'_> {
    if input.is_empty() {
        Ok(ParseNode::empty(input))
    } else {
        Err(ParseError::no_match("end of input", input))
    }
}

/// Never fails: on a mismatch, yields an empty node that consumed nothing.
pub fn opt<'a, P: Parser<'a>>(parser: P) -> impl Parser<'a> {
    move |input: &'a str| -> PResult<'a> {
        Ok(parser
            .parse(input)
            .unwrap_or_else(|_| ParseNode::empty(input)))
    }
}

/// Negative lookahead: succeeds, consuming nothing, iff `parser` fails.
pub fn not<'a, P: Parser<'a>>(parser: P) -> impl Parser<'a> {
    move |input: &'a str| -> PResult<'a> {
        match parser.parse(input) {
            Ok(_) => Err(ParseError::unexpected(input)),
            Err(_) => Ok(ParseNode::empty(input)),
        }
    }
}

/// Ordered alternation: the first parser that matches wins.
pub fn any<'a, A: Alternatives<'a>>(alternatives: A) -> impl Parser<'a> {
    move |input: &'a str| -> PResult<'a> { alternatives.parse_first(input) }
}

/// Applies every parser in order, failing as soon as one does.
pub fn sequence<'a, S: Sequence<'a>>(parsers: S) -> impl Parser<'a> {
    move |input: &'a str| -> PResult<'a> {
        let mut children = Vec::new();
        let remaining = parsers.parse_each(input, &mut children)?;
        Ok(ParseNode::branch(input, children, remaining))
    }
}

/// What [`some_of`] managed to match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress<'a> {
    /// Everything matched, one child per parser that succeeded.
    pub node: ParseNode<'a>,
    /// Why matching stopped early, if it did.
    ///
    /// The parser that failed is the one right after the last child.
    pub failure: Option<ParseError>,
}

/// Like [`sequence`], but keeps whatever matched before a failure.
pub fn some_of<'a, S: Sequence<'a>>(parsers: S) -> impl Fn(&'a str) -> Progress<'a> {
    move |input: &'a str| {
        let mut children = Vec::new();
        match parsers.parse_each(input, &mut children) {
            Ok(remaining) => Progress {
                node: ParseNode::branch(input, children, remaining),
                failure: None,
            },
            Err(err) => {
                let remaining = children.last().map_or(input, ParseNode::remaining);
                Progress {
                    node: ParseNode::branch(input, children, remaining),
                    failure: Some(err),
                }
            }
        }
    }
}

/// `start`, `middle`, `end` in sequence, keeping only `middle`.
pub fn delimited<'a, S, M, E>(start: S, middle: M, end: E) -> impl Parser<'a>
where
    S: Parser<'a>,
    M: Parser<'a>,
    E: Parser<'a>,
{
    move |input: &'a str| -> PResult<'a> {
        let start = start.parse(input)?;
        let middle = middle.parse(start.remaining())?;
        let end = end.parse(middle.remaining())?;
        Ok(middle.with_remaining(end.remaining()))
    }
}

/// Applies `parser` until it fails or the input runs out; never fails.
pub fn many0<'a, P: Parser<'a>>(parser: P) -> impl Parser<'a> {
    move |input: &'a str| -> PResult<'a> {
        let mut children = Vec::new();
        let mut rest = input;
        while let Ok(node) = parser.parse(rest) {
            let progressed = node.remaining().len() < rest.len();
            rest = node.remaining();
            children.push(node);
            if rest.is_empty() || !progressed {
                break;
            }
        }
        Ok(ParseNode::branch(input, children, rest))
    }
}

/// Like [`many0`], but fails when nothing matched.
pub fn many1<'a, P: Parser<'a>>(parser: P) -> impl Parser<'a> {
    let parser = many0(parser);
    move |input: &'a str| -> PResult<'a> {
        let node = parser.parse(input)?;
        if node.children().is_empty() {
            Err(ParseError::vacuous(input))
        } else {
            Ok(node)
        }
    }
}

/// Consumes code points up to the first position where `stop` matches,
/// without consuming what `stop` matched.
///
/// End of input counts as a position, so `take_until(empty)` takes everything.
pub fn take_until<'a, P: Parser<'a>>(stop: P) -> impl Parser<'a> {
    move |input: &'a str| -> PResult<'a> {
        input
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(input.len()))
            .find(|&offset| stop.parse(&input[offset..]).is_ok())
            .map(|offset| ParseNode::leaf(input, offset))
            .ok_or_else(|| ParseError::unterminated(input))
    }
}

/// Labels whatever `parser` matches with `kind`.
pub fn marked<'a, P: Parser<'a>>(kind: Kind, parser: P) -> impl Parser<'a> {
    move |input: &'a str| -> PResult<'a> { parser.parse(input).map(|node| node.with_kind(kind)) }
}

/// A fixed list of parsers applied one after another.
///
/// Implemented for tuples of parsers.
pub trait Sequence<'a> {
    /// Apply each parser in turn to what the previous one left, pushing every
    /// success onto `children`, and return the input left at the end.
    ///
    /// On failure, `children` holds the results that came before it.
    fn parse_each(
        &self,
        input: &'a str,
        children: &mut Vec<ParseNode<'a>>,
    ) -> Result<&'a str, ParseError>;
}

/// A fixed list of parsers tried in order on the same input.
///
/// Implemented for tuples of parsers.
pub trait Alternatives<'a> {
    /// The result of the first parser that matches.
    fn parse_first(&self, input: &'a str) -> PResult<'a>;
}

macro_rules! impl_tuples {
    ($($name:ident $idx:tt),+) => {
        impl<'a, $($name: Parser<'a>),+> Sequence<'a> for ($($name,)+) {
            fn parse_each(
                &self,
                input: &'a str,
                children: &mut Vec<ParseNode<'a>>,
            ) -> Result<&'a str, ParseError> {
                let mut rest = input;
                $(
                    let node = self.$idx.parse(rest)?;
                    rest = node.remaining();
                    children.push(node);
                )+
                Ok(rest)
            }
        }

        impl<'a, $($name: Parser<'a>),+> Alternatives<'a> for ($($name,)+) {
            fn parse_first(&self, input: &'a str) -> PResult<'a> {
                $(
                    if let Ok(node) = self.$idx.parse(input) {
                        return Ok(node);
                    }
                )+
                Err(ParseError::exhausted(input))
            }
        }
    };
}

impl_tuples!(P0 0);
impl_tuples!(P0 0, P1 1);
impl_tuples!(P0 0, P1 1, P2 2);
impl_tuples!(P0 0, P1 1, P2 2, P3 3);
impl_tuples!(P0 0, P1 1, P2 2, P3 3, P4 4);
impl_tuples!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5);
impl_tuples!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6);
impl_tuples!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7);
impl_tuples!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8);
impl_tuples!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9);
impl_tuples!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9, P10 10);
impl_tuples!(P0 0, P1 1, P2 2, P3 3, P4 4, P5 5, P6 6, P7 7, P8 8, P9 9, P10 10, P11 11);
