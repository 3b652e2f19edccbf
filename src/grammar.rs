//! The Conventional Commit grammar, built from [`engine`][crate::engine]
//! combinators.
//!
//! Every rule is a plain function so it can be used on its own or handed to
//! other combinators.
//!
//! Body and footer boundaries are found by scanning forward for the first
//! position that looks like a footer token, at any column. Body text such as
//! `Note: see below` therefore ends the body and starts a footer.

use once_cell::sync::Lazy;

use crate::engine::{
    any, delimited, empty, literal_rune, many0, marked, opt, sequence, some_of, tag, take_until,
    PResult, Parser, Progress, RegexParser,
};
use crate::node::Kind;

// <LF>              ::= "0x000A"
// <CR>              ::= "0x000D"
// <newline>         ::= <LF> | <CR>, <LF>
/// A line break.
pub fn newline(i: &str) -> PResult<'_> {
    any((literal_rune('\n'), tag("\r\n"))).parse(i)
}

// <separator>       ::= ":", <SP>
/// The `: ` that ends a header prefix or a footer token.
pub fn separator(i: &str) -> PResult<'_> {
    tag(": ").parse(i)
}

// <breaking-bang>   ::= "!"
/// The `!` marking a header as a breaking change.
pub fn breaking_change_bang(i: &str) -> PResult<'_> {
    marked(Kind::BreakingChangeBang, tag("!")).parse(i)
}

// <type>            ::= <any code points up to "!" | ":" | "(" | end of input>
/// The commit type.
///
/// Anything before the first `!`, `:` or `(` is accepted. Whether it is a
/// known type is for a [`Vocabulary`][crate::Vocabulary] to decide.
pub fn commit_type(i: &str) -> PResult<'_> {
    marked(
        Kind::CommitType,
        take_until(any((breaking_change_bang, tag(":"), tag("("), empty))),
    )
    .parse(i)
}

// <scope>           ::= "(", <any code points up to ")">, ")"
/// A parenthesized scope. The node holds the text between the parentheses.
pub fn scope(i: &str) -> PResult<'_> {
    marked(
        Kind::Scope,
        delimited(tag("("), take_until(tag(")")), tag(")")),
    )
    .parse(i)
}

// <description>     ::= <any code points up to <newline> | end of input>
/// The rest of the header line.
pub fn description(i: &str) -> PResult<'_> {
    marked(Kind::Description, take_until(any((empty, newline)))).parse(i)
}

// <breaking-change> ::= "BREAKING CHANGE" | "BREAKING-CHANGE"
/// The footer key signalling a breaking change.
pub fn breaking_change(i: &str) -> PResult<'_> {
    any((tag("BREAKING CHANGE"), tag("BREAKING-CHANGE"))).parse(i)
}

static KEBAB_WORD: Lazy<RegexParser> =
    Lazy::new(|| RegexParser::new(r"[0-9A-Za-z_-]+").expect("kebab-word pattern is valid"));

// <kebab-word>      ::= /[0-9A-Za-z_-]+/
/// A footer key such as `Reviewed-by`. Only ASCII word characters count.
pub fn kebab_word(i: &str) -> PResult<'_> {
    KEBAB_WORD.parse(i)
}

// <footer-token>    ::= <breaking-change>, <separator>
//                    |  <kebab-word>, (<separator> | <SP>, "#")
/// The start of a footer, e.g. `Refs #` or `BREAKING CHANGE: `.
///
/// A breaking-change token is marked [`Kind::BreakingChange`].
pub fn footer_token(i: &str) -> PResult<'_> {
    any((
        marked(Kind::BreakingChange, sequence((breaking_change, separator))),
        sequence((kebab_word, any((separator, tag(" #"))))),
    ))
    .parse(i)
}

// <body>            ::= <any code points up to <footer-token> | end of input>
/// Free-form text up to the first footer.
pub fn body(i: &str) -> PResult<'_> {
    marked(Kind::Body, take_until(any((empty, footer_token)))).parse(i)
}

// <footer>          ::= <footer-token>, <any code points up to <footer-token> | end of input>
/// A footer token and its value, which may span several lines.
pub fn footer(i: &str) -> PResult<'_> {
    marked(
        Kind::Footer,
        sequence((footer_token, take_until(any((empty, footer_token))))),
    )
    .parse(i)
}

// <footers>         ::= <footer>*
/// Every footer, in order.
pub fn footers(i: &str) -> PResult<'_> {
    marked(Kind::Footers, many0(footer)).parse(i)
}

/// The grammar elements matched in order by [`message`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Stage {
    /// [`commit_type`]
    Type,
    /// optional [`scope`]
    Scope,
    /// optional [`breaking_change_bang`]
    Bang,
    /// [`separator`]
    Separator,
    /// [`description`]
    Description,
    /// optional newlines, [`body`] and [`footers`]
    BodyOrFooters,
    /// end of input
    Done,
}

/// The stage of each element of [`message`], by position.
pub const STAGES: [Stage; 10] = [
    Stage::Type,
    Stage::Scope,
    Stage::Bang,
    Stage::Separator,
    Stage::Description,
    Stage::BodyOrFooters,
    Stage::BodyOrFooters,
    Stage::BodyOrFooters,
    Stage::BodyOrFooters,
    Stage::Done,
];

// <message>         ::= <type>, [<scope>], [<breaking-bang>], <separator>, <description>,
//                       [<newline>], [<newline>], [<body>], [<footers>]
/// A whole commit message, matched as far as it goes.
///
/// Elements that matched are kept even when a later one fails; the failing
/// element is [`STAGES`]`[node.children().len()]`.
pub fn message(i: &str) -> Progress<'_> {
    some_of((
        commit_type,
        opt(scope),
        opt(breaking_change_bang),
        separator,
        description,
        opt(newline),
        opt(newline),
        opt(body),
        opt(footers),
        empty,
    ))(i)
}
