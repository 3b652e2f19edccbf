//! A best-effort parser for [Conventional Commit] messages.
//!
//! [conventional commit]: https://www.conventionalcommits.org
//!
//! Messages are matched by a small grammar built from composable
//! [parser combinators][engine]. Parsing never gives up on the whole message:
//! [`parse_as_much_as_possible`] returns every part it recognized, along with
//! an error naming the first part it could not find, so an interactive prompt
//! can ask for just what is missing.
//!
//! # Example
//!
//! ```rust
//! use indoc::indoc;
//!
//! let message = indoc!("
//!     docs(example)!: add tested usage example
//!
//!     This example is tested using Rust's doctest capabilities. Having this
//!     example helps people understand how to use the parser.
//!
//!     BREAKING CHANGE: Going from nothing to something, meaning anyone doing
//!     nothing before suddenly has something to do. That sounds like a change
//!     in your break.
//!
//!     Co-Authored-By: Lisa Simpson <lisa@simpsons.fam>
//!     Closes #12
//! ");
//!
//! let commit = git_cc::CommitRecord::parse(message).unwrap();
//!
//! // You can access all components of the header.
//! assert_eq!(commit.type_(), "docs");
//! assert_eq!(commit.scope(), "example");
//! assert_eq!(commit.description(), "add tested usage example");
//!
//! // And the free-form commit body.
//! assert!(commit.body().contains("helps people understand"));
//!
//! // If a commit is marked with a bang (`!`) OR has a footer with the key
//! // "BREAKING CHANGE", it is considered a "breaking" commit.
//! assert!(commit.breaking_change());
//!
//! // Footers are kept as written, one entry per footer.
//! assert!(commit.footers()[0].ends_with("That sounds like a change\nin your break."));
//! assert_eq!(commit.footers()[1], "Co-Authored-By: Lisa Simpson <lisa@simpsons.fam>");
//! assert_eq!(commit.footers()[2], "Closes #12");
//!
//! // Whether the record is good enough to commit depends on the project.
//! let convention = git_cc::Convention {
//!     scopes: git_cc::Vocabulary::from_iter([("example", "usage examples")]),
//!     ..Default::default()
//! };
//! assert!(convention.check(&commit).is_empty());
//! assert_eq!(
//!     git_cc::Convention::default().check(&commit),
//!     [git_cc::Problem::InvalidScope]
//! );
//!
//! // Rendering gives the canonical message back.
//! assert!(commit.to_string().starts_with("docs(example)!: add tested usage example\n\n"));
//! ```
//!
//! An incomplete message still yields what was there:
//!
//! ```rust
//! let (commit, err) = git_cc::parse_as_much_as_possible("fix(parser)");
//! assert_eq!(commit.type_(), "fix");
//! assert_eq!(commit.scope(), "parser");
//! assert_eq!(err.unwrap().kind(), git_cc::ErrorKind::MissingSeparator);
//! ```

#![warn(missing_docs)]

mod commit;
mod convention;
pub mod engine;
mod error;
pub mod grammar;
mod message;
mod node;

pub use commit::{parse_as_much_as_possible, CommitRecord};
pub use convention::{Convention, Problem, Vocabulary, HEADER_MAX_LENGTH};
pub use error::{Error, ErrorKind, ParseError};
pub use message::{is_effectively_empty, join_paragraphs, strip_comments};
pub use node::{Kind, ParseNode};
