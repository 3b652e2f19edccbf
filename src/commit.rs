//! The structured commit record, and how it is parsed and rendered.

use std::fmt;

use tracing::{debug, trace};

use crate::engine::{sequence, Parser};
use crate::grammar::{self, Stage, STAGES};
use crate::node::{Kind, ParseNode};
use crate::{Error, ErrorKind, Vocabulary};

const BREAKING_PHRASE: &str = "BREAKING CHANGE";

/// A commit message broken into its Conventional Commit parts.
///
/// Records produced by parsing hold whatever the message contained, which may
/// be incomplete; see [`CommitRecord::is_minimally_valid`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommitRecord {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    ty: String,
    scope: String,
    description: String,
    body: String,
    footers: Vec<String>,
    breaking_change: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    breaking_note: Option<String>,
}

/// Parse as much of `message` as matches the Conventional Commit grammar.
///
/// The record always holds everything recognized before the grammar stopped.
/// The error is present iff the grammar did not match to completion, and says
/// which element was missing; it never invalidates the record.
///
/// ```rust
/// let (record, err) = git_cc::parse_as_much_as_possible("feat");
/// assert_eq!(record.type_(), "feat");
/// assert_eq!(record.description(), "");
/// assert_eq!(err.unwrap().kind(), git_cc::ErrorKind::MissingSeparator);
/// ```
pub fn parse_as_much_as_possible(message: &str) -> (CommitRecord, Option<Error>) {
    let progress = grammar::message(message);
    for (stage, node) in STAGES.iter().zip(progress.node.children()) {
        trace!(?stage, kind = ?node.kind(), value = node.value(), "stage matched");
    }
    let stopped = progress.failure.map(|cause| {
        let matched = progress.node.children().len();
        let stage = STAGES.get(matched).copied().unwrap_or(Stage::Done);
        let offset = offset_of(message, progress.node.remaining());
        debug!(?stage, offset, %cause, "commit message grammar incomplete");
        Error::with_cause(stage_error(stage), offset, cause)
    });

    let mut record = CommitRecord::default();
    let ingested = record.ingest(message, progress.node.children());
    (record, stopped.or(ingested.err()))
}

fn stage_error(stage: Stage) -> ErrorKind {
    match stage {
        Stage::Type => ErrorKind::MissingType,
        Stage::Separator => ErrorKind::MissingSeparator,
        Stage::Description => ErrorKind::MissingDescription,
        Stage::Done => ErrorKind::TrailingInput,
        Stage::Scope | Stage::Bang | Stage::BodyOrFooters => ErrorKind::InvalidFormat,
    }
}

/// Code points of `message` before `remaining`.
fn offset_of(message: &str, remaining: &str) -> usize {
    message[..message.len() - remaining.len()].chars().count()
}

fn trim(value: &str) -> &str {
    value.trim_matches(|c| matches!(c, '\n' | '\r' | '\t' | ' '))
}

impl CommitRecord {
    /// Parse a complete commit message.
    ///
    /// # Errors
    ///
    /// This function returns an error if the message does not match the
    /// grammar to completion. Use [`parse_as_much_as_possible`] to keep the
    /// partial record.
    pub fn parse(message: &str) -> Result<Self, Error> {
        match parse_as_much_as_possible(message) {
            (record, None) => Ok(record),
            (_, Some(err)) => Err(err),
        }
    }

    /// Populate fields from the tagged nodes of a parse, in one pass.
    ///
    /// Nodes of an unexpected kind are skipped and reported as
    /// [`ErrorKind::UnexpectedNode`] once everything else is ingested.
    pub(crate) fn ingest(&mut self, message: &str, nodes: &[ParseNode<'_>]) -> Result<(), Error> {
        let mut unexpected = None;
        let mut flag = |node: &ParseNode<'_>| {
            unexpected.get_or_insert_with(|| {
                Error::new(ErrorKind::UnexpectedNode, start_of(message, node))
            });
        };

        for node in nodes {
            match node.kind() {
                Kind::CommitType => node.value().clone_into(&mut self.ty),
                Kind::Scope => node.value().clone_into(&mut self.scope),
                Kind::BreakingChangeBang => self.breaking_change = true,
                Kind::Description => trim(node.value()).clone_into(&mut self.description),
                Kind::Body => trim(node.value()).clone_into(&mut self.body),
                Kind::Footers => {
                    for footer in node.children() {
                        if footer.kind() != Kind::Footer {
                            flag(footer);
                            continue;
                        }
                        trace!(footer = footer.value(), "ingesting footer");
                        self.footers.push(trim(footer.value()).to_owned());
                        if footer.children().iter().any(|c| c.kind() == Kind::BreakingChange) {
                            self.breaking_change = true;
                        }
                    }
                }
                Kind::Footer | Kind::BreakingChange => flag(node),
                Kind::Untagged => {}
            }
        }

        match unexpected {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The type of the commit, e.g. `feat`.
    pub fn type_(&self) -> &str {
        &self.ty
    }

    /// The scope of the commit; empty when unscoped.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The one-line summary.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The commit body, containing a more detailed explanation of the commit
    /// changes. Empty when absent.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Every footer, as written: `Token: value` or `Token #value`.
    pub fn footers(&self) -> &[String] {
        &self.footers
    }

    /// A flag to signal that the commit contains breaking changes.
    ///
    /// This flag is set either when the commit has an exclamation mark after
    /// the message type and scope, e.g.:
    /// ```text
    /// feat(scope)!: this is a breaking change
    /// ```
    ///
    /// Or when a `BREAKING CHANGE: ` or `BREAKING-CHANGE: ` footer is present:
    /// ```text
    /// feat: my commit description
    ///
    /// BREAKING CHANGE: this is a breaking change
    /// ```
    pub fn breaking_change(&self) -> bool {
        self.breaking_change
    }

    /// The explanation given through [`CommitRecord::set_breaking_note`].
    pub fn breaking_note(&self) -> Option<&str> {
        self.breaking_note.as_deref()
    }

    /// The text of every breaking-change footer, without its token.
    pub fn breaking_change_notes(&self) -> Vec<&str> {
        self.footers
            .iter()
            .filter_map(|footer| {
                sequence((grammar::breaking_change, grammar::separator))
                    .parse(footer.as_str())
                    .ok()
                    .map(|node| node.remaining())
            })
            .collect()
    }

    /// Replace the commit type.
    pub fn set_type(&mut self, ty: impl Into<String>) {
        self.ty = ty.into();
    }

    /// Replace the scope; empty for none.
    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.scope = scope.into();
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Replace the body; empty for none.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Append a raw footer line.
    pub fn push_footer(&mut self, footer: impl Into<String>) {
        self.footers.push(footer.into());
    }

    /// Set or clear the breaking-change flag.
    ///
    /// Clearing it also drops any note set by [`CommitRecord::set_breaking_note`].
    pub fn set_breaking_change(&mut self, breaking: bool) {
        self.breaking_change = breaking;
        if !breaking {
            self.breaking_note = None;
        }
    }

    /// Record an explanation of the breaking change.
    ///
    /// A non-empty note marks the commit as breaking. When rendered, it becomes
    /// a `BREAKING CHANGE: ` footer unless the record already has one.
    pub fn set_breaking_note(&mut self, note: impl Into<String>) {
        let note = note.into();
        if trim(&note).is_empty() {
            self.breaking_note = None;
        } else {
            self.breaking_change = true;
            self.breaking_note = Some(note);
        }
    }

    /// Both a type and a description are present.
    pub fn is_minimally_valid(&self) -> bool {
        !self.ty.is_empty() && !self.description.is_empty()
    }

    /// The type is one of `types`.
    pub fn type_valid(&self, types: &Vocabulary) -> bool {
        types.contains(&self.ty)
    }

    /// The commit is unscoped, or its scope is one of `scopes`.
    pub fn scope_valid(&self, scopes: &Vocabulary) -> bool {
        self.scope.is_empty() || scopes.contains(&self.scope)
    }

    /// The first line: `type[(scope)][!]: description`.
    pub fn header(&self) -> String {
        let mut header = self.ty.clone();
        if !self.scope.is_empty() {
            header.push('(');
            header.push_str(&self.scope);
            header.push(')');
        }
        if self.breaking_change {
            header.push('!');
        }
        header.push_str(": ");
        header.push_str(&self.description);
        header
    }

    fn has_breaking_footer(&self) -> bool {
        !self.breaking_change_notes().is_empty()
    }
}

/// Code points of `message` before `node`, assuming `node` consumed its value.
fn start_of(message: &str, node: &ParseNode<'_>) -> usize {
    let start = message
        .len()
        .saturating_sub(node.value().len() + node.remaining().len());
    message.get(..start).map_or(0, |prefix| prefix.chars().count())
}

impl fmt::Display for CommitRecord {
    /// The canonical message:
    /// `type[(scope)][!]: description\n\n[body\n\n][footer\n]*`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n", self.header())?;

        if !self.body.is_empty() {
            write!(f, "{}\n\n", self.body)?;
        }

        for footer in &self.footers {
            writeln!(f, "{footer}")?;
        }

        if let Some(note) = &self.breaking_note {
            if self.breaking_change && !self.has_breaking_footer() {
                writeln!(f, "{BREAKING_PHRASE}: {}", trim(note))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;
    #[cfg(feature = "serde")]
    use serde_test::Token;

    fn record(
        ty: &str,
        scope: &str,
        description: &str,
        body: &str,
        footers: &[&str],
        breaking_change: bool,
    ) -> CommitRecord {
        CommitRecord {
            ty: ty.to_owned(),
            scope: scope.to_owned(),
            description: description.to_owned(),
            body: body.to_owned(),
            footers: footers.iter().map(|f| (*f).to_owned()).collect(),
            breaking_change,
            breaking_note: None,
        }
    }

    #[test]
    fn test_breaking_change_footer() {
        let message = "feat: allow provided config object to extend other configs\n\nBREAKING CHANGE: `extends` key in config file is now used for extending other config files\n";
        let commit = CommitRecord::parse(message).unwrap();

        assert_eq!(
            commit,
            record(
                "feat",
                "",
                "allow provided config object to extend other configs",
                "",
                &["BREAKING CHANGE: `extends` key in config file is now used for extending other config files"],
                true,
            )
        );
        assert_eq!(
            commit.breaking_change_notes(),
            ["`extends` key in config file is now used for extending other config files"]
        );
    }

    #[test]
    fn test_breaking_change_bang() {
        let commit = CommitRecord::parse("refactor!: drop support for Node 6").unwrap();

        assert_eq!(commit.type_(), "refactor");
        assert!(commit.breaking_change());
        assert_eq!(commit.description(), "drop support for Node 6");
        assert!(commit.footers().is_empty());
        assert!(commit.breaking_change_notes().is_empty());
    }

    #[test]
    fn test_breaking_change_bang_and_footer() {
        let commit = CommitRecord::parse(indoc! {"
            refactor!: drop support for Node 6

            BREAKING CHANGE: refactor to use JavaScript features not available in Node 6.

        "})
        .unwrap();

        assert!(commit.breaking_change());
        assert_eq!(
            commit.footers(),
            ["BREAKING CHANGE: refactor to use JavaScript features not available in Node 6."]
        );
    }

    #[test]
    fn test_breaking_change_arrow_footer() {
        let commit = CommitRecord::parse(indoc! {"
            fix: message

            BREAKING-CHANGE: it's broken"})
        .unwrap();

        assert!(commit.breaking_change());
        assert_eq!(commit.breaking_change_notes(), ["it's broken"]);
    }

    #[test]
    fn test_not_breaking() {
        let commit = CommitRecord::parse("docs: correct spelling of CHANGELOG").unwrap();

        assert!(!commit.breaking_change());
        assert_eq!(commit.type_(), "docs");
        assert_eq!(commit.description(), "correct spelling of CHANGELOG");
    }

    #[test]
    fn test_scope() {
        let commit = CommitRecord::parse("feat(lang): add polish language").unwrap();

        assert_eq!(commit.type_(), "feat");
        assert_eq!(commit.scope(), "lang");
        assert_eq!(commit.description(), "add polish language");
    }

    #[test]
    fn test_body_and_footers() {
        let commit = CommitRecord::parse(
            "fix: correct minor typos in code\n\nsee the issue for details\n\non typos fixed.\n\nReviewed-by: Z\nRefs #133",
        )
        .unwrap();

        assert_eq!(commit.description(), "correct minor typos in code");
        assert_eq!(commit.body(), "see the issue for details\n\non typos fixed.");
        assert_eq!(commit.footers(), ["Reviewed-by: Z", "Refs #133"]);
        assert!(!commit.breaking_change());
    }

    #[test]
    fn test_revert_footer_without_body() {
        let commit = CommitRecord::parse(indoc! {"
            revert: let us never again speak of the noodle incident

            Refs: 676104e, a215868"})
        .unwrap();

        assert_eq!(commit.body(), "");
        assert_eq!(commit.footers(), ["Refs: 676104e, a215868"]);
    }

    #[test]
    fn test_crlf() {
        let commit = CommitRecord::parse("fix(io): handle CRLF\r\n\r\nWith a body.\r\n").unwrap();

        assert_eq!(commit.scope(), "io");
        assert_eq!(commit.description(), "handle CRLF");
        assert_eq!(commit.body(), "With a body.");
    }

    #[test]
    fn test_trailing_newlines() {
        for message in [
            "type: hello world\n",
            "type: hello world\n\n",
            "type: hello world\n\n\n",
        ] {
            let commit = CommitRecord::parse(message).unwrap();
            assert_eq!(commit.type_(), "type");
            assert_eq!(commit.description(), "hello world");
            assert_eq!(commit.body(), "");
        }
    }

    #[test]
    fn test_footer_like_body_line_starts_footers() {
        // Known limitation: a `word: text` line inside the body ends the body.
        let commit = CommitRecord::parse(indoc! {"
            chore: tidy up

            First paragraph.
            Note: see below
            More text."})
        .unwrap();

        assert_eq!(commit.body(), "First paragraph.");
        assert_eq!(commit.footers(), ["Note: see below\nMore text."]);
    }

    #[test]
    fn test_non_ascii_key_stays_in_body() {
        let commit = CommitRecord::parse("fix: x\n\nvoilà: body text").unwrap();
        assert_eq!(commit.body(), "voilà: body text");
        assert!(commit.footers().is_empty());
    }

    #[test]
    fn test_partial_type_only() {
        let (commit, err) = parse_as_much_as_possible("feat");

        assert_eq!(commit, record("feat", "", "", "", &[], false));
        let err = err.unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingSeparator);
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn test_partial_keeps_scope_and_bang() {
        let (commit, err) = parse_as_much_as_possible("feat(ui)!");

        assert_eq!(commit.type_(), "feat");
        assert_eq!(commit.scope(), "ui");
        assert!(commit.breaking_change());
        assert_eq!(err.unwrap().kind(), ErrorKind::MissingSeparator);
    }

    #[test]
    fn test_partial_offset_counts_code_points() {
        let (commit, err) = parse_as_much_as_possible("fëat:");

        assert_eq!(commit.type_(), "fëat");
        assert_eq!(err.unwrap().offset(), 4);
    }

    #[test]
    fn test_empty_input() {
        let (commit, err) = parse_as_much_as_possible("");

        assert_eq!(commit, CommitRecord::default());
        assert_eq!(err.unwrap().kind(), ErrorKind::MissingSeparator);
        assert!(CommitRecord::parse("").is_err());
    }

    #[test]
    fn test_header_only_without_description() {
        let (commit, err) = parse_as_much_as_possible("feat: ");

        assert!(err.is_none());
        assert_eq!(commit.type_(), "feat");
        assert!(!commit.is_minimally_valid());

        // Neither an empty type nor an empty description is a grammar error.
        let (commit, err) = parse_as_much_as_possible(": x");
        assert!(err.is_none());
        assert_eq!(commit.type_(), "");
        assert_eq!(commit.description(), "x");
    }

    #[test]
    fn test_unexpected_nodes_are_errors() {
        let input = "!x";
        let stray = ParseNode::leaf(input, 1).with_kind(Kind::BreakingChange);
        let ty = ParseNode::leaf(stray.remaining(), 1).with_kind(Kind::CommitType);

        let mut commit = CommitRecord::default();
        let err = commit.ingest(input, &[stray, ty]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedNode);
        assert_eq!(err.offset(), 0);
        assert_eq!(commit.type_(), "x");
    }

    #[test]
    fn test_breaking_change_precedence() {
        let cases = [
            ("feat: x", false),
            ("feat!: x", true),
            ("feat: x\n\nBREAKING CHANGE: y", true),
            ("feat!: x\n\nBREAKING CHANGE: y", true),
            ("feat: x\n\nRefs #1", false),
        ];
        for (message, breaking) in cases {
            let commit = CommitRecord::parse(message).unwrap();
            assert_eq!(commit.breaking_change(), breaking, "{message:?}");
        }
    }

    #[test]
    fn test_display() {
        let commit = record(
            "feat",
            "lang",
            "add polish language",
            "Adds pl.",
            &["Refs #12", "Reviewed-by: Z"],
            true,
        );
        assert_eq!(
            commit.to_string(),
            "feat(lang)!: add polish language\n\nAdds pl.\n\nRefs #12\nReviewed-by: Z\n"
        );

        let commit = record("docs", "", "fix typo", "", &[], false);
        assert_eq!(commit.to_string(), "docs: fix typo\n\n");
    }

    #[test]
    fn test_breaking_note_synthesizes_footer() {
        let mut commit = record("feat", "", "drop v1 api", "", &[], false);
        commit.set_breaking_note("v1 endpoints are gone\n");

        assert!(commit.breaking_change());
        assert_eq!(
            commit.to_string(),
            "feat!: drop v1 api\n\nBREAKING CHANGE: v1 endpoints are gone\n"
        );

        // An existing footer wins over the note.
        commit.push_footer("BREAKING CHANGE: see the migration guide");
        assert_eq!(
            commit.to_string(),
            "feat!: drop v1 api\n\nBREAKING CHANGE: see the migration guide\n"
        );
    }

    #[test]
    fn test_blank_breaking_note_is_ignored() {
        let mut commit = record("feat", "", "x", "", &[], false);
        commit.set_breaking_note("  \n");

        assert!(!commit.breaking_change());
        assert_eq!(commit.breaking_note(), None);
    }

    #[test]
    fn test_clearing_breaking_change_drops_note() {
        let mut commit = CommitRecord::parse("feat: x").unwrap();
        commit.set_breaking_note("api gone");
        commit.set_breaking_change(false);

        assert_eq!(commit.breaking_note(), None);
        assert_eq!(commit.to_string(), "feat: x\n\n");
        let reparsed = CommitRecord::parse(&commit.to_string()).unwrap();
        assert!(!reparsed.breaking_change());
        assert_eq!(reparsed, commit);
    }

    #[test]
    fn test_stages_are_traced() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing::span;

        struct StageCounter(Arc<AtomicUsize>);

        impl tracing::Subscriber for StageCounter {
            fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
                true
            }
            fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
                span::Id::from_u64(1)
            }
            fn record(&self, _: &span::Id, _: &span::Record<'_>) {}
            fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}
            fn event(&self, event: &tracing::Event<'_>) {
                let metadata = event.metadata();
                if *metadata.level() == tracing::Level::TRACE
                    && metadata.fields().field("stage").is_some()
                {
                    self.0.fetch_add(1, Ordering::SeqCst);
                }
            }
            fn enter(&self, _: &span::Id) {}
            fn exit(&self, _: &span::Id) {}
        }

        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = StageCounter(Arc::clone(&count));
        tracing::subscriber::with_default(subscriber, || {
            parse_as_much_as_possible("fix(parser)");
        });
        // type, scope and an empty bang
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_round_trip() {
        let records = [
            record("feat", "", "add x", "", &[], false),
            record("fix", "parser", "handle crlf", "", &[], true),
            record("docs", "", "explain", "Two\nlines.\n\nTwo paragraphs.", &[], false),
            record("feat", "api", "drop v1", "", &["BREAKING CHANGE: gone"], true),
            record(
                "fix",
                "",
                "correct minor typos in code",
                "see the issue for details",
                &["Reviewed-by: Z", "Refs #133"],
                false,
            ),
        ];
        for expected in records {
            let actual = CommitRecord::parse(&expected.to_string()).unwrap();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_setters() {
        let (mut commit, _) = parse_as_much_as_possible("wip");
        commit.set_type("feat");
        commit.set_scope("cli");
        commit.set_description("add --dry-run");
        commit.set_body("Prints instead of committing.");
        commit.set_breaking_change(false);

        assert!(commit.is_minimally_valid());
        assert_eq!(commit.header(), "feat(cli): add --dry-run");
    }

    #[test]
    fn test_vocabulary_checks() {
        let types = Vocabulary::angular();
        let scopes = Vocabulary::from_iter([("parser", "the parsing core")]);

        let commit = CommitRecord::parse("feat(parser): x").unwrap();
        assert!(commit.type_valid(&types));
        assert!(commit.scope_valid(&scopes));

        let commit = CommitRecord::parse("feature(cli): x").unwrap();
        assert!(!commit.type_valid(&types));
        assert!(!commit.scope_valid(&scopes));

        let commit = CommitRecord::parse("fix: x").unwrap();
        assert!(commit.scope_valid(&Vocabulary::default()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_commit_serialize() {
        let mut commit = CommitRecord::parse("type(my scope)!: hello world").unwrap();
        commit.set_breaking_note("ignored by serde");
        serde_test::assert_ser_tokens(
            &commit,
            &[
                Token::Struct {
                    name: "CommitRecord",
                    len: 6,
                },
                Token::Str("type"),
                Token::Str("type"),
                Token::Str("scope"),
                Token::Str("my scope"),
                Token::Str("description"),
                Token::Str("hello world"),
                Token::Str("body"),
                Token::Str(""),
                Token::Str("footers"),
                Token::Seq { len: Some(0) },
                Token::SeqEnd,
                Token::Str("breaking_change"),
                Token::Bool(true),
                Token::StructEnd,
            ],
        );
    }
}
