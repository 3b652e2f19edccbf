//! Preparing raw text before it is parsed.

/// Join several message parts as separate paragraphs, the way
/// `git commit -m a -m b` does.
pub fn join_paragraphs<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut message = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if 0 < i {
            message.push_str("\n\n");
        }
        message.push_str(part.as_ref());
    }
    message
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Drop the `#` comment lines git puts in commit message templates.
pub fn strip_comments(text: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| !is_comment(line))
        .collect()
}

/// Nothing but whitespace and comment lines.
pub fn is_effectively_empty(text: &str) -> bool {
    text.lines()
        .all(|line| line.trim().is_empty() || is_comment(line))
}
