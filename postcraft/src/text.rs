//! Helpers for working with post text.

use regex::Regex;
use std::sync::LazyLock;

pub use crate::stages::is_ready_to_publish;

#[allow(clippy::unwrap_used)]
static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#[\p{L}\p{N}_]+$").unwrap());

#[allow(clippy::unwrap_used)]
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*").unwrap());

#[allow(clippy::unwrap_used)]
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\* ").unwrap());

fn is_hashtag(token: &str) -> bool {
    HASHTAG.is_match(token)
}

/// Returns the hashtags closing a post.
///
/// The closing block is the run of trailing non-empty lines made only of
/// hashtags. If the last line mixes prose and hashtags, its trailing hashtag
/// tokens are returned instead.
#[must_use]
pub fn trailing_hashtags(text: &str) -> Vec<String> {
    let mut lines = text.lines().rev().filter(|l| !l.trim().is_empty()).peekable();
    let mut block: Vec<&str> = Vec::new();

    while let Some(&line) = lines.peek() {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.peek().is_some() && tokens.all(is_hashtag) {
            block.push(line);
            lines.next();
        } else {
            break;
        }
    }

    if block.is_empty() {
        let Some(last) = lines.next() else {
            return Vec::new();
        };
        let mut tail: Vec<String> = last
            .split_whitespace()
            .rev()
            .take_while(|t| is_hashtag(t))
            .map(str::to_string)
            .collect();
        tail.reverse();
        return tail;
    }

    block
        .iter()
        .rev()
        .flat_map(|line| line.split_whitespace())
        .map(str::to_string)
        .collect()
}

/// Converts the Markdown the model writes into text that pastes cleanly into
/// a social network: bold markers are dropped and `* ` bullets, indented or
/// not, become indented dashes.
#[must_use]
pub fn markdown_to_plain_text(markdown: &str) -> String {
    let unbolded = BOLD.replace_all(markdown, "");
    BULLET.replace_all(&unbolded, "  - ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hashtag_block() {
        let post = "Big news today!\n\nRead more below.\n\n#AI #Rust\n#Tech\n";
        assert_eq!(trailing_hashtags(post), vec!["#AI", "#Rust", "#Tech"]);
    }

    #[test]
    fn test_hashtags_on_last_line() {
        let post = "Big news today!\nLearn it now #AI #Rust";
        assert_eq!(trailing_hashtags(post), vec!["#AI", "#Rust"]);
    }

    #[test]
    fn test_inline_hashtags_are_ignored() {
        let post = "We love #Rust here.\nSee you soon.";
        assert!(trailing_hashtags(post).is_empty());
        assert!(trailing_hashtags("").is_empty());
    }

    #[test]
    fn test_unicode_hashtags() {
        assert_eq!(
            trailing_hashtags("Aprenda agora\n#Programação #IA"),
            vec!["#Programação", "#IA"]
        );
    }

    #[test]
    fn test_markdown_to_plain_text() {
        let md = "**Title**\n* first\n* second\nend";
        assert_eq!(markdown_to_plain_text(md), "Title\n  - first\n  - second\nend");
    }

    #[test]
    fn test_indented_bullets_are_flattened() {
        let md = "Intro\n  * nested item\n\t* tabbed\n* top\nnot * a bullet";
        assert_eq!(
            markdown_to_plain_text(md),
            "Intro\n  - nested item\n  - tabbed\n  - top\nnot * a bullet"
        );
    }
}
