//! Markdown templates for SEO landing pages.
//!
//! Everything here is a pure function of its inputs: the same keyword and
//! emoji list always render the same page.

use crate::models::Emoji;

/// Normalize a name or keyword into a URL-safe slug.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `-` and strips separators from both ends. Idempotent.
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// Drop a trailing "emoji"/"emojis" word so "heart emoji" searches for "heart".
pub fn strip_emoji_suffix(keyword: &str) -> &str {
    let trimmed = keyword.trim();

    for suffix in ["emojis", "emoji"] {
        let Some(split) = trimmed.len().checked_sub(suffix.len()) else {
            continue;
        };
        let (Some(head), Some(tail)) = (trimmed.get(..split), trimmed.get(split..)) else {
            continue;
        };
        if tail.eq_ignore_ascii_case(suffix)
            && (head.is_empty() || head.ends_with(char::is_whitespace))
        {
            return head.trim_end();
        }
    }

    trimmed
}

/// Capitalize the first letter of every word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Display name of the page topic, e.g. "Thumbs Up" for "thumbs up emoji".
fn topic(keyword: &str) -> String {
    let base = title_case(strip_emoji_suffix(keyword));
    if base.is_empty() {
        "All".to_string()
    } else {
        base
    }
}

/// Page title for a keyword.
pub fn page_title(keyword: &str) -> String {
    format!("{} Emoji - Copy and Paste", topic(keyword))
}

/// Meta description for a keyword.
pub fn meta_description(keyword: &str) -> String {
    let topic = topic(keyword);
    format!(
        "Copy and paste {} emojis with one click. Browse every {} emoji, learn what it means and how to use it.",
        topic.to_lowercase(),
        topic
    )
}

/// Render the landing page body for a keyword and its related emojis.
pub fn render_markdown(keyword: &str, related: &[Emoji]) -> String {
    let topic = topic(keyword);
    let lower = topic.to_lowercase();
    let keyword = keyword.trim();

    let mut md = format!("# {topic} Emoji: Copy and Paste\n\n");
    md.push_str(&format!(
        "Looking for the perfect {}? Click any emoji below to copy it to your clipboard, \
         then paste it anywhere: messages, social posts, documents or code.\n\n",
        keyword.to_lowercase()
    ));

    md.push_str(&format!("## {topic} Emojis\n\n"));
    if related.is_empty() {
        md.push_str("_No matching emojis yet. Check back soon._\n\n");
    } else {
        let glyphs: Vec<&str> = related.iter().map(|e| e.emoji.as_str()).collect();
        md.push_str(&glyphs.join(" "));
        md.push_str("\n\n## What Each Emoji Means\n\n");
        for emoji in related {
            md.push_str(&format!(
                "- {} **{}**: {}.\n",
                emoji.emoji,
                emoji.name,
                meaning(emoji)
            ));
        }
        md.push('\n');
    }

    md.push_str(&format!("## How to Use {topic} Emojis\n\n"));
    md.push_str(&format!(
        "1. Find the {lower} emoji you want in the list above.\n"
    ));
    md.push_str("2. Click it once to copy it to your clipboard.\n");
    md.push_str(
        "3. Paste it with Ctrl+V (Windows/Linux) or Cmd+V (Mac), or long-press and paste on mobile.\n\n",
    );

    md.push_str("## Frequently Asked Questions\n\n");
    md.push_str(&format!("### How do I copy a {lower} emoji?\n\n"));
    md.push_str(
        "Click the emoji. It is copied to your clipboard instantly, no app or keyboard switch required.\n\n",
    );
    md.push_str(&format!("### Do {lower} emojis work everywhere?\n\n"));
    md.push_str(
        "Emojis are standard Unicode characters, so they work in every modern browser, phone and \
         messaging app. The exact artwork varies by platform.\n\n",
    );
    md.push_str(&format!("### How many {lower} emojis are there?\n\n"));
    md.push_str(&format!(
        "This page lists {} {} emoji{}.\n",
        related.len(),
        lower,
        if related.len() == 1 { "" } else { "s" }
    ));

    md
}

/// One-line meaning: the description, or the category when there is none.
fn meaning(emoji: &Emoji) -> String {
    match &emoji.description {
        Some(description) if !description.trim().is_empty() => {
            description.trim().trim_end_matches('.').to_string()
        }
        _ => format!("from the {} category", emoji.category),
    }
}
