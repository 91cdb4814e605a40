//! Text normalization applied before transcripts are compared.
//!
//! Reference captions carry markup, punctuation, and annotations that the
//! speech service never emits; both sides are reduced to the same plain form
//! so the comparison measures recognition quality rather than formatting.

/// Punctuation deleted outright during normalization
const PUNCTUATION: [char; 8] = ['?', '!', '@', '#', '$', '.', ',', '/'];

/// Normalize text for comparison.
///
/// Lowercases, strips angle-bracket tags, deletes punctuation, removes
/// trailing parenthetical annotations, folds Spanish diacritics to their
/// base letters, and collapses whitespace runs. Normalizing an already
/// normalized string is a no-op.
pub fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let untagged = strip_tags(&lowered);
    let unpunctuated: String = untagged.chars().filter(|c| !PUNCTUATION.contains(c)).collect();
    let trimmed = strip_trailing_parentheticals(&unpunctuated);
    let folded: String = trimmed.chars().map(fold_diacritic).collect();
    collapse_whitespace(&folded)
}

/// Remove `<...>` spans. An unclosed `<` drops the rest of the string.
fn strip_tags(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c == '<' {
            for inner in chars.by_ref() {
                if inner == '>' {
                    break;
                }
            }
        } else {
            output.push(c);
        }
    }

    output
}

/// Remove parenthetical annotations hanging off the end of the string.
///
/// Applied repeatedly, so `"hola (ruido) (tos)"` loses both groups. A closing
/// paren with no matching opener is left alone.
fn strip_trailing_parentheticals(input: &str) -> String {
    let mut text = input.trim_end().to_string();

    while text.ends_with(')') {
        let Some(open) = matching_open_paren(&text) else {
            break;
        };
        text.truncate(open);
        text.truncate(text.trim_end().len());
    }

    text
}

/// Byte index of the `(` matching the final `)`, if balanced
fn matching_open_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;

    for (index, c) in text.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }

    None
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        _ => c,
    }
}

/// Collapse whitespace runs to single spaces and trim the ends
fn collapse_whitespace(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut prev_space = false;

    for c in input.trim().chars() {
        if c.is_whitespace() {
            if !prev_space {
                output.push(' ');
            }
            prev_space = true;
        } else {
            output.push(c);
            prev_space = false;
        }
    }

    output
}
