//! Truncation of model output at configured stop sequences.

use crate::types::Part;

/// Cut `text` at the earliest occurrence of any non-empty stop sequence.
///
/// Returns the kept prefix and whether a stop sequence was found.
pub fn trim_at_stop<'a, S: AsRef<str>>(text: &'a str, stops: &[S]) -> (&'a str, bool) {
    let first = stops
        .iter()
        .map(AsRef::as_ref)
        .filter(|stop| !stop.is_empty())
        .filter_map(|stop| text.find(stop))
        .min();

    match first {
        Some(idx) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Trim the first text part that contains a stop sequence and blank the text
/// of every part after it. Function calls and responses are left intact.
///
/// Returns whether any stop sequence was found.
pub fn trim_parts_at_stop<S: AsRef<str>>(parts: &mut [Part], stops: &[S]) -> bool {
    let hit_at = parts.iter_mut().position(|part| match part {
        Part::Text(text) | Part::Thought(text) if !text.is_empty() => {
            let (kept, hit) = trim_at_stop(text, stops);
            if hit {
                let kept_len = kept.len();
                text.truncate(kept_len);
            }
            hit
        }
        _ => false,
    });

    let Some(idx) = hit_at else {
        return false;
    };

    for part in &mut parts[idx + 1..] {
        if let Part::Text(text) | Part::Thought(text) = part {
            text.clear();
        }
    }

    true
}
