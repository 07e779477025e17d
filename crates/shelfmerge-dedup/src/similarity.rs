use std::collections::HashMap;

/// Sørensen–Dice coefficient over adjacent-character pairs, in `[0, 1]`.
///
/// Identical strings score 1.0 (including two empty strings); strings with
/// no bigram in common score 0.0. Whitespace is ignored.
pub fn dice(a: &str, b: &str) -> f64 {
    // strsim divides by byte length, which is only the pair count for ASCII.
    if a.is_ascii() && b.is_ascii() {
        return strsim::sorensen_dice(a, b);
    }
    char_dice(a, b)
}

fn char_dice(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b: Vec<char> = b.chars().filter(|c| !c.is_whitespace()).collect();

    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), usize> = HashMap::new();
    for pair in a.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut shared = 0usize;
    for pair in b.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1]))
            && *count > 0
        {
            *count -= 1;
            shared += 1;
        }
    }

    (2 * shared) as f64 / (a.len() + b.len() - 2) as f64
}

/// Highest [`dice`] score over every (left, right) pair, or 0.0 when either
/// side is empty. Inputs are expected to be normalized already.
pub fn max_pairwise_similarity<L, R>(left: &[L], right: &[R]) -> f64
where
    L: AsRef<str>,
    R: AsRef<str>,
{
    left.iter()
        .flat_map(|l| right.iter().map(move |r| dice(l.as_ref(), r.as_ref())))
        .fold(0.0, f64::max)
}
