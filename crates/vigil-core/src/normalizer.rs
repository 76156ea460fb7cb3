//! Text normalization for evasion-resistant matching.
//!
//! Blocked words are routinely obfuscated with spacing ("f u c k"),
//! punctuation ("f.u.c.k"), leetspeak ("fvck" variants like "fuck" spelled
//! with digits), and character repetition ("fuuuuck"). Normalizing both the
//! message and the blocklist entry before comparing defeats these.

/// Normalizes text for comparison against blocklist entries.
///
/// The steps run in a fixed order, each over the previous step's output:
/// lowercase, strip whitespace and `.`/`-`/`_`, map visually similar
/// characters to letters, collapse runs of 3+ identical characters to 2,
/// then collapse any remaining run of 2+ down to 1.
///
/// Pure and total; idempotent over all strings including the empty string.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();

    let stripped: String = lowered
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '.' | '-' | '_'))
        .collect();

    let substituted: String = stripped.chars().map(substitute).collect();

    // Both collapse passes run in sequence: runs of 3+ shrink to 2 first,
    // then any remaining pair shrinks to 1 as the final canonical form.
    let partially_collapsed = collapse_runs(&substituted, 3, 2);
    collapse_runs(&partially_collapsed, 2, 1)
}

/// Maps visually similar characters onto the letter they imitate.
/// Substitutions are independent of each other.
fn substitute(c: char) -> char {
    match c {
        '@' | '4' => 'a',
        '3' => 'e',
        '1' | '!' | '|' => 'i',
        '0' => 'o',
        '$' | '5' => 's',
        '7' | '+' => 't',
        other => other,
    }
}

/// Collapses every run of `min_run` or more identical characters down to
/// exactly `keep` repetitions. Shorter runs pass through unchanged.
fn collapse_runs(text: &str, min_run: usize, keep: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(current) = chars.next() {
        let mut run_len = 1;
        while chars.peek() == Some(&current) {
            chars.next();
            run_len += 1;
        }

        let emit = if run_len >= min_run { keep } else { run_len };
        for _ in 0..emit {
            out.push(current);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_input() {
        assert_eq!(normalize("HELLO"), "helo");
        assert_eq!(normalize("MiXeD"), "mixed");
    }

    #[test]
    fn strips_separators() {
        assert_eq!(normalize("f u c k"), "fuck");
        assert_eq!(normalize("f.u.c.k"), "fuck");
        assert_eq!(normalize("f-u-c-k"), "fuck");
        assert_eq!(normalize("f_u_c_k"), "fuck");
    }

    #[test]
    fn maps_leetspeak() {
        assert_eq!(normalize("c4sh"), "cash");
        assert_eq!(normalize("p@ssword"), "pasword");
        assert_eq!(normalize("h3ll0"), "helo");
        assert_eq!(normalize("$end"), "send");
        assert_eq!(normalize("7ruck"), "truck");
    }

    #[test]
    fn collapses_repeated_characters() {
        assert_eq!(normalize("fuuuuck"), "fuck");
        assert_eq!(normalize("fuuck"), "fuck");
        assert_eq!(normalize("fuck"), "fuck");
    }

    #[test]
    fn evasion_variants_normalize_identically() {
        let canonical = normalize("fuck");
        assert_eq!(normalize("f u c k"), canonical);
        assert_eq!(normalize("f.u.c.k"), canonical);
        assert_eq!(normalize("fuuuck"), canonical);
        assert_eq!(normalize("F-U-C-K"), canonical);
    }

    #[test]
    fn idempotent() {
        for input in [
            "",
            "hello world",
            "f u c k",
            "p@$$w0rd",
            "aaaa bbbb cccc",
            "Send me your b4nk account!!!",
        ] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("._-"), "");
    }

    #[test]
    fn collapse_runs_thresholds() {
        assert_eq!(collapse_runs("aaab", 3, 2), "aab");
        assert_eq!(collapse_runs("aab", 3, 2), "aab");
        assert_eq!(collapse_runs("aab", 2, 1), "ab");
        assert_eq!(collapse_runs("abc", 2, 1), "abc");
    }
}
