use unicode_normalization::UnicodeNormalization;

/// Canonical decomposition (NFD), newlines to spaces, outer whitespace trimmed.
pub fn normalize(s: &str) -> String {
    let decomposed: String = s.nfd().collect();
    decomposed.replace('\n', " ").trim().to_string()
}

/// Normalize the concatenated text nodes of an element.
pub fn normalize_parts<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    normalize(&parts.collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newlines_become_spaces() {
        assert_eq!(normalize("  Article 1\nScope \n"), "Article 1 Scope");
    }

    #[test]
    fn decomposes_accents() {
        let out = normalize("caf\u{e9}");
        assert_eq!(out, "cafe\u{301}");
    }

    #[test]
    fn idempotent() {
        for s in [
            "",
            "   ",
            "\n\u{e9}t\u{e9}\n",
            "\u{a0}non-breaking\u{a0}",
            "a\n\nb",
            "\u{1e9b}\u{323}",
            "\u{ff21}rticle 4(1)(\u{2160})",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn joins_parts() {
        let parts = ["Main ", "content:", "\n"];
        assert_eq!(normalize_parts(parts.into_iter()), "Main content:");
    }
}
