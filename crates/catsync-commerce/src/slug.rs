/// URL-safe slug: lowercase ASCII alphanumerics separated by single hyphens.
///
/// Spanish accented letters fold to their ASCII base; other characters
/// become separators.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.chars().flat_map(char::to_lowercase) {
        let folded = match ch {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        };

        if folded.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(folded);
        } else {
            pending_hyphen = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Azul Marino"), "azul-marino");
    }

    #[test]
    fn folds_spanish_accents() {
        assert_eq!(slugify("Café Ñandú"), "cafe-nandu");
    }

    #[test]
    fn collapses_and_trims_separators() {
        assert_eq!(slugify("  --Red // Blue--  "), "red-blue");
    }

    #[test]
    fn empty_for_symbols_only() {
        assert_eq!(slugify("***"), "");
    }
}
