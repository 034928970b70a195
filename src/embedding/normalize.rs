//! Name normalisation shared by the n-gram embedder, alias generation and
//! clarification matching.

/// Fold a single lowercase character to its ASCII base form, if it has one.
fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'ç' | 'ć' | 'č' => "c",
        'ğ' => "g",
        'ı' | 'í' | 'ì' | 'î' | 'ï' => "i",
        'ö' | 'ó' | 'ò' | 'ô' | 'õ' | 'ø' => "o",
        'ş' | 'ș' | 'ś' | 'š' => "s",
        'ü' | 'ú' | 'ù' | 'û' => "u",
        'â' | 'á' | 'à' | 'ä' | 'ã' | 'å' => "a",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'ñ' => "n",
        'ț' => "t",
        'ý' | 'ÿ' => "y",
        'ž' => "z",
        'ł' => "l",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Lowercase, fold diacritics and split on anything that is not alphanumeric.
pub fn name_tokens(text: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if is_combining_mark(c) {
            continue;
        }
        if let Some(folded) = fold_char(c) {
            cleaned.push_str(folded);
        } else if c.is_alphanumeric() {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Canonical comparison form of a name: folded tokens joined by single spaces.
pub fn normalize_name(text: &str) -> String {
    name_tokens(text).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Ali Şahin", "ali sahin")]
    #[test_case("  Özden   Gebizli Orkon ", "ozden gebizli orkon")]
    #[test_case("Şahin Nicat, Ph.D", "sahin nicat ph d")]
    #[test_case("İREM IŞIK", "irem isik")]
    #[test_case("ali.sahin", "ali sahin")]
    #[test_case("", "")]
    fn test_normalize_name(input: &str, expected: &str) {
        assert_eq!(normalize_name(input), expected);
    }

    #[test]
    fn test_tokens_drop_punctuation() {
        assert_eq!(name_tokens("Emre-Çelik!"), vec!["emre", "celik"]);
    }
}
