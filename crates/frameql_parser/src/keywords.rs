/// Try to get a keyword from a string, ignoring string casing.
pub fn keyword_from_str(s: &str) -> Option<Keyword> {
    let s = unicase::Ascii::new(s);
    let idx = match KEYWORD_STRINGS.binary_search(&s) {
        Ok(idx) => idx,
        Err(_) => return None,
    };
    Some(ALL_KEYWORDS[idx])
}

/// Generate an enum of keywords.
///
/// Keywords must be listed in alphabetical order.
macro_rules! define_keywords {
    ($($ident:ident),*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($ident),*
        }

        pub const ALL_KEYWORDS: &[Keyword] = &[
            $(Keyword::$ident),*
        ];

        pub const KEYWORD_STRINGS: &[unicase::Ascii<&str>] = &[
            $(unicase::Ascii::new(stringify!($ident)),)*
        ];

        impl Keyword {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Keyword::$ident => stringify!($ident),)*
                }
            }
        }
    };
}

#[rustfmt::skip]
define_keywords!(
    AS,
    COUNT,
    CREATE,
    DROP,
    EXISTS,
    FALSE,
    FROM,
    IF,
    LIMIT,
    NOT,
    NULL,
    OR,
    REPLACE,
    SELECT,
    TABLE,
    TRUE,
    VIEW,
    WITH
);

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive() {
        // (input, expected)
        let tests = [
            ("select", Some(Keyword::SELECT)),
            ("SeLeCt", Some(Keyword::SELECT)),
            ("SELECT", Some(Keyword::SELECT)),
            ("NOSELECT", None),
            ("replace", Some(Keyword::REPLACE)),
            ("with", Some(Keyword::WITH)),
        ];

        for (input, expected) in tests {
            let got = keyword_from_str(input);
            assert_eq!(expected, got);
        }
    }

    #[test]
    fn keywords_sorted() {
        for pair in KEYWORD_STRINGS.windows(2) {
            assert!(pair[0] < pair[1], "{} >= {}", pair[0], pair[1]);
        }
    }
}
