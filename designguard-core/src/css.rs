//! Best-effort stylesheet lookups.
//!
//! This is not a CSS parser. A declaration is located by using the property
//! name as a literal, case-insensitive anchor followed by `:` and a non-empty
//! value terminated by `;` inside the same block. The first such occurrence in
//! the text wins. Shorthands, specificity and `!important` are not interpreted.

use regex::RegexBuilder;

/// A declaration located in a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Trimmed text between the colon and the terminating semicolon.
    pub value: String,
    /// Byte offset of the match in the stylesheet.
    pub offset: usize,
}

/// Find the first `property: value;` declaration in `css`.
///
/// Returns `None` when the property is empty or never declared. A value never
/// runs past the closing `}` of its block, and empty values are skipped.
pub fn find_declaration(css: &str, property: &str) -> Option<Declaration> {
    let property = property.trim();
    if property.is_empty() {
        return None;
    }
    let pattern = format!(r"{}\s*:([^;}}]*);", regex::escape(property));
    let matcher = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;
    matcher.captures_iter(css).find_map(|captures| {
        let whole = captures.get(0)?;
        let value = captures.get(1)?.as_str().trim();
        if value.is_empty() {
            return None;
        }
        Some(Declaration {
            value: value.to_string(),
            offset: whole.start(),
        })
    })
}

/// Parse the leading integer of a value the way browsers read `600` out of
/// `600px`: optional whitespace, optional sign, then digits.
///
/// Values without leading digits parse as `0`; digit runs too long for an
/// `i64` saturate to `i64::MAX` (or `i64::MIN` when negative).
pub fn leading_integer(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return 0;
    }
    match digits.parse::<i64>() {
        Ok(number) => sign * number,
        Err(_) if sign < 0 => i64::MIN,
        Err(_) => i64::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::{find_declaration, leading_integer};

    #[test]
    fn finds_first_declaration() {
        let css = ".btn{background-color:#0066FF;} .alt{background-color: #112233;}";
        let declaration = find_declaration(css, "background-color").expect("declared");
        assert_eq!(declaration.value, "#0066FF");
        assert_eq!(declaration.offset, 5);
    }

    #[test]
    fn trims_value_and_ignores_case() {
        let css = "h1 {\n  FONT-WEIGHT :   700 ;\n}";
        let declaration = find_declaration(css, "font-weight").expect("declared");
        assert_eq!(declaration.value, "700");
    }

    #[test]
    fn missing_property_yields_none() {
        assert!(find_declaration(".btn{color:red;}", "border-radius").is_none());
        assert!(find_declaration(".btn{color:red;}", "  ").is_none());
    }

    #[test]
    fn requires_terminating_semicolon() {
        assert!(find_declaration(".btn{border-radius:8px}", "border-radius").is_none());
    }

    #[test]
    fn value_stops_at_block_boundary() {
        assert!(find_declaration(".a{color:red} .b{margin:0;}", "color").is_none());

        let css = ".a{color:;} .b{color: blue;}";
        let declaration = find_declaration(css, "color").expect("declared");
        assert_eq!(declaration.value, "blue");
        assert_eq!(declaration.offset, 15);
    }

    #[test]
    fn property_is_a_literal_anchor() {
        let css = ".btn{background-color:#fff;color:#000;}";
        let declaration = find_declaration(css, "color").expect("declared");
        assert_eq!(declaration.value, "#fff");

        assert!(find_declaration("a{width:1px;}", "w.dth").is_none());
    }

    #[test]
    fn parses_leading_integers() {
        assert_eq!(leading_integer("600"), 600);
        assert_eq!(leading_integer(" 400px"), 400);
        assert_eq!(leading_integer("1.5rem"), 1);
        assert_eq!(leading_integer("-12"), -12);
        assert_eq!(leading_integer("bold"), 0);
        assert_eq!(leading_integer(""), 0);
        assert_eq!(leading_integer("-px"), 0);
    }

    #[test]
    fn overflowing_integers_saturate() {
        assert_eq!(leading_integer("99999999999999999999px"), i64::MAX);
        assert_eq!(leading_integer("-99999999999999999999"), i64::MIN);
        assert_eq!(leading_integer("-9223372036854775808"), i64::MIN);
    }
}
