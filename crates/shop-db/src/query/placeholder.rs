//! Central placeholder numbering.
//!
//! Fragments are written with bare `?` markers. When a statement is rendered
//! the markers are rewritten, left to right, to `?1..?N`. Markers inside
//! quoted literals or quoted identifiers are not placeholders and are left
//! untouched.

/// Rewrites every bare `?` outside quotes to `?N` and returns the rendered
/// SQL together with the number of placeholders emitted.
pub fn number_placeholders(sql: &str) -> (String, usize) {
    let mut out = String::with_capacity(sql.len() + 16);
    let mut count = 0;
    let mut quote: Option<char> = None;

    for ch in sql.chars() {
        match quote {
            Some(q) => {
                // A doubled quote closes and reopens, which is the SQL escape.
                if ch == q {
                    quote = None;
                }
                out.push(ch);
            }
            None => {
                match ch {
                    '\'' | '"' | '`' => {
                        quote = Some(ch);
                        out.push(ch);
                    }
                    '?' => {
                        count += 1;
                        out.push('?');
                        out.push_str(&count.to_string());
                    }
                    _ => out.push(ch),
                }
            }
        }
    }

    (out, count)
}

/// Counts bare `?` markers outside quotes.
pub fn count_markers(sql: &str) -> usize {
    number_placeholders(sql).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_markers_in_order() {
        let (sql, n) = number_placeholders("a = ? AND (b LIKE ? OR c LIKE ?) LIMIT ? OFFSET ?");
        assert_eq!(sql, "a = ?1 AND (b LIKE ?2 OR c LIKE ?3) LIMIT ?4 OFFSET ?5");
        assert_eq!(n, 5);
    }

    #[test]
    fn test_skips_quoted_text() {
        let (sql, n) = number_placeholders("CASE ? WHEN 'why?' THEN \"col?\" END = ?");
        assert_eq!(sql, "CASE ?1 WHEN 'why?' THEN \"col?\" END = ?2");
        assert_eq!(n, 2);
    }

    #[test]
    fn test_escaped_quote_stays_inside_literal() {
        let (sql, n) = number_placeholders("x = 'it''s ?' AND y = ?");
        assert_eq!(sql, "x = 'it''s ?' AND y = ?1");
        assert_eq!(n, 1);
    }

    #[test]
    fn test_no_markers() {
        assert_eq!(count_markers("SELECT 1 WHERE 1 = 1"), 0);
    }
}
