//! Log sanitization utilities
//!
//! Panel APIs carry account passwords in query strings (WHM) and form bodies
//! (DirectAdmin, Virtualmin), and session ids in URLs (ISPConfig). Nothing
//! below `debug` may print them verbatim.

/// Maximum number of bytes of a response body included in log output.
const TRUNCATE_LIMIT: usize = 256;

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Replace every query parameter value with `***`, keeping the keys.
///
/// `https://h:2087/json-api/passwd?user=bob&password=x` becomes
/// `https://h:2087/json-api/passwd?user=***&password=***`. A bare query such
/// as ISPConfig's `json.php?login` is left alone.
pub fn redact_query(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let redacted: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) => format!("{key}=***"),
            None => pair.to_string(),
        })
        .collect();
    format!("{base}?{}", redacted.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_string_unchanged() {
        let s = "hello world";
        assert_eq!(truncate_for_log(s), s);
    }

    #[test]
    fn over_limit_truncated() {
        let s = "a".repeat(TRUNCATE_LIMIT + 100);
        let result = truncate_for_log(&s);
        assert!(result.contains(&format!("total {} bytes]", TRUNCATE_LIMIT + 100)));
        assert!(result.len() < s.len());
    }

    #[test]
    fn multibyte_chars_safe() {
        let s = "é".repeat(200);
        assert!(truncate_for_log(&s).contains("... [truncated"));
    }

    #[test]
    fn redacts_query_values() {
        assert_eq!(
            redact_query("https://h:2087/json-api/passwd?api.version=1&user=bob&password=s3cret"),
            "https://h:2087/json-api/passwd?api.version=***&user=***&password=***"
        );
    }

    #[test]
    fn keeps_bare_method_query() {
        assert_eq!(
            redact_query("https://h:8080/remote/json.php?login"),
            "https://h:8080/remote/json.php?login"
        );
        assert_eq!(redact_query("https://h/api/v1/sites"), "https://h/api/v1/sites");
    }
}
