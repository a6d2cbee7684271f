//! Free-form URL input normalization

use regex::Regex;
use url::Url;

/// Turn free-form user input into a canonical absolute URL string.
///
/// Relayed fetches are constrained to plain HTTP, so an explicit `https://`
/// scheme is downgraded rather than preserved. Inputs with no scheme get
/// `http://` prepended; bare-domain inputs (`example.com/path`) take the
/// prefix from the original input so partial transformations can never
/// double-prefix. Returns `None` when the assembled string does not parse as
/// an absolute URL.
pub fn normalize(input: &str) -> Option<String> {
    let trimmed = input.trim();
    let mut candidate = trimmed.to_string();

    if starts_with_ignore_case(&candidate, "https://") {
        candidate = format!("http://{}", &candidate["https://".len()..]);
    }

    if !starts_with_ignore_case(&candidate, "http://") {
        candidate = format!("http://{}", candidate);
    } else if is_bare_domain(trimmed) {
        candidate = format!("http://{}", trimmed);
    }

    Url::parse(&candidate).ok().map(String::from)
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Matches `label.label...tld[/path]` with no explicit scheme.
fn is_bare_domain(input: &str) -> bool {
    let pattern = Regex::new(r"(?i)^([a-z0-9-]+\.)+[a-z]{2,}(/.*)?$").unwrap();
    pattern.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_domain_gets_http_prefix() {
        assert_eq!(
            normalize("example.com"),
            Some("http://example.com/".to_string())
        );
    }

    #[test]
    fn test_http_url_is_canonicalized() {
        assert_eq!(
            normalize("http://example.com"),
            Some("http://example.com/".to_string())
        );
    }

    #[test]
    fn test_https_is_downgraded() {
        assert_eq!(
            normalize("https://example.com"),
            Some("http://example.com/".to_string())
        );
        assert_eq!(
            normalize("HTTPS://example.com/a"),
            Some("http://example.com/a".to_string())
        );
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(
            normalize("  www.example.com/page  "),
            Some("http://www.example.com/page".to_string())
        );
    }

    #[test]
    fn test_path_and_query_survive() {
        assert_eq!(
            normalize("example.com/a/b?q=1"),
            Some("http://example.com/a/b?q=1".to_string())
        );
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert_eq!(normalize("not a url"), None);
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("http://"), None);
    }

    #[test]
    fn test_default_port_is_elided() {
        assert_eq!(
            normalize("http://example.com:80/x"),
            Some("http://example.com/x".to_string())
        );
    }
}
