//! `Set-Cookie` domain rewriting.

use axum::http::{header, HeaderMap, HeaderValue};

/// Point the `Domain` attribute of one `Set-Cookie` value at `new_domain`.
///
/// The first segment named `domain` (any case, any position) is replaced in
/// place; every other byte of the value is kept as it was. Without such a
/// segment a `Domain` attribute is appended.
pub fn rewrite_cookie_domain(raw: &str, new_domain: &str) -> String {
    let domain = format!("Domain={}", new_domain);

    let mut offset = 0;
    for segment in raw.split(';') {
        if is_domain_attribute(segment) {
            // Leading whitespace belongs to the separator.
            let start = offset + (segment.len() - segment.trim_start().len());
            let end = offset + segment.len();
            return format!("{}{}{}", &raw[..start], domain, &raw[end..]);
        }
        offset += segment.len() + 1;
    }

    let kept = raw.trim_end();
    if kept.is_empty() {
        domain
    } else if kept.ends_with(';') {
        format!("{} {}", kept, domain)
    } else {
        format!("{}; {}", kept, domain)
    }
}

fn is_domain_attribute(segment: &str) -> bool {
    let name = segment.split_once('=').map_or(segment, |(name, _)| name);
    name.trim().eq_ignore_ascii_case("domain")
}

/// Rewrite every `Set-Cookie` header in place, preserving their order.
///
/// Values that are not valid UTF-8 are passed through untouched.
pub fn rewrite_set_cookies(headers: &mut HeaderMap, new_domain: &str) {
    let original: Vec<HeaderValue> = match headers.entry(header::SET_COOKIE) {
        header::Entry::Occupied(entry) => entry.remove_entry_mult().1.collect(),
        header::Entry::Vacant(_) => return,
    };

    for value in original {
        let rewritten = value
            .to_str()
            .ok()
            .map(|raw| rewrite_cookie_domain(raw, new_domain))
            .and_then(|raw| HeaderValue::from_str(&raw).ok());

        match rewritten {
            Some(rewritten) => headers.append(header::SET_COOKIE, rewritten),
            None => {
                tracing::warn!(domain = %new_domain, "Set-Cookie value left unchanged");
                headers.append(header::SET_COOKIE, value)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_existing_domain() {
        assert_eq!(
            rewrite_cookie_domain("session=abc; Domain=example.org; Path=/", "proxy.test"),
            "session=abc; Domain=proxy.test; Path=/"
        );
    }

    #[test]
    fn test_domain_name_case_insensitive() {
        assert_eq!(
            rewrite_cookie_domain("a=1; Secure;  dOmAiN = .example.org ;HttpOnly", "proxy.test"),
            "a=1; Secure;  Domain=proxy.test;HttpOnly"
        );
    }

    #[test]
    fn test_append_when_domain_absent() {
        assert_eq!(
            rewrite_cookie_domain("session=abc; Path=/", "proxy.test"),
            "session=abc; Path=/; Domain=proxy.test"
        );
        assert_eq!(rewrite_cookie_domain("session=abc", "proxy.test"), "session=abc; Domain=proxy.test");
        assert_eq!(rewrite_cookie_domain("session=abc;", "proxy.test"), "session=abc; Domain=proxy.test");
        assert_eq!(rewrite_cookie_domain("", "proxy.test"), "Domain=proxy.test");
    }

    #[test]
    fn test_domain_in_first_segment_replaced() {
        assert_eq!(
            rewrite_cookie_domain("Domain=x.test; Path=/", "proxy.test"),
            "Domain=proxy.test; Path=/"
        );
    }

    #[test]
    fn test_only_first_domain_replaced() {
        assert_eq!(
            rewrite_cookie_domain("a=1; Domain=one.test; Path=/; Domain=two.test", "proxy.test"),
            "a=1; Domain=proxy.test; Path=/; Domain=two.test"
        );
    }

    #[test]
    fn test_other_segments_untouched() {
        assert_eq!(
            rewrite_cookie_domain("a=1;;  ; Domain=example.org;Secure ; ", "proxy.test"),
            "a=1;;  ; Domain=proxy.test;Secure ; "
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let inputs = [
            "a=1; Domain=example.org; Path=/",
            "a=1; Path=/; Max-Age=0",
            "a=1;;  ; Secure",
            "Domain=x.test",
        ];
        for input in inputs {
            let once = rewrite_cookie_domain(input, "proxy.test");
            assert_eq!(rewrite_cookie_domain(&once, "proxy.test"), once);
        }
    }

    #[test]
    fn test_rewrite_all_set_cookie_headers_in_order() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1; Domain=example.org"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2; Path=/"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        rewrite_set_cookies(&mut headers, "proxy.test");

        let cookies: Vec<_> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cookies, vec!["a=1; Domain=proxy.test", "b=2; Path=/; Domain=proxy.test"]);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn test_no_set_cookie_is_noop() {
        let mut headers = HeaderMap::new();
        rewrite_set_cookies(&mut headers, "proxy.test");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_non_utf8_value_passed_through() {
        let mut headers = HeaderMap::new();
        let raw = HeaderValue::from_bytes(b"a=\xff; Path=/").unwrap();
        headers.append(header::SET_COOKIE, raw.clone());

        rewrite_set_cookies(&mut headers, "proxy.test");
        assert_eq!(headers.get(header::SET_COOKIE), Some(&raw));
    }
}
