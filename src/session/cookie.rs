use tower_cookies::Cookie;
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;

/// Cheap pre-check: does the header mention `name=` anywhere?
pub fn mentions_cookie(header: &str, name: &str) -> bool {
    header.contains(&format!("{name}="))
}

/// Finds the raw value of the first cookie named exactly `name`.
///
/// Everything after the first `=` of the pair is the value, so values
/// that contain `=` come back intact.
pub fn find_cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| match pair.split_once('=') {
            Some((key, value)) if key == name => Some(value),
            _ => None,
        })
}

/// Builds the `Set-Cookie` value for a session cookie.
///
/// # Arguments
///
/// * `name` - The cookie name.
/// * `value` - The already URL-encoded cookie value.
/// * `max_age_seconds` - Lifetime in seconds; zero tells the client to delete it.
pub fn session_cookie_header(name: &str, value: &str, max_age_seconds: u64) -> String {
    let max_age = i64::try_from(max_age_seconds).unwrap_or(i64::MAX);

    let mut cookie = Cookie::new(name.to_string(), value.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(true);
    cookie.set_max_age(Duration::seconds(max_age));

    cookie.to_string()
}

/// Builds the `Set-Cookie` value that deletes `name` immediately.
pub fn clear_cookie_header(name: &str) -> String {
    session_cookie_header(name, "", 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_value_among_other_cookies() {
        let header = "theme=dark; did_session=abc; lang=en";
        assert_eq!(find_cookie_value(header, "did_session"), Some("abc"));

        let header = "did_session=first;theme=dark";
        assert_eq!(find_cookie_value(header, "did_session"), Some("first"));

        let header = "theme=dark;   did_session=last  ";
        assert_eq!(find_cookie_value(header, "did_session"), Some("last"));
    }

    #[test]
    fn keeps_equals_signs_in_value() {
        let header = "a=1; did_session=ds1.abc==.def=; b=2";
        assert_eq!(find_cookie_value(header, "did_session"), Some("ds1.abc==.def="));
    }

    #[test]
    fn first_matching_pair_wins() {
        let header = "did_session=one; did_session=two";
        assert_eq!(find_cookie_value(header, "did_session"), Some("one"));
    }

    #[test]
    fn name_match_is_exact() {
        let header = "xdid_session=abc; did_session_old=def";
        assert!(mentions_cookie(header, "did_session"));
        assert_eq!(find_cookie_value(header, "did_session"), None);
    }

    #[test]
    fn pairs_without_equals_are_skipped() {
        let header = "flag; did_session=abc";
        assert_eq!(find_cookie_value(header, "did_session"), Some("abc"));
    }

    #[test]
    fn precheck_ignores_unrelated_cookies() {
        assert!(!mentions_cookie("theme=dark; lang=en", "did_session"));
        assert!(!mentions_cookie("", "did_session"));
    }

    #[test]
    fn session_header_carries_required_attributes() {
        let header = session_cookie_header("did_session", "ds1.abc.def", 604800);

        assert!(header.starts_with("did_session=ds1.abc.def;"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Secure"));
        assert!(header.contains("Max-Age=604800"));
    }

    #[test]
    fn clear_header_expires_immediately() {
        let header = clear_cookie_header("did_session");

        assert!(header.starts_with("did_session=;"));
        assert!(header.contains("Max-Age=0"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Path=/"));
    }
}
