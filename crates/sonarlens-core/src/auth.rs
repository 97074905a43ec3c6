/// Cookie that doubles as the anti-CSRF token; its value is echoed in the
/// `X-XSRF-Token` request header.
pub(crate) const XSRF_COOKIE: &str = "XSRF-TOKEN";

#[must_use]
pub(crate) fn xsrf_token_from_cookies(cookies: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, _)| *name == XSRF_COOKIE)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_extracted_from_a_cookie_jar_string() {
        let cookies = "JWT-SESSION=eyJhb; XSRF-TOKEN=u72kq1; theme=dark";
        assert_eq!(xsrf_token_from_cookies(cookies).as_deref(), Some("u72kq1"));
    }

    #[test]
    fn missing_token_cookie_yields_none() {
        assert_eq!(xsrf_token_from_cookies("JWT-SESSION=eyJhb"), None);
        assert_eq!(xsrf_token_from_cookies(""), None);
    }

    #[test]
    fn value_keeps_embedded_equals_signs() {
        let cookies = "XSRF-TOKEN=a=b=c";
        assert_eq!(xsrf_token_from_cookies(cookies).as_deref(), Some("a=b=c"));
    }
}
