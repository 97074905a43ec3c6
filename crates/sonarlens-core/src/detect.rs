//! Infers server base URL and project key from a pasted dashboard URL.
//!
//! An ordered list of independent probes; the first hit wins. Only
//! URL-shaped heuristics live here; anything that needs page content is
//! out of scope.

use reqwest::Url;

/// Probes, most specific first. Each one is independent of the others.
const PROBES: &[fn(&str) -> Option<String>] = &[
    probe_overview_path,
    probe_measures_path,
    probe_id_param,
];

#[must_use]
pub fn project_key_from_url(url: &str) -> Option<String> {
    PROBES.iter().find_map(|probe| probe(url))
}

/// Scheme and host (with port, when present) of the server the URL points at.
#[must_use]
pub fn base_url_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let base = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };
    Some(base)
}

/// `/project/overview?id=<key>`, the project landing page.
fn probe_overview_path(url: &str) -> Option<String> {
    url.contains("/project/overview?").then(|| id_param(url))?
}

/// `component_measures?id=<key>`, the measures drill-down page.
fn probe_measures_path(url: &str) -> Option<String> {
    url.contains("component_measures?").then(|| id_param(url))?
}

/// Any `?id=` / `&id=` query parameter, the dashboard pattern.
fn probe_id_param(url: &str) -> Option<String> {
    id_param(url)
}

fn id_param(url: &str) -> Option<String> {
    let start = url
        .find("?id=")
        .or_else(|| url.find("&id="))
        .map(|idx| idx + 4)?;
    let rest = &url[start..];
    let end = rest.find(['&', '#']).unwrap_or(rest.len());
    let raw = &rest[..end];
    if raw.is_empty() {
        return None;
    }
    Some(percent_decode(raw))
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%'
            && idx + 2 < bytes.len()
            && bytes[idx + 1].is_ascii_hexdigit()
            && bytes[idx + 2].is_ascii_hexdigit()
        {
            if let Ok(byte) = u8::from_str_radix(&raw[idx + 1..idx + 3], 16) {
                out.push(byte);
                idx += 3;
                continue;
            }
        }
        out.push(bytes[idx]);
        idx += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_id_parameter_is_detected() {
        assert_eq!(
            project_key_from_url("https://sonar.example.com/dashboard?id=com.acme%3Aservice"),
            Some("com.acme:service".to_string())
        );
    }

    #[test]
    fn overview_and_measures_pages_are_detected() {
        assert_eq!(
            project_key_from_url("https://sonar.example.com/project/overview?id=demo"),
            Some("demo".to_string())
        );
        assert_eq!(
            project_key_from_url(
                "https://sonar.example.com/component_measures?id=demo&metric=coverage"
            ),
            Some("demo".to_string())
        );
    }

    #[test]
    fn urls_without_an_id_parameter_yield_none() {
        assert_eq!(project_key_from_url("https://sonar.example.com/projects"), None);
        assert_eq!(project_key_from_url("https://sonar.example.com/dashboard?id="), None);
    }

    #[test]
    fn base_url_keeps_scheme_host_and_port() {
        assert_eq!(
            base_url_from_url("https://sonar.example.com:9000/dashboard?id=demo"),
            Some("https://sonar.example.com:9000".to_string())
        );
        assert_eq!(
            base_url_from_url("https://sonar.example.com/dashboard?id=demo"),
            Some("https://sonar.example.com".to_string())
        );
        assert_eq!(base_url_from_url("not a url"), None);
    }

    #[test]
    fn percent_decode_handles_invalid_escapes() {
        assert_eq!(percent_decode("a%3Ab"), "a:b");
        assert_eq!(percent_decode("a%ZZb"), "a%ZZb");
        assert_eq!(percent_decode("trailing%2"), "trailing%2");
    }
}
