//! Generic-syntax URL splitting
//!
//! Splits a URL into `scheme://netloc/path;params?query#fragment` without any
//! normalisation. Hosts are not IDNA-mapped, paths are not percent-encoded and
//! dot segments are kept, so the path and network location seen here are the
//! exact substrings of the input the classifier's features were trained on.
//!
//! Splitting never fails. Input that is not a URL at all simply ends up in
//! `path` with an empty `netloc`.

/// Characters allowed in a scheme after the leading letter
fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}

/// Schemes whose last path segment may carry `;params`
const SCHEMES_WITH_PARAMS: &[&str] = &[
    "", "ftp", "hdl", "prospero", "http", "imap", "https", "shttp", "rtsp", "rtsps", "rtspu",
    "sip", "sips", "mms", "sftp", "tel",
];

/// The six components of a split URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    pub netloc: String,
    pub path: String,
    pub params: String,
    pub query: String,
    pub fragment: String,
}

impl UrlParts {
    /// Split a URL into its components
    pub fn parse(url: &str) -> Self {
        // Leading C0 controls and spaces are ignored, embedded tabs and
        // newlines are dropped.
        let cleaned: String = url
            .trim_start_matches(|c: char| c <= ' ')
            .chars()
            .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
            .collect();

        let mut rest = cleaned.as_str();
        let mut scheme = String::new();

        if let Some(colon) = rest.find(':') {
            let candidate = &rest[..colon];
            let starts_with_letter = candidate
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic());
            if starts_with_letter && candidate.chars().all(is_scheme_char) {
                scheme = candidate.to_ascii_lowercase();
                rest = &rest[colon + 1..];
            }
        }

        let mut netloc = "";
        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find(['/', '?', '#']).unwrap_or(after.len());
            netloc = &after[..end];
            rest = &after[end..];
        }

        let mut fragment = "";
        if let Some((before, after)) = rest.split_once('#') {
            rest = before;
            fragment = after;
        }

        let mut query = "";
        if let Some((before, after)) = rest.split_once('?') {
            rest = before;
            query = after;
        }

        let (path, params) = if SCHEMES_WITH_PARAMS.contains(&scheme.as_str()) && rest.contains(';')
        {
            split_params(rest)
        } else {
            (rest, "")
        };

        Self {
            scheme,
            netloc: netloc.to_string(),
            path: path.to_string(),
            params: params.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
        }
    }

    /// Host portion of the network location, lower-cased
    ///
    /// Userinfo and port are removed and `[...]` brackets around IPv6
    /// literals are stripped. An IPv6 zone suffix (`%eth0`) keeps its case.
    /// Returns `None` when there is no host.
    pub fn hostname(&self) -> Option<String> {
        let hostinfo = match self.netloc.rfind('@') {
            Some(at) => &self.netloc[at + 1..],
            None => self.netloc.as_str(),
        };

        let host = match hostinfo.split_once('[') {
            Some((_, bracketed)) => bracketed.split(']').next().unwrap_or(""),
            None => hostinfo.split(':').next().unwrap_or(""),
        };

        if host.is_empty() {
            return None;
        }

        Some(match host.split_once('%') {
            Some((name, zone)) => format!("{}%{}", name.to_lowercase(), zone),
            None => host.to_lowercase(),
        })
    }
}

/// Split `;params` off the last path segment
fn split_params(path: &str) -> (&str, &str) {
    let split_at = match path.rfind('/') {
        Some(slash) => path[slash..].find(';').map(|offset| slash + offset),
        None => path.find(';'),
    };

    match split_at {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => (path, ""),
    }
}
