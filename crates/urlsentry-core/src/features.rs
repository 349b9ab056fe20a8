//! Lexical URL features
//!
//! Each function maps a raw URL string to one non-negative integer. Counts are
//! literal, case-sensitive and non-overlapping; flags are 0 or 1. None of them
//! can fail: malformed input just produces degenerate values.
//!
//! [`extract`] assembles all of them into a [`FeatureVector`] in the column
//! order the classifier was trained on.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::urlparts::UrlParts;

/// Number of columns in a feature row
pub const FEATURE_COUNT: usize = 21;

/// Column names, in classifier order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "use_of_ip",
    "abnormal_url",
    "count_dot",
    "count_www",
    "count_atrate",
    "count_dir",
    "count_embed_domain",
    "short_url",
    "count_https",
    "count_http",
    "count_percent",
    "count_ques",
    "count_hyphen",
    "count_equal",
    "url_length",
    "hostname_length",
    "sus_url",
    "count_digits",
    "count_letters",
    "fd_length",
    "tld_length",
];

lazy_static! {
    static ref IP_ADDRESS: Regex = Regex::new(concat!(
        r"(([01]?\d\d?|2[0-4]\d|25[0-5])\.([01]?\d\d?|2[0-4]\d|25[0-5])\.",
        r"([01]?\d\d?|2[0-4]\d|25[0-5])\.([01]?\d\d?|2[0-4]\d|25[0-5])/)|",
        r"((0x[0-9a-fA-F]{1,2})\.(0x[0-9a-fA-F]{1,2})\.(0x[0-9a-fA-F]{1,2})\.(0x[0-9a-fA-F]{1,2})/)",
    ))
    .unwrap();
    static ref SHORTENING_SERVICE: Regex = Regex::new(
        r"bit\.ly|goo\.gl|shorte\.st|x\.co|ow\.ly|t\.co|tinyurl|tr\.im|is\.gd|cli\.gs"
    )
    .unwrap();
    static ref SUSPICIOUS_WORDS: Regex =
        Regex::new(r"PayPal|login|signin|bank|account|update|free|bonus|ebayisapi|webscr").unwrap();
    static ref DECIMAL_DIGIT: Regex = Regex::new(r"\p{Nd}").unwrap();
    static ref LETTER: Regex = Regex::new(r"\p{L}").unwrap();
}

/// Code points with Unicode Numeric_Type=Digit: digits that are not decimal
/// (superscripts, subscripts, circled and parenthesized digits, ...)
const NON_DECIMAL_DIGITS: &[(char, char)] = &[
    ('\u{00B2}', '\u{00B3}'),
    ('\u{00B9}', '\u{00B9}'),
    ('\u{1369}', '\u{1371}'),
    ('\u{19DA}', '\u{19DA}'),
    ('\u{2070}', '\u{2070}'),
    ('\u{2074}', '\u{2079}'),
    ('\u{2080}', '\u{2089}'),
    ('\u{2460}', '\u{2468}'),
    ('\u{2474}', '\u{247C}'),
    ('\u{2488}', '\u{2490}'),
    ('\u{24EA}', '\u{24EA}'),
    ('\u{24F5}', '\u{24FD}'),
    ('\u{24FF}', '\u{24FF}'),
    ('\u{2776}', '\u{277E}'),
    ('\u{2780}', '\u{2788}'),
    ('\u{278A}', '\u{2792}'),
    ('\u{10A40}', '\u{10A43}'),
    ('\u{10E60}', '\u{10E68}'),
    ('\u{11052}', '\u{1105A}'),
    ('\u{1F100}', '\u{1F10A}'),
];

fn is_non_decimal_digit(c: char) -> bool {
    NON_DECIMAL_DIGITS
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

fn flag(hit: bool) -> u32 {
    u32::from(hit)
}

fn count(url: &str, needle: &str) -> u32 {
    url.matches(needle).count() as u32
}

/// 1 if the URL contains a dotted-decimal or dotted-hex IPv4 literal followed by `/`
pub fn having_ip_address(url: &str) -> u32 {
    flag(IP_ADDRESS.is_match(url))
}

/// 1 if the parsed hostname appears verbatim in the URL
///
/// The hostname is lower-cased by parsing, so a URL written with an
/// upper-case host scores 1 only through another occurrence. Without a
/// hostname the check matches the empty string and scores 1. The hostname
/// is matched as literal text, so regex metacharacters in a host
/// (`a+b.com`) have no special meaning.
pub fn abnormal_url(url: &str) -> u32 {
    hostname_in_url(url, &UrlParts::parse(url))
}

fn hostname_in_url(url: &str, parts: &UrlParts) -> u32 {
    match parts.hostname() {
        Some(hostname) => flag(url.contains(hostname.as_str())),
        None => 1,
    }
}

pub fn count_dot(url: &str) -> u32 {
    count(url, ".")
}

pub fn count_www(url: &str) -> u32 {
    count(url, "www")
}

pub fn count_atrate(url: &str) -> u32 {
    count(url, "@")
}

/// Number of `/` in the path component
pub fn no_of_dir(url: &str) -> u32 {
    count(&UrlParts::parse(url).path, "/")
}

/// Number of `//` in the path component
pub fn no_of_embed(url: &str) -> u32 {
    count(&UrlParts::parse(url).path, "//")
}

/// 1 if the URL mentions a known link-shortening service
pub fn shortening_service(url: &str) -> u32 {
    flag(SHORTENING_SERVICE.is_match(url))
}

pub fn count_https(url: &str) -> u32 {
    count(url, "https")
}

pub fn count_http(url: &str) -> u32 {
    count(url, "http")
}

pub fn count_per(url: &str) -> u32 {
    count(url, "%")
}

pub fn count_ques(url: &str) -> u32 {
    count(url, "?")
}

pub fn count_hyphen(url: &str) -> u32 {
    count(url, "-")
}

pub fn count_equal(url: &str) -> u32 {
    count(url, "=")
}

/// Length in characters
pub fn url_length(url: &str) -> u32 {
    url.chars().count() as u32
}

/// Length of the network location, userinfo and port included
pub fn hostname_length(url: &str) -> u32 {
    UrlParts::parse(url).netloc.chars().count() as u32
}

/// 1 if the URL contains a phishing keyword (case-sensitive)
pub fn suspicious_words(url: &str) -> u32 {
    flag(SUSPICIOUS_WORDS.is_match(url))
}

/// Characters with Numeric_Type Decimal or Digit
///
/// Fractions (`½`) and letter-like numerals (`Ⅻ`) are not digits.
pub fn digit_count(url: &str) -> u32 {
    let decimal = DECIMAL_DIGIT.find_iter(url).count();
    let other = url.chars().filter(|&c| is_non_decimal_digit(c)).count();
    (decimal + other) as u32
}

/// Characters in general category L (Lu, Ll, Lt, Lm, Lo)
pub fn letter_count(url: &str) -> u32 {
    LETTER.find_iter(url).count() as u32
}

/// Length of the first path segment, 0 when the path has none
pub fn fd_length(url: &str) -> u32 {
    first_segment_length(&UrlParts::parse(url).path)
}

fn first_segment_length(path: &str) -> u32 {
    path.split('/')
        .nth(1)
        .map_or(0, |segment| segment.chars().count() as u32)
}

/// Same value as [`url_length`]; the classifier expects this column twice
pub fn tld_length(url: &str) -> u32 {
    url_length(url)
}

/// The 21 features of one URL, named
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatureVector {
    pub use_of_ip: u32,
    pub abnormal_url: u32,
    pub count_dot: u32,
    pub count_www: u32,
    pub count_atrate: u32,
    pub count_dir: u32,
    pub count_embed_domain: u32,
    pub short_url: u32,
    pub count_https: u32,
    pub count_http: u32,
    pub count_percent: u32,
    pub count_ques: u32,
    pub count_hyphen: u32,
    pub count_equal: u32,
    pub url_length: u32,
    pub hostname_length: u32,
    pub sus_url: u32,
    pub count_digits: u32,
    pub count_letters: u32,
    pub fd_length: u32,
    pub tld_length: u32,
}

impl FeatureVector {
    /// Values in classifier column order
    pub fn values(&self) -> [u32; FEATURE_COUNT] {
        [
            self.use_of_ip,
            self.abnormal_url,
            self.count_dot,
            self.count_www,
            self.count_atrate,
            self.count_dir,
            self.count_embed_domain,
            self.short_url,
            self.count_https,
            self.count_http,
            self.count_percent,
            self.count_ques,
            self.count_hyphen,
            self.count_equal,
            self.url_length,
            self.hostname_length,
            self.sus_url,
            self.count_digits,
            self.count_letters,
            self.fd_length,
            self.tld_length,
        ]
    }

    /// Single input row for the classifier
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        self.values().map(f64::from)
    }
}

/// Extract every feature of `url`
pub fn extract(url: &str) -> FeatureVector {
    // Parse once for the path and host based columns
    let parts = UrlParts::parse(url);

    FeatureVector {
        use_of_ip: having_ip_address(url),
        abnormal_url: hostname_in_url(url, &parts),
        count_dot: count_dot(url),
        count_www: count_www(url),
        count_atrate: count_atrate(url),
        count_dir: count(&parts.path, "/"),
        count_embed_domain: count(&parts.path, "//"),
        short_url: shortening_service(url),
        count_https: count_https(url),
        count_http: count_http(url),
        count_percent: count_per(url),
        count_ques: count_ques(url),
        count_hyphen: count_hyphen(url),
        count_equal: count_equal(url),
        url_length: url_length(url),
        hostname_length: parts.netloc.chars().count() as u32,
        sus_url: suspicious_words(url),
        count_digits: digit_count(url),
        count_letters: letter_count(url),
        fd_length: first_segment_length(&parts.path),
        tld_length: tld_length(url),
    }
}
