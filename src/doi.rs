use once_cell::sync::Lazy;
use regex::Regex;

static DOI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"10\.\d{4,}(?:\.\d+)*/\S+").unwrap());

/// Prefixes people paste in front of a DOI in bibliography files.
static DOI_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:doi:\s*|https?://(?:dx\.)?doi\.org/)").unwrap()
});

/// Clean a raw `doi` field: trim, drop resolver prefixes and trailing
/// punctuation. Returns `None` when what remains does not look like a DOI.
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let stripped = DOI_PREFIX_RE.replace(trimmed, "");
    let m = DOI_RE.find(&stripped)?;
    let doi = m.as_str().trim_end_matches(['.', ',', ';']);
    Some(doi.to_string())
}

/// DOIs compare case-insensitively; this is the form used as a graph key.
pub fn canonical(doi: &str) -> String {
    doi.trim().to_lowercase()
}

/// Percent-encode each path segment, keeping the `/` separators the
/// provider APIs expect.
pub fn encode_path(doi: &str) -> String {
    doi.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_doi_unchanged() {
        assert_eq!(normalize("10.1145/3133956.3134083").as_deref(), Some("10.1145/3133956.3134083"));
    }

    #[test]
    fn strips_resolver_url_and_prefix() {
        assert_eq!(
            normalize("https://doi.org/10.1000/xyz123").as_deref(),
            Some("10.1000/xyz123")
        );
        assert_eq!(normalize("DOI: 10.1000/xyz123.").as_deref(), Some("10.1000/xyz123"));
        assert_eq!(
            normalize("http://dx.doi.org/10.1000/ABC").as_deref(),
            Some("10.1000/ABC")
        );
    }

    #[test]
    fn rejects_non_doi() {
        assert_eq!(normalize("not a doi"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn canonical_lowercases() {
        assert_eq!(canonical(" 10.1000/ABC "), "10.1000/abc");
    }

    #[test]
    fn encode_path_keeps_slashes() {
        assert_eq!(encode_path("10.1000/a b/c"), "10.1000/a%20b/c");
        assert_eq!(encode_path("10.1002/(SICI)1097"), "10.1002/%28SICI%291097");
    }
}
