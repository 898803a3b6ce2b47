use serde::Serialize;
use url::Url;

/// Canonical identifier for an employer, derived from its profile URL
///
/// The key is the lowercase slug of the `/company/<slug>` path segment and
/// is the exclusive join key between jobs and company data. Jobs whose
/// company URL cannot yield a key skip the join entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompanyKey(String);

impl CompanyKey {
    /// Derives a company key from a company profile URL
    ///
    /// Returns None when the URL is malformed or has no `/company/<slug>`
    /// path, in which case the job is pushed with company fields null.
    pub fn from_profile_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let mut segments = parsed.path_segments()?;

        while let Some(segment) = segments.next() {
            if segment == "company" {
                let slug = segments.next()?;
                if slug.is_empty() {
                    return None;
                }
                return Some(CompanyKey(slug.to_lowercase()));
            }
        }

        None
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompanyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields extracted from an employer's company page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyFields {
    pub description: Option<String>,
    pub website: Option<String>,
    pub employee_count: Option<u32>,
    pub industry: Option<String>,
    pub founded: Option<u32>,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_profile_url() {
        let key = CompanyKey::from_profile_url("https://boards.example.com/company/acme-corp");
        assert_eq!(key.unwrap().as_str(), "acme-corp");
    }

    #[test]
    fn test_key_is_lowercased() {
        let key = CompanyKey::from_profile_url("https://boards.example.com/company/Acme-Corp");
        assert_eq!(key.unwrap().as_str(), "acme-corp");
    }

    #[test]
    fn test_key_ignores_query_and_trailing_segments() {
        let key = CompanyKey::from_profile_url(
            "https://boards.example.com/company/acme-corp/jobs?ref=card",
        );
        assert_eq!(key.unwrap().as_str(), "acme-corp");
    }

    #[test]
    fn test_key_with_prefixed_path() {
        let key = CompanyKey::from_profile_url("https://boards.example.com/en/company/acme");
        assert_eq!(key.unwrap().as_str(), "acme");
    }

    #[test]
    fn test_no_company_segment() {
        assert!(CompanyKey::from_profile_url("https://boards.example.com/jobs/view/123").is_none());
    }

    #[test]
    fn test_company_segment_without_slug() {
        assert!(CompanyKey::from_profile_url("https://boards.example.com/company").is_none());
        assert!(CompanyKey::from_profile_url("https://boards.example.com/company/").is_none());
    }

    #[test]
    fn test_malformed_url() {
        assert!(CompanyKey::from_profile_url("not a url").is_none());
    }

    #[test]
    fn test_same_slug_same_key() {
        let a = CompanyKey::from_profile_url("https://boards.example.com/company/acme").unwrap();
        let b = CompanyKey::from_profile_url("https://boards.example.com/company/ACME?x=1").unwrap();
        assert_eq!(a, b);
    }
}
