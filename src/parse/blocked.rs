/// Tunable login-wall classification policy
///
/// The exact threshold separating a genuine auth wall from a short
/// legitimate page is heuristic; these knobs are policy, not contract.
#[derive(Debug, Clone)]
pub struct BlockPolicy {
    /// Markup fragments that positively identify job/company content.
    /// Checked FIRST: their presence always wins over auth markers.
    pub content_markers: Vec<String>,

    /// Markup fragments that identify an auth wall
    pub auth_markers: Vec<String>,

    /// Pages shorter than this that mention signing in count as walls
    pub min_page_len: usize,

    /// Status codes the site uses for soft blocks
    pub blocked_statuses: Vec<u16>,
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self {
            content_markers: vec![
                "job-card".to_string(),
                "job-detail__description".to_string(),
                "company-about__description".to_string(),
            ],
            auth_markers: vec![
                "auth-wall".to_string(),
                "authwall".to_string(),
                "action=\"/login\"".to_string(),
                "id=\"sign-in-form\"".to_string(),
            ],
            min_page_len: 512,
            blocked_statuses: vec![403, 999],
        }
    }
}

impl BlockPolicy {
    /// Applies the policy to a response
    ///
    /// Positive content markers are checked before anything else so a
    /// public page that merely links to sign-in is never misclassified.
    pub fn classify(&self, markup: &str, status_code: u16) -> bool {
        if self
            .content_markers
            .iter()
            .any(|marker| markup.contains(marker.as_str()))
        {
            return false;
        }

        if self.blocked_statuses.contains(&status_code) {
            return true;
        }

        if self
            .auth_markers
            .iter()
            .any(|marker| markup.contains(marker.as_str()))
        {
            return true;
        }

        let lowered = markup.to_lowercase();
        markup.len() < self.min_page_len
            && (lowered.contains("sign in") || lowered.contains("log in"))
    }
}
