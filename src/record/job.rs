use crate::record::CompanyFields;
use serde::Serialize;
use url::Url;

/// Opaque job identifier extracted from a job URL
///
/// Identifies a posting uniquely within a run; the global dedup set is
/// keyed on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Extracts a job id from a job posting URL
    ///
    /// The id is the trailing digit run of the last path segment
    /// (`/jobs/view/senior-engineer-3412345678` -> `3412345678`), or the
    /// whole segment when it carries no digit suffix. Returns None for a
    /// URL with no usable segment; such cards are skipped.
    pub fn from_job_url(url: &Url) -> Option<Self> {
        let segment = url
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()?
            .to_string();

        let digits: String = segment
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        if !digits.is_empty() {
            Some(JobId(digits))
        } else {
            Some(JobId(segment))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Summary-wave fields from a search-result card
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub title: Option<String>,
    pub company_name: Option<String>,
    /// Company profile URL, the source of the join key
    pub company_url: Option<String>,
    pub location: Option<String>,
    pub posted_at: Option<String>,
    pub salary_info: Vec<String>,
    pub benefits: Vec<String>,
    /// The job posting URL this card links to
    pub job_url: Url,
}

/// Detail-wave fields from a job detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDetailFields {
    pub description: Option<String>,
    pub seniority_level: Option<String>,
    pub employment_type: Option<String>,
    pub job_function: Option<String>,
    pub industries: Option<String>,
    pub applicant_count: Option<u32>,
    pub apply_url: Option<String>,
    pub poster_name: Option<String>,
    pub poster_title: Option<String>,
}

/// Mutable accumulator for one job posting
///
/// A record is pushed to the sink exactly once, and only after every wave
/// that was requested for it has either resolved or permanently failed.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: JobId,
    pub summary: JobSummary,
    pub detail: Option<JobDetailFields>,
    pub company: Option<CompanyFields>,
}

impl JobRecord {
    pub fn new(id: JobId, summary: JobSummary) -> Self {
        Self {
            id,
            summary,
            detail: None,
            company: None,
        }
    }

    /// Merges detail-wave fields onto the record
    pub fn merge_detail(&mut self, detail: JobDetailFields) {
        self.detail = Some(detail);
    }

    /// Merges resolved company fields onto the record (possibly empty)
    pub fn merge_company(&mut self, company: Option<CompanyFields>) {
        self.company = company;
    }

    /// Flattens the accumulated waves into the output shape
    pub fn into_output(self) -> OutputRecord {
        let detail = self.detail.unwrap_or_default();
        let company = self.company.unwrap_or_default();

        OutputRecord {
            id: self.id.0,
            job_url: self.summary.job_url.to_string(),
            title: self.summary.title,
            company_name: self.summary.company_name,
            company_url: self.summary.company_url,
            location: self.summary.location,
            posted_at: self.summary.posted_at,
            salary_info: self.summary.salary_info,
            benefits: self.summary.benefits,
            description: detail.description,
            seniority_level: detail.seniority_level,
            employment_type: detail.employment_type,
            job_function: detail.job_function,
            industries: detail.industries,
            applicant_count: detail.applicant_count,
            apply_url: detail.apply_url,
            poster_name: detail.poster_name,
            poster_title: detail.poster_title,
            company_description: company.description,
            company_website: company.website,
            company_employee_count: company.employee_count,
            company_industry: company.industry,
            company_founded: company.founded,
            company_address: company.address,
        }
    }
}

/// One flat output record per job, all waves merged
///
/// Nullable fields serialize as explicit nulls, never omitted; the two
/// array fields default to empty rather than null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub id: String,
    pub job_url: String,
    pub title: Option<String>,
    pub company_name: Option<String>,
    pub company_url: Option<String>,
    pub location: Option<String>,
    pub posted_at: Option<String>,
    pub salary_info: Vec<String>,
    pub benefits: Vec<String>,
    pub description: Option<String>,
    pub seniority_level: Option<String>,
    pub employment_type: Option<String>,
    pub job_function: Option<String>,
    pub industries: Option<String>,
    pub applicant_count: Option<u32>,
    pub apply_url: Option<String>,
    pub poster_name: Option<String>,
    pub poster_title: Option<String>,
    pub company_description: Option<String>,
    pub company_website: Option<String>,
    pub company_employee_count: Option<u32>,
    pub company_industry: Option<String>,
    pub company_founded: Option<u32>,
    pub company_address: Option<String>,
}
