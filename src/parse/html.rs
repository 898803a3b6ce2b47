use crate::parse::{BlockPolicy, PageParser};
use crate::record::{CompanyFields, JobDetailFields, JobSummary};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Scraper-backed implementation of [`PageParser`]
pub struct HtmlParser {
    policy: BlockPolicy,
}

impl HtmlParser {
    pub fn new(policy: BlockPolicy) -> Self {
        Self { policy }
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new(BlockPolicy::default())
    }
}

impl PageParser for HtmlParser {
    fn parse_search_results(&self, markup: &str, base: &Url) -> Vec<JobSummary> {
        let document = Html::parse_document(markup);

        let card_selector = match Selector::parse("li.job-card") {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        document
            .select(&card_selector)
            .filter_map(|card| parse_card(&card, base))
            .collect()
    }

    fn parse_job_detail(&self, markup: &str, base: &Url) -> JobDetailFields {
        let document = Html::parse_document(markup);

        let mut detail = JobDetailFields {
            description: select_text(&document, ".job-detail__description"),
            applicant_count: select_text(&document, ".job-detail__applicants")
                .as_deref()
                .and_then(leading_number),
            apply_url: select_href(&document, "a.job-detail__apply", base),
            poster_name: select_text(&document, ".job-poster__name"),
            poster_title: select_text(&document, ".job-poster__title"),
            ..Default::default()
        };

        // Criteria rows are label/value pairs in site-defined order
        if let (Ok(item_sel), Ok(label_sel), Ok(value_sel)) = (
            Selector::parse("li.job-criteria__item"),
            Selector::parse(".job-criteria__label"),
            Selector::parse(".job-criteria__value"),
        ) {
            for item in document.select(&item_sel) {
                let label = item
                    .select(&label_sel)
                    .next()
                    .map(element_text)
                    .unwrap_or_default()
                    .to_lowercase();
                let value = item.select(&value_sel).next().map(element_text);

                if label.contains("seniority") {
                    detail.seniority_level = value;
                } else if label.contains("employment") {
                    detail.employment_type = value;
                } else if label.contains("function") {
                    detail.job_function = value;
                } else if label.contains("industr") {
                    detail.industries = value;
                }
            }
        }

        detail
    }

    fn parse_company_page(&self, markup: &str, base: &Url) -> CompanyFields {
        let document = Html::parse_document(markup);

        CompanyFields {
            description: select_text(&document, ".company-about__description"),
            website: select_href(&document, "a.company-info__website", base),
            employee_count: select_text(&document, ".company-info__employees")
                .as_deref()
                .and_then(leading_number),
            industry: select_text(&document, ".company-info__industry"),
            founded: select_text(&document, ".company-info__founded")
                .as_deref()
                .and_then(leading_number),
            address: select_text(&document, ".company-info__address"),
        }
    }

    fn is_blocked(&self, markup: &str, status_code: u16) -> bool {
        self.policy.classify(markup, status_code)
    }
}

/// Parses one job card; None when the card has no usable link
fn parse_card(card: &ElementRef, base: &Url) -> Option<JobSummary> {
    let link_selector = Selector::parse("a.job-card__link").ok()?;
    let href = card
        .select(&link_selector)
        .next()
        .and_then(|a| a.value().attr("href"))?;
    let job_url = base.join(href).ok()?;

    let company_link = Selector::parse(".job-card__company a").ok()?;
    let company_url = card
        .select(&company_link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| base.join(href).ok())
        .map(|u| u.to_string());

    Some(JobSummary {
        title: card_text(card, ".job-card__title"),
        company_name: card_text(card, ".job-card__company"),
        company_url,
        location: card_text(card, ".job-card__location"),
        posted_at: card_datetime(card),
        salary_info: card_texts(card, ".job-card__salary"),
        benefits: card_texts(card, ".job-card__benefit"),
        job_url,
    })
}

fn card_text(card: &ElementRef, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    card.select(&sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn card_texts(card: &ElementRef, selector: &str) -> Vec<String> {
    let sel = match Selector::parse(selector) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    card.select(&sel)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Prefers the machine-readable datetime attribute over display text
fn card_datetime(card: &ElementRef) -> Option<String> {
    let sel = Selector::parse("time").ok()?;
    let element = card.select(&sel).next()?;
    element
        .value()
        .attr("datetime")
        .map(str::to_string)
        .or_else(|| Some(element_text(element)))
        .filter(|s| !s.is_empty())
}

fn select_text(document: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

fn select_href(document: &Html, selector: &str, base: &Url) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| base.join(href).ok())
        .map(|u| u.to_string())
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Pulls the first digit run out of display text ("1,024 employees" -> 1024)
fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| c.is_ascii_digit())
        .collect();

    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://boards.example.com/").unwrap()
    }

    const SEARCH_PAGE: &str = r#"
        <html><body><ul class="jobs-list">
            <li class="job-card">
                <a class="job-card__link" href="/jobs/view/senior-rust-engineer-1001">Senior Rust Engineer</a>
                <h3 class="job-card__title">Senior Rust Engineer</h3>
                <h4 class="job-card__company"><a href="/company/acme-corp">Acme Corp</a></h4>
                <span class="job-card__location">Berlin</span>
                <time datetime="2024-03-01">3 days ago</time>
                <span class="job-card__salary">EUR 80k-95k</span>
                <span class="job-card__benefit">Remote</span>
                <span class="job-card__benefit">Equity</span>
            </li>
            <li class="job-card">
                <a class="job-card__link" href="/jobs/view/backend-developer-1002">Backend Developer</a>
                <h3 class="job-card__title">Backend Developer</h3>
                <h4 class="job-card__company"><a href="/company/globex">Globex</a></h4>
                <span class="job-card__location">Munich</span>
            </li>
            <li class="job-card">
                <h3 class="job-card__title">Card without a link</h3>
            </li>
        </ul></body></html>
    "#;

    #[test]
    fn test_parse_search_results() {
        let parser = HtmlParser::default();
        let cards = parser.parse_search_results(SEARCH_PAGE, &base());

        assert_eq!(cards.len(), 2, "linkless card must be skipped");
        assert_eq!(cards[0].title.as_deref(), Some("Senior Rust Engineer"));
        assert_eq!(cards[0].company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(
            cards[0].company_url.as_deref(),
            Some("https://boards.example.com/company/acme-corp")
        );
        assert_eq!(cards[0].location.as_deref(), Some("Berlin"));
        assert_eq!(cards[0].posted_at.as_deref(), Some("2024-03-01"));
        assert_eq!(cards[0].salary_info, vec!["EUR 80k-95k"]);
        assert_eq!(cards[0].benefits, vec!["Remote", "Equity"]);
        assert_eq!(
            cards[0].job_url.as_str(),
            "https://boards.example.com/jobs/view/senior-rust-engineer-1001"
        );
    }

    #[test]
    fn test_card_without_optional_fields() {
        let parser = HtmlParser::default();
        let cards = parser.parse_search_results(SEARCH_PAGE, &base());

        assert_eq!(cards[1].posted_at, None);
        assert!(cards[1].salary_info.is_empty());
        assert!(cards[1].benefits.is_empty());
    }

    #[test]
    fn test_parse_job_detail() {
        let markup = r#"
            <html><body>
                <div class="job-detail__description">We build rust things.</div>
                <ul class="job-criteria">
                    <li class="job-criteria__item">
                        <span class="job-criteria__label">Seniority level</span>
                        <span class="job-criteria__value">Senior</span>
                    </li>
                    <li class="job-criteria__item">
                        <span class="job-criteria__label">Employment type</span>
                        <span class="job-criteria__value">Full-time</span>
                    </li>
                    <li class="job-criteria__item">
                        <span class="job-criteria__label">Job function</span>
                        <span class="job-criteria__value">Engineering</span>
                    </li>
                    <li class="job-criteria__item">
                        <span class="job-criteria__label">Industries</span>
                        <span class="job-criteria__value">Software</span>
                    </li>
                </ul>
                <span class="job-detail__applicants">57 applicants</span>
                <a class="job-detail__apply" href="/apply/1001">Apply</a>
                <div class="job-poster__name">Dana Recruiter</div>
                <div class="job-poster__title">Talent Lead</div>
            </body></html>
        "#;

        let parser = HtmlParser::default();
        let detail = parser.parse_job_detail(markup, &base());

        assert_eq!(detail.description.as_deref(), Some("We build rust things."));
        assert_eq!(detail.seniority_level.as_deref(), Some("Senior"));
        assert_eq!(detail.employment_type.as_deref(), Some("Full-time"));
        assert_eq!(detail.job_function.as_deref(), Some("Engineering"));
        assert_eq!(detail.industries.as_deref(), Some("Software"));
        assert_eq!(detail.applicant_count, Some(57));
        assert_eq!(
            detail.apply_url.as_deref(),
            Some("https://boards.example.com/apply/1001")
        );
        assert_eq!(detail.poster_name.as_deref(), Some("Dana Recruiter"));
        assert_eq!(detail.poster_title.as_deref(), Some("Talent Lead"));
    }

    #[test]
    fn test_parse_empty_detail_page() {
        let parser = HtmlParser::default();
        let detail = parser.parse_job_detail("<html><body></body></html>", &base());
        assert_eq!(detail, JobDetailFields::default());
    }

    #[test]
    fn test_parse_company_page() {
        let markup = r#"
            <html><body>
                <div class="company-about__description">Acme makes everything.</div>
                <a class="company-info__website" href="https://acme.example.com">Website</a>
                <span class="company-info__employees">1,024 employees</span>
                <span class="company-info__industry">Manufacturing</span>
                <span class="company-info__founded">1947</span>
                <span class="company-info__address">1 Acme Way, Springfield</span>
            </body></html>
        "#;

        let parser = HtmlParser::default();
        let company = parser.parse_company_page(markup, &base());

        assert_eq!(
            company.description.as_deref(),
            Some("Acme makes everything.")
        );
        assert_eq!(
            company.website.as_deref(),
            Some("https://acme.example.com/")
        );
        assert_eq!(company.employee_count, Some(1024));
        assert_eq!(company.industry.as_deref(), Some("Manufacturing"));
        assert_eq!(company.founded, Some(1947));
        assert_eq!(
            company.address.as_deref(),
            Some("1 Acme Way, Springfield")
        );
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("57 applicants"), Some(57));
        assert_eq!(leading_number("1,024 employees"), Some(1024));
        assert_eq!(leading_number("Over 200 applicants"), Some(200));
        assert_eq!(leading_number("no digits here"), None);
    }

    #[test]
    fn test_is_blocked_delegates_to_policy() {
        let parser = HtmlParser::default();
        assert!(parser.is_blocked("<div class=\"auth-wall\"></div>", 200));
        assert!(!parser.is_blocked(SEARCH_PAGE, 200));
    }
}
