use url::Url;

/// Joins a result filename onto the API base's download route. Inputs that
/// are already absolute URLs pass through unchanged, so the function is
/// idempotent.
pub fn resolve_download_url(base: &Url, name_or_url: &str) -> String {
    if Url::parse(name_or_url).is_ok_and(|parsed| parsed.has_host()) {
        return name_or_url.to_string();
    }
    join_api(base, &format!("download/{name_or_url}"))
}

/// Filename the service uses for a compressed result when only the job id is
/// known. Paired with the polling fallback that assumes completion.
pub fn assumed_result_filename(job_id: &str) -> String {
    format!("compressed_{job_id}.pdf")
}

pub(crate) fn join_api(base: &Url, path: &str) -> String {
    let trimmed = base.as_str().trim_end_matches('/');
    format!("{trimmed}/{path}")
}

#[cfg(test)]
mod tests {
    use super::{assumed_result_filename, resolve_download_url};
    use url::Url;

    fn base() -> Url {
        Url::parse("http://api.test:8080").unwrap()
    }

    #[test]
    fn relative_filename_is_joined_onto_download_route() {
        assert_eq!(
            resolve_download_url(&base(), "out.docx"),
            "http://api.test:8080/download/out.docx"
        );
    }

    #[test]
    fn trailing_slash_on_base_does_not_double() {
        let base = Url::parse("http://api.test:8080/").unwrap();
        assert_eq!(
            resolve_download_url(&base, "out.docx"),
            "http://api.test:8080/download/out.docx"
        );
    }

    #[test]
    fn absolute_url_passes_through() {
        let absolute = "https://cdn.test/results/out.docx";
        assert_eq!(resolve_download_url(&base(), absolute), absolute);
        // Applying the function twice changes nothing.
        assert_eq!(
            resolve_download_url(&base(), &resolve_download_url(&base(), "out.docx")),
            "http://api.test:8080/download/out.docx"
        );
    }

    #[test]
    fn assumed_filename_follows_naming_convention() {
        assert_eq!(assumed_result_filename("j-123"), "compressed_j-123.pdf");
    }
}
