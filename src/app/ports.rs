use crate::error::Result;
use crate::types::ResolvedListing;

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP seam used by every provider. Errors are transport failures
/// (connect, timeout, body read) rendered as strings.
pub trait HttpClientPort: Send + Sync {
    fn get(&self, url: &str, query: &[(String, String)]) -> std::result::Result<HttpResponse, String>;

    fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> std::result::Result<HttpResponse, String>;

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<HttpResponse, String>;
}

/// Outbound pacing for the parcel registry. `pause` blocks the calling thread.
pub trait RateLimiterPort: Send + Sync {
    fn pause(&self);
}

pub trait ReportOutputPort: Send + Sync {
    fn write_report(&self, listings: &[ResolvedListing], include_tax: bool) -> Result<()>;

    /// Where the report ended up, for the run summary.
    fn location(&self) -> String;
}
