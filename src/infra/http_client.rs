use crate::app::ports::{HttpClientPort, HttpResponse};
use crate::config::HttpConfig;
use crate::error::Result;
use reqwest::blocking::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Blocking reqwest client shared by all providers.
pub struct ReqwestHttp {
    client: Client,
}

impl ReqwestHttp {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client })
    }

    fn read(resp: Response) -> std::result::Result<HttpResponse, String> {
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| e.to_string())?;
        debug!(status, bytes = body.len(), "HTTP response received");
        Ok(HttpResponse { status, body })
    }
}

impl HttpClientPort for ReqwestHttp {
    fn get(&self, url: &str, query: &[(String, String)]) -> std::result::Result<HttpResponse, String> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| e.to_string())?;
        Self::read(resp)
    }

    fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> std::result::Result<HttpResponse, String> {
        let resp = self
            .client
            .post(url)
            .form(form)
            .send()
            .map_err(|e| e.to_string())?;
        Self::read(resp)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> std::result::Result<HttpResponse, String> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| e.to_string())?;
        Self::read(resp)
    }
}
