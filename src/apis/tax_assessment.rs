use crate::app::ports::HttpClientPort;
use crate::config::TaxAssessmentConfig;
use crate::parser::parse_currency_amount;
use crate::types::{Lookup, ParcelRef, TaxAssessor};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// County property-tax service. Answers `{"d": {"LatestStatement": {"Tax": "$2,345.67"}}}`.
pub struct CountyTaxAssessor {
    http: Arc<dyn HttpClientPort>,
    url: String,
}

impl CountyTaxAssessor {
    pub fn new(http: Arc<dyn HttpClientPort>, config: &TaxAssessmentConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
        }
    }
}

impl TaxAssessor for CountyTaxAssessor {
    #[instrument(skip(self), fields(parcel_no = %parcel.parcel_no))]
    fn lookup_latest_tax(&self, parcel: &ParcelRef) -> Lookup<i64> {
        let body = json!({ "parcelNumber": parcel.parcel_no });

        let resp = match self.http.post_json(&self.url, &body) {
            Ok(resp) => resp,
            Err(e) => return Lookup::Transient(e),
        };
        if !resp.is_success() {
            return Lookup::Transient(format!("tax service responded with HTTP {}", resp.status));
        }

        match serde_json::from_str::<Value>(&resp.body) {
            Ok(data) => extract_latest_tax(&data),
            Err(e) => Lookup::Transient(format!("tax service returned invalid JSON: {e}")),
        }
    }
}

pub fn extract_latest_tax(data: &Value) -> Lookup<i64> {
    let tax = &data["d"]["LatestStatement"]["Tax"];
    let amount = match tax {
        Value::String(s) => parse_currency_amount(s),
        Value::Number(n) => n.as_f64().map(|f| f.trunc() as i64),
        _ => None,
    };
    match amount {
        Some(amount) => Lookup::Found(amount),
        None => Lookup::NotFound,
    }
}
