pub mod csv_output_adapter;
pub mod http_client;
pub mod rate_limiter;

pub use csv_output_adapter::CsvReportAdapter;
pub use http_client::ReqwestHttp;
pub use rate_limiter::FixedIntervalLimiter;
