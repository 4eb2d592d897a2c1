pub mod chart_service;
pub mod request_service;
