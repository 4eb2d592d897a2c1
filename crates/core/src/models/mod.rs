pub mod chart;
pub mod form;
pub mod page;
pub mod request;
pub mod result;
pub mod settings;
