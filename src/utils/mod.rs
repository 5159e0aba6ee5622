pub mod csv;
pub mod date;
pub mod email_cache;
pub mod email_filter;
