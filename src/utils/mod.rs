pub mod account_filter;
pub mod cache;
pub mod db_utils;
pub mod geo;
