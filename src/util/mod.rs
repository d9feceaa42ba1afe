pub mod jwt;
pub mod req_parse;
