pub mod payload;
pub mod response;
