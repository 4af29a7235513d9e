pub mod outcome;
pub mod request;
pub mod resume;
pub mod tier;
