pub mod contract;
pub mod product;
pub mod request;
pub mod response;
