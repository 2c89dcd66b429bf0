pub(crate) mod bridge;
pub(crate) mod mapper;
pub(crate) mod marker;
