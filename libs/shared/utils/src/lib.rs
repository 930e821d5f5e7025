pub mod extractor;
pub mod test_utils;

pub use extractor::caller_identity;
