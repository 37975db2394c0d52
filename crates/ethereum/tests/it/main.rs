mod sign_typed_data;
mod sign_typed_hash;
pub mod utils;
