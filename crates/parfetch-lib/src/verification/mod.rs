mod digest;

pub use digest::{VerificationError, verify_file};
