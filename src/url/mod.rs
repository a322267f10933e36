//! URL admission logic
//!
//! Pure decision logic over URLs: normalization, domain scoping, file-type
//! filtering, and the two-tiered save-exclusion lists.

mod policy;

pub use policy::AdmissionPolicy;
