//! Storage wrapper registration and chain freezing.
//!
//! Wrappers are decorators over the raw storage. They can be registered up
//! until the storage is first used; the first real use freezes the chain,
//! and every later registration is rejected with an explicit result.

mod registry;

pub use registry::{RegistrationResult, StorageWrapper, WrapperRegistry};

pub(crate) use registry::EffectiveChain;
