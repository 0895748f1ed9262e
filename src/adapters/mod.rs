// Adapters layer: concrete implementations for external systems.

pub mod docs;
pub mod openai;
pub mod postnl;
pub mod script;
pub mod storage;
