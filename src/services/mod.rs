//! Engine services: lifecycle, numbering, cache synchronization, storage
//! contract and the mutation-wrapping facade.

pub mod cache;
pub mod engine;
pub mod lifecycle;
pub mod numbering;
pub mod repository;

pub use cache::refresh_totals;
pub use engine::DocumentEngine;
pub use lifecycle::{
    transition_action, Actor, AllowAll, CapabilityCheck, NullObserver, StateMachine,
    StatusChanged, StatusObserver, TransitionRequest,
};
pub use numbering::{build_internal_number, InMemorySequences, SequenceStore};
pub use repository::{DocumentRepository, InMemoryRepository};
