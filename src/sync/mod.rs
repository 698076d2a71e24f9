//! Client-side order synchronization.
//!
//! [`ApiClient`] talks to the order API with retry and typed errors;
//! [`OrderSync`] keeps one shared, observable order cache on top of any
//! [`OrderApi`], applying status changes and deletions optimistically and
//! reconciling with the server in the background.

pub mod cache;
pub mod client;
pub mod error;
pub mod layer;
pub mod mutation;
pub mod timers;

pub use cache::SyncSnapshot;
pub use client::{ApiClient, FetchRequest, LoginResponse, OrderApi, RetryPolicy, SessionUser};
pub use error::SyncError;
pub use layer::{OrderSync, SyncSettings};
pub use mutation::{MutationPhase, OptimisticMutation};
pub use timers::ScheduledTask;
