//! Resilient calls to other services.
//!
//! A [`ResilientClient`] wraps a [`RemoteLookup`] with a per-dependency
//! [`CircuitBreaker`] taken from a [`BreakerRegistry`]. While a breaker is
//! open, calls to its dependency fail locally with
//! [`DependencyError::Unavailable`] and no request is sent. A remote answer
//! that the entity does not exist is a successful call and surfaces as
//! [`DependencyError::NotFound`].

pub mod breaker;
pub mod client;
pub mod config;
pub mod error;
pub mod lookup;
pub mod registry;
pub mod state;
pub mod window;

pub use breaker::{BreakerSnapshot, CircuitBreaker, Permit};
pub use client::{
    DEFAULT_CALL_TIMEOUT, ExistenceCheck, Fallback, ResilientClient, unavailable_fallback,
};
pub use config::{BreakerConfig, SlidingWindowType};
pub use error::{CallFailure, ConfigError, DependencyError, LookupError};
pub use lookup::{HttpLookup, InMemoryLookup, RemoteLookup, UnconfiguredLookup};
pub use registry::BreakerRegistry;
pub use state::CircuitState;
pub use window::{CallOutcome, SlidingWindow, WindowCounts};
