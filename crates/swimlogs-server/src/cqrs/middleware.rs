//! Marker traits separating writes from reads
//!
//! Every request type registered with the mediator implements exactly one of
//! these.

/// A request that changes stored state
pub trait Command {}

/// A request that only reads stored state
pub trait Query {}
