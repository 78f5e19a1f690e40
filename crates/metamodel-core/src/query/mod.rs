//! Query-side navigation over the metamodel.
//!
//! - `path`: structural navigable-path identities and their fingerprints.
//! - `source`: path sources, the factories behind every navigable step.
//! - `node`: node factory and creation context/state.
//! - `sqm`: concrete path nodes.
//! - `resolve`: dotted path resolution (`Customer.orders.total`).

pub mod node;
pub mod path;
pub mod resolve;
pub mod source;
pub mod sqm;
