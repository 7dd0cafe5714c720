#![warn(missing_docs)]

//! Light weight helpers shared by the pod access crates. Nothing in here
//! knows about authorization schemes; it only deals with thread-safety bounds,
//! content fingerprints and the path-based container hierarchy of a Pod.

mod sync;
pub use sync::*;

mod hash;
pub use hash::*;

mod iri;
pub use iri::*;
