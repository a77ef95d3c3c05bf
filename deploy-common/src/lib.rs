//! Common types used throughout the deployment tooling, shared by the
//! sequencing library & the deploy scripts

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod types;
