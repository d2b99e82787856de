//! The molecule library.
//!
//! Every supported model is a [`library::MoleculeKind`] backed by a MOL2 template
//! embedded at compile time. Statepoints refer to models by string key; several
//! keys may resolve to the same template (`waterSPCE` and `spce`, or the three
//! pentane variants).

pub mod library;
