#![deny(warnings)]

//! Copy-on-write updates for business plan snapshots.
//!
//! [`apply_path_update`] is the generic setter; the remaining functions are
//! the editor operations (suppliers, products, relations, amounts). All of
//! them return a new [`plan_core::BusinessPlan`] that shares every branch
//! the change did not touch with its predecessor.

mod ops;
mod path;
mod store;

pub use ops::{
    add_product, add_product_with_id, add_supplier, apply_path_update, remove_product,
    remove_supplier, set_financial, set_flow, toggle_index, toggle_relation, update_actor,
    update_product, update_supplier, Flow, ProductPatch, ProfilePatch, Relation,
};
pub use path::{Path, PathError, PathTarget};
pub use store::StateStore;
