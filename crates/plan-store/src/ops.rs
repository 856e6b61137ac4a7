//! Editor operations built on top of the path update.
//!
//! Each function takes the current snapshot and returns its successor. The
//! input is never modified and untouched branches stay shared.

use crate::path::{Path, PathError, PathTarget};
use plan_core::{
    num, ActorRole, BusinessPlan, DiagramConfig, Entity, Metric, Product, ProductCategory,
    ProductId, Shared, Supplier, SupplierIndexSet, Year,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Assigns `value` at a dot-separated `path`, returning the successor.
///
/// Numeric segments index sequences. A missing optional record is created
/// empty before descending, and index `len` of a sequence appends a blank
/// element. Amount leaves coerce their input with [`num`].
pub fn apply_path_update(
    plan: &BusinessPlan,
    path: &str,
    value: Value,
) -> Result<BusinessPlan, PathError> {
    let parsed = Path::parse(path)?;
    let mut next = plan.clone();
    match next.set_path(parsed.segments(), value) {
        Ok(()) => {
            debug!(path = %parsed, "applied path update");
            Ok(next)
        }
        Err(e) => {
            debug!(path = %parsed, error = %e, "rejected path update");
            Err(e)
        }
    }
}

/// Partial update of a name/description/logo record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub logo: Option<String>,
}

impl ProfilePatch {
    fn fields(&self) -> impl Iterator<Item = (&'static str, &String)> {
        [
            ("name", self.name.as_ref()),
            ("desc", self.desc.as_ref()),
            ("logo", self.logo.as_ref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
    }
}

/// Partial update of a product.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub category: Option<ProductCategory>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub specs: Option<String>,
    pub supplier: Option<String>,
}

impl ProductPatch {
    fn merged(&self, base: &Product) -> Product {
        let mut p = base.clone();
        if let Some(c) = self.category {
            p.category = c;
        }
        if let Some(v) = &self.name {
            p.name = v.clone();
        }
        if let Some(v) = &self.image {
            p.image = Some(v.clone());
        }
        if let Some(v) = &self.specs {
            p.specs = Some(v.clone());
        }
        if let Some(v) = &self.supplier {
            p.supplier = Some(v.clone());
        }
        p
    }
}

fn apply_profile(
    plan: &BusinessPlan,
    prefix: &str,
    patch: &ProfilePatch,
) -> Result<BusinessPlan, PathError> {
    let mut next = plan.clone();
    for (field, v) in patch.fields() {
        next = apply_path_update(&next, &format!("{prefix}.{field}"), Value::String(v.clone()))?;
    }
    Ok(next)
}

pub fn update_actor(
    plan: &BusinessPlan,
    role: ActorRole,
    patch: &ProfilePatch,
) -> Result<BusinessPlan, PathError> {
    apply_profile(plan, &format!("actors.{}", role.index()), patch)
}

/// Patches the supplier at `index`; `index == len` creates a new one.
pub fn update_supplier(
    plan: &BusinessPlan,
    index: usize,
    patch: &ProfilePatch,
) -> Result<BusinessPlan, PathError> {
    apply_profile(plan, &format!("suppliers.{index}"), patch)
}

/// Appends a blank supplier at the end of the row.
pub fn add_supplier(plan: &BusinessPlan) -> BusinessPlan {
    let mut next = plan.clone();
    Arc::make_mut(&mut next.suppliers).push(Shared::new(Supplier {
        name: String::new(),
        desc: Some(String::new()),
        logo: None,
    }));
    next
}

/// Removes the supplier at `index`. Later suppliers move down one position;
/// relation sets are left as they are.
pub fn remove_supplier(plan: &BusinessPlan, index: usize) -> BusinessPlan {
    if index >= plan.suppliers.len() {
        warn!(index, len = plan.suppliers.len(), "supplier index out of range");
        return plan.clone();
    }
    let mut next = plan.clone();
    Arc::make_mut(&mut next.suppliers).remove(index);
    next
}

/// Appends a blank product with a freshly generated id.
pub fn add_product(plan: &BusinessPlan) -> BusinessPlan {
    add_product_with_id(plan, ProductId::generate())
}

pub fn add_product_with_id(plan: &BusinessPlan, id: ProductId) -> BusinessPlan {
    let mut next = plan.clone();
    Arc::make_mut(&mut next.products).push(Shared::new(Product::blank(id)));
    next
}

pub fn remove_product(plan: &BusinessPlan, id: &ProductId) -> BusinessPlan {
    if plan.product(id).is_none() {
        warn!(%id, "unknown product");
        return plan.clone();
    }
    let mut next = plan.clone();
    Arc::make_mut(&mut next.products).retain(|p| &p.id != id);
    next
}

/// Replaces the product with `id` by its patched copy; other products keep
/// their pointer.
pub fn update_product(plan: &BusinessPlan, id: &ProductId, patch: &ProductPatch) -> BusinessPlan {
    if plan.product(id).is_none() {
        warn!(%id, "unknown product");
        return plan.clone();
    }
    let mut next = plan.clone();
    for slot in Arc::make_mut(&mut next.products).iter_mut() {
        if &slot.id == id {
            *slot = Shared::new(patch.merged(slot));
        }
    }
    next
}

/// Sorted symmetric difference of `set` with `{index}`.
pub fn toggle_index(set: &[usize], index: usize) -> Vec<usize> {
    SupplierIndexSet::from(set.to_vec()).toggled(index).into()
}

/// Supplier relations drawn on the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Supply actor advises the supplier.
    AtaToSuppliers,
    /// Assembly actor buys from the supplier.
    ErtugFromSuppliers,
    /// Sales actor buys from the supplier.
    FiyuuFromSuppliers,
}

impl Relation {
    pub const ALL: [Relation; 3] = [
        Relation::AtaToSuppliers,
        Relation::ErtugFromSuppliers,
        Relation::FiyuuFromSuppliers,
    ];

    pub fn set(self, cfg: &DiagramConfig) -> &SupplierIndexSet {
        match self {
            Relation::AtaToSuppliers => &cfg.ata_to_suppliers,
            Relation::ErtugFromSuppliers => &cfg.ertug_from_suppliers,
            Relation::FiyuuFromSuppliers => &cfg.fiyuu_from_suppliers,
        }
    }

    fn set_mut(self, cfg: &mut DiagramConfig) -> &mut SupplierIndexSet {
        match self {
            Relation::AtaToSuppliers => &mut cfg.ata_to_suppliers,
            Relation::ErtugFromSuppliers => &mut cfg.ertug_from_suppliers,
            Relation::FiyuuFromSuppliers => &mut cfg.fiyuu_from_suppliers,
        }
    }
}

/// Adds or removes supplier `index` from a relation.
pub fn toggle_relation(plan: &BusinessPlan, relation: Relation, index: usize) -> BusinessPlan {
    let mut next = plan.clone();
    let set = relation.set_mut(Arc::make_mut(&mut next.diagram_config));
    *set = set.toggled(index);
    next
}

/// Boolean flows of the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Sales actor buys e-mopeds from the assembly actor.
    FiyuuFromErtug,
    /// End user buys e-mopeds.
    EndUserMoped,
    /// End user buys batteries.
    EndUserBattery,
}

pub fn set_flow(plan: &BusinessPlan, flow: Flow, on: bool) -> BusinessPlan {
    let mut next = plan.clone();
    let cfg = Arc::make_mut(&mut next.diagram_config);
    match flow {
        Flow::FiyuuFromErtug => cfg.fiyuu_from_ertug = on,
        Flow::EndUserMoped => cfg.end_user_from_fiyuu.moped = on,
        Flow::EndUserBattery => cfg.end_user_from_fiyuu.battery = on,
    }
    next
}

/// Writes one P&L cell, coercing `raw` with [`num`].
pub fn set_financial(
    plan: &BusinessPlan,
    entity: Entity,
    metric: Metric,
    year: Year,
    raw: &Value,
) -> BusinessPlan {
    let mut next = plan.clone();
    let fin = Arc::make_mut(&mut next.financials);
    let ent = Arc::make_mut(fin.entities.entry(entity).or_default());
    let row = Arc::make_mut(ent.metrics.entry(metric).or_default());
    row.values.insert(year, num(raw));
    next
}
