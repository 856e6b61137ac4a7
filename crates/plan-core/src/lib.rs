#![deny(warnings)]

//! Core domain model for the e-moped business plan.
//!
//! A [`BusinessPlan`] is an immutable snapshot: every subtree is held behind
//! a [`Shared`] pointer so that successor snapshots can reuse untouched
//! branches. Nothing in this crate mutates a snapshot in place; the
//! `plan-store` crate produces successors.

mod coerce;
mod defaults;
mod finance;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use coerce::{num, parse_amount};
pub use finance::{
    check_schema, Entity, EntityPlan, Financials, Metric, SchemaError, Year, YearValues,
};

/// Reference-counted subtree shared between snapshots.
pub type Shared<T> = Arc<T>;

/// One of the three fixed business actors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Logo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// A supplier in the ordered supplier row.
///
/// Suppliers are addressed by position. Relations in [`DiagramConfig`] refer
/// to these positions and are not renumbered when a supplier is removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Supplier {
    /// Label used where an unnamed supplier still needs a readable title.
    pub fn display_name(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("Tedarikçi {}", index + 1)
        } else {
            self.name.clone()
        }
    }
}

/// The final customer of the pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndUser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Fixed role of each actor slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorRole {
    /// Supply and consulting (slot 0).
    Supply,
    /// Assembly and manufacturing (slot 1).
    Assembly,
    /// Sales and swap operations (slot 2).
    Sales,
}

impl ActorRole {
    pub const ALL: [ActorRole; 3] = [ActorRole::Supply, ActorRole::Assembly, ActorRole::Sales];

    /// Position of this role in [`BusinessPlan::actors`].
    pub fn index(self) -> usize {
        match self {
            ActorRole::Supply => 0,
            ActorRole::Assembly => 1,
            ActorRole::Sales => 2,
        }
    }

    /// Title shown when the actor has no name.
    pub fn fallback_name(self) -> &'static str {
        match self {
            ActorRole::Supply => "AtaBridge",
            ActorRole::Assembly => "Ertug",
            ActorRole::Sales => "Fiyuu",
        }
    }
}

/// Sorted, duplicate-free set of supplier positions.
///
/// Entries are position references, not identities: an entry may point past
/// the end of the current supplier row and must then be read as "no edge".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<usize>", into = "Vec<usize>")]
pub struct SupplierIndexSet(Vec<usize>);

impl SupplierIndexSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    /// Symmetric difference with `{index}`, keeping ascending order.
    pub fn toggled(&self, index: usize) -> Self {
        let mut out = self.0.clone();
        match out.binary_search(&index) {
            Ok(pos) => {
                out.remove(pos);
            }
            Err(pos) => out.insert(pos, index),
        }
        Self(out)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<usize>> for SupplierIndexSet {
    fn from(mut v: Vec<usize>) -> Self {
        v.sort_unstable();
        v.dedup();
        Self(v)
    }
}

impl From<SupplierIndexSet> for Vec<usize> {
    fn from(s: SupplierIndexSet) -> Self {
        s.0
    }
}

impl FromIterator<usize> for SupplierIndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

/// Which products flow from the sales actor to the end user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndUserFlow {
    #[serde(default)]
    pub moped: bool,
    #[serde(default)]
    pub battery: bool,
}

impl EndUserFlow {
    pub fn any(&self) -> bool {
        self.moped || self.battery
    }
}

/// Relations drawn on the flow diagram.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagramConfig {
    /// Suppliers the supply actor advises (dashed stubs).
    pub ata_to_suppliers: SupplierIndexSet,
    /// Suppliers the assembly actor buys from.
    pub ertug_from_suppliers: SupplierIndexSet,
    /// Suppliers the sales actor buys from.
    pub fiyuu_from_suppliers: SupplierIndexSet,
    /// Sales actor buys e-mopeds from the assembly actor.
    pub fiyuu_from_ertug: bool,
    pub end_user_from_fiyuu: EndUserFlow,
}

/// Product portfolio category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductCategory {
    /// Production equipment.
    #[default]
    A,
    /// E-moped.
    B,
    /// Battery.
    C,
    /// Swap cabinet.
    D,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 4] = [
        ProductCategory::A,
        ProductCategory::B,
        ProductCategory::C,
        ProductCategory::D,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProductCategory::A => "A) Üretim Ekipmanları",
            ProductCategory::B => "B) E\u{2011}Moped",
            ProductCategory::C => "C) Battery",
            ProductCategory::D => "D) Kabinet",
        }
    }
}

/// Stable product identifier (a v4 UUID rendered as text).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    /// Fresh identifier from the thread RNG.
    pub fn generate() -> Self {
        Self::from_rng(&mut rand::thread_rng())
    }

    /// Identifier drawn from a caller-supplied RNG.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(
            uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .to_string(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A blank product still needs an identity, so this draws a fresh one.
impl Default for ProductId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A portfolio entry.
///
/// `supplier` is a free-text label and is unrelated to supplier positions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub category: ProductCategory,
    #[serde(default)]
    pub name: String,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

impl Product {
    /// Empty product as created by the editor's add action.
    pub fn blank(id: ProductId) -> Self {
        Self {
            id,
            category: ProductCategory::A,
            name: String::new(),
            image: Some(String::new()),
            specs: Some(String::new()),
            supplier: Some(String::new()),
        }
    }
}

/// Aggregate root: one immutable snapshot of the whole plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPlan {
    pub actors: Shared<[Shared<Actor>; 3]>,
    pub suppliers: Shared<Vec<Shared<Supplier>>>,
    pub end_user: Shared<EndUser>,
    pub diagram_config: Shared<DiagramConfig>,
    pub products: Shared<Vec<Shared<Product>>>,
    pub financials: Shared<Financials>,
}

impl BusinessPlan {
    pub fn actor(&self, role: ActorRole) -> &Actor {
        &self.actors[role.index()]
    }

    pub fn supplier(&self, index: usize) -> Option<&Supplier> {
        self.suppliers.get(index).map(|s| s.as_ref())
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn index_set_is_normalized_on_deserialize() {
        let s: SupplierIndexSet = serde_json::from_str("[3, 1, 3, 0]").unwrap();
        assert_eq!(s.as_slice(), &[0, 1, 3]);
        assert!(s.contains(3));
        assert!(!s.contains(2));
    }

    #[test]
    fn toggled_adds_and_removes() {
        let s: SupplierIndexSet = vec![0, 2].into();
        assert_eq!(s.toggled(1).as_slice(), &[0, 1, 2]);
        assert_eq!(s.toggled(2).as_slice(), &[0]);
        // the original set is untouched
        assert_eq!(s.as_slice(), &[0, 2]);
    }

    #[test]
    fn seeded_product_ids_are_reproducible() {
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        let id_a = ProductId::from_rng(&mut a);
        assert_eq!(id_a, ProductId::from_rng(&mut b));
        assert_eq!(id_a.as_str().len(), 36);
        assert_ne!(id_a, ProductId::from_rng(&mut a));
    }

    #[test]
    fn supplier_display_name_falls_back_to_position() {
        let s = Supplier::default();
        assert_eq!(s.display_name(2), "Tedarikçi 3");
        let named = Supplier {
            name: "Sanco".into(),
            ..Supplier::default()
        };
        assert_eq!(named.display_name(2), "Sanco");
    }

    #[test]
    fn plan_serializes_with_camel_case_keys() {
        let plan = BusinessPlan::default();
        let v = serde_json::to_value(&plan).unwrap();
        assert!(v.get("endUser").is_some());
        assert!(v["diagramConfig"].get("ataToSuppliers").is_some());
        assert!(v["diagramConfig"]["endUserFromFiyuu"]["moped"].as_bool().unwrap());
        let back: BusinessPlan = serde_json::from_value(v).unwrap();
        assert_eq!(back, plan);
    }

    #[test]
    fn category_labels() {
        assert_eq!(ProductCategory::default(), ProductCategory::A);
        assert_eq!(ProductCategory::D.label(), "D) Kabinet");
    }

    proptest! {
        #[test]
        fn toggle_twice_is_identity(v in proptest::collection::vec(0usize..20, 0..10), i in 0usize..20) {
            let s: SupplierIndexSet = v.into();
            prop_assert_eq!(s.toggled(i).toggled(i), s.clone());
            let once = s.toggled(i);
            prop_assert!(once.as_slice().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
