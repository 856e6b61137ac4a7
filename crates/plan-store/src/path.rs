//! Dot-separated paths and the copy-on-write tree walk behind them.
//!
//! Every node type of the plan implements [`PathTarget`]. Containers are
//! either records (named fields), sequences (numeric index), fixed tuples,
//! or closed-key maps. Shared subtrees go through [`Arc::make_mut`], which
//! clones a node only when another snapshot still holds it; siblings that
//! are not on the path keep their pointer.

use plan_core::{
    num, Actor, BusinessPlan, DiagramConfig, EndUser, EndUserFlow, EntityPlan, Financials,
    Product, ProductCategory, ProductId, Supplier, SupplierIndexSet, YearValues,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Programmer errors raised by a path update. None of them can be produced
/// by the editor helpers in this crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("update path is empty")]
    Empty,
    #[error("path `{0}` contains an empty segment")]
    EmptySegment(String),
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("segment `{0}` is not a sequence index")]
    NotAnIndex(String),
    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("cannot descend into scalar value at `{0}`")]
    NotAContainer(String),
    #[error("value does not fit the target: {0}")]
    TypeMismatch(String),
}

/// A parsed, non-empty update path such as `suppliers.2.name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> Path<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<&str> = raw.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(PathError::EmptySegment(raw.to_string()));
        }
        Ok(Self { raw, segments })
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}

/// A node that can receive a value at a relative path.
pub trait PathTarget: DeserializeOwned {
    /// Descends one level through `key` and continues with `rest`.
    fn set_child(&mut self, key: &str, rest: &[&str], value: Value) -> Result<(), PathError>;

    /// Assigns `value` at `path`; an empty path replaces this node.
    fn set_path(&mut self, path: &[&str], value: Value) -> Result<(), PathError> {
        match path.split_first() {
            None => {
                *self = serde_json::from_value(value)
                    .map_err(|e| PathError::TypeMismatch(e.to_string()))?;
                Ok(())
            }
            Some((key, rest)) => self.set_child(key, rest, value),
        }
    }
}

fn parse_index(key: &str) -> Result<usize, PathError> {
    key.parse()
        .map_err(|_| PathError::NotAnIndex(key.to_string()))
}

macro_rules! leaf_target {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PathTarget for $ty {
                fn set_child(&mut self, key: &str, _: &[&str], _: Value) -> Result<(), PathError> {
                    Err(PathError::NotAContainer(key.to_string()))
                }
            }
        )+
    };
}

leaf_target!(String, bool, ProductCategory, ProductId, SupplierIndexSet);

/// Amounts never reject input: anything assigned is coerced with [`num`].
impl PathTarget for Decimal {
    fn set_child(&mut self, key: &str, _: &[&str], _: Value) -> Result<(), PathError> {
        Err(PathError::NotAContainer(key.to_string()))
    }

    fn set_path(&mut self, path: &[&str], value: Value) -> Result<(), PathError> {
        match path.first() {
            None => {
                *self = num(&value);
                Ok(())
            }
            Some(key) => self.set_child(key, &path[1..], value),
        }
    }
}

macro_rules! record_target {
    ($ty:ty { $($key:literal => $field:ident),+ $(,)? }) => {
        impl PathTarget for $ty {
            fn set_child(&mut self, key: &str, rest: &[&str], value: Value) -> Result<(), PathError> {
                match key {
                    $($key => self.$field.set_path(rest, value),)+
                    _ => Err(PathError::UnknownField(key.to_string())),
                }
            }
        }
    };
}

record_target!(BusinessPlan {
    "actors" => actors,
    "suppliers" => suppliers,
    "endUser" => end_user,
    "diagramConfig" => diagram_config,
    "products" => products,
    "financials" => financials,
});
record_target!(Actor { "name" => name, "desc" => desc, "logo" => logo });
record_target!(Supplier { "name" => name, "desc" => desc, "logo" => logo });
record_target!(EndUser { "name" => name, "desc" => desc });
record_target!(DiagramConfig {
    "ataToSuppliers" => ata_to_suppliers,
    "ertugFromSuppliers" => ertug_from_suppliers,
    "fiyuuFromSuppliers" => fiyuu_from_suppliers,
    "fiyuuFromErtug" => fiyuu_from_ertug,
    "endUserFromFiyuu" => end_user_from_fiyuu,
});
record_target!(EndUserFlow { "moped" => moped, "battery" => battery });
record_target!(Product {
    "id" => id,
    "category" => category,
    "name" => name,
    "image" => image,
    "specs" => specs,
    "supplier" => supplier,
});

// Transparent wrappers around closed-key maps.
macro_rules! wrapper_target {
    ($($ty:ty => $field:ident),+ $(,)?) => {
        $(
            impl PathTarget for $ty {
                fn set_child(&mut self, key: &str, rest: &[&str], value: Value) -> Result<(), PathError> {
                    self.$field.set_child(key, rest, value)
                }
            }
        )+
    };
}

wrapper_target!(
    Financials => entities,
    EntityPlan => metrics,
    YearValues => values,
);

/// An absent optional container is treated as an empty one.
impl<T: PathTarget + Default> PathTarget for Option<T> {
    fn set_child(&mut self, key: &str, rest: &[&str], value: Value) -> Result<(), PathError> {
        self.get_or_insert_with(T::default)
            .set_child(key, rest, value)
    }
}

impl<T: PathTarget + Clone> PathTarget for Arc<T> {
    fn set_child(&mut self, key: &str, rest: &[&str], value: Value) -> Result<(), PathError> {
        Arc::make_mut(self).set_child(key, rest, value)
    }

    fn set_path(&mut self, path: &[&str], value: Value) -> Result<(), PathError> {
        Arc::make_mut(self).set_path(path, value)
    }
}

/// Index `len` appends a default element; anything further is rejected.
impl<T: PathTarget + Default> PathTarget for Vec<T> {
    fn set_child(&mut self, key: &str, rest: &[&str], value: Value) -> Result<(), PathError> {
        let index = parse_index(key)?;
        if index == self.len() {
            self.push(T::default());
        }
        let len = self.len();
        match self.get_mut(index) {
            Some(slot) => slot.set_path(rest, value),
            None => Err(PathError::IndexOutOfRange { index, len }),
        }
    }
}

impl<T: PathTarget, const N: usize> PathTarget for [T; N]
where
    [T; N]: DeserializeOwned,
{
    fn set_child(&mut self, key: &str, rest: &[&str], value: Value) -> Result<(), PathError> {
        let index = parse_index(key)?;
        match self.get_mut(index) {
            Some(slot) => slot.set_path(rest, value),
            None => Err(PathError::IndexOutOfRange { index, len: N }),
        }
    }
}

/// Keys are parsed through their closed enum; a missing entry is created.
impl<K, V> PathTarget for BTreeMap<K, V>
where
    K: FromStr + Ord + DeserializeOwned,
    V: PathTarget + Default,
{
    fn set_child(&mut self, key: &str, rest: &[&str], value: Value) -> Result<(), PathError> {
        let k: K = key
            .parse()
            .map_err(|_| PathError::UnknownField(key.to_string()))?;
        self.entry(k).or_default().set_path(rest, value)
    }
}
