//! Fixed-schema three year P&L table.

use crate::Shared;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Errors for the fixed financial schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A path segment or label does not name a known key.
    #[error("unknown {kind} key: {key}")]
    UnknownKey { kind: &'static str, key: String },
    /// A required entity row is absent.
    #[error("missing entity: {0}")]
    MissingEntity(Entity),
    /// A required metric row is absent for an entity.
    #[error("missing metric {metric} for {entity}")]
    MissingMetric { entity: Entity, metric: Metric },
    /// A required year cell is absent.
    #[error("missing year {year} in {entity}/{metric}")]
    MissingYear {
        entity: Entity,
        metric: Metric,
        year: Year,
    },
}

/// Declares a closed key enum with a display label and a compact alias.
macro_rules! closed_keys {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $label:literal | $alias:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label, alias = $alias)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = SchemaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label | $alias => Ok($name::$variant),)+
                    _ => Err(SchemaError::UnknownKey { kind: $kind, key: s.to_string() }),
                }
            }
        }
    };
}

closed_keys!(
    /// Legal entities with their own P&L.
    Entity, "entity", {
        Ertug => "Ertug" | "ertug",
        FiyuuSales => "Fiyuu Sales" | "FiyuuSales",
        FiyuuSwap => "Fiyuu Swap" | "FiyuuSwap",
        AtaBridge => "AtaBridge" | "atabridge",
    }
);

closed_keys!(
    /// P&L input lines.
    Metric, "metric", {
        NetSales => "Net Sales" | "NetSales",
        CostOfSales => "Cost of Sales" | "CostOfSales",
        TotalOpex => "Total OPEX" | "TotalOPEX",
    }
);

closed_keys!(
    /// Plan years.
    Year, "year", {
        Y2026 => "2026" | "FY2026",
        Y2027 => "2027" | "FY2027",
        Y2028 => "2028" | "FY2028",
    }
);

/// Values of one metric across the plan years.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearValues {
    pub values: BTreeMap<Year, Decimal>,
}

impl YearValues {
    pub fn get(&self, year: Year) -> Decimal {
        self.values.get(&year).copied().unwrap_or(Decimal::ZERO)
    }
}

/// All metric rows for one entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityPlan {
    pub metrics: BTreeMap<Metric, Shared<YearValues>>,
}

impl EntityPlan {
    pub fn get(&self, metric: Metric, year: Year) -> Decimal {
        self.metrics
            .get(&metric)
            .map(|row| row.get(year))
            .unwrap_or(Decimal::ZERO)
    }
}

/// entity → metric → year → amount.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Financials {
    pub entities: BTreeMap<Entity, Shared<EntityPlan>>,
}

impl Financials {
    /// Table with every key present and every amount zero.
    pub fn zeroed() -> Self {
        Self::from_rows(Entity::ALL.iter().flat_map(|&e| {
            Metric::ALL
                .iter()
                .map(move |&m| (e, m, [Decimal::ZERO; 3]))
        }))
    }

    /// Builds a table from `(entity, metric, [2026, 2027, 2028])` rows.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Entity, Metric, [Decimal; 3])>,
    {
        let mut entities: BTreeMap<Entity, EntityPlan> = BTreeMap::new();
        for (entity, metric, amounts) in rows {
            let values = Year::ALL.iter().copied().zip(amounts).collect();
            entities
                .entry(entity)
                .or_default()
                .metrics
                .insert(metric, Shared::new(YearValues { values }));
        }
        Self {
            entities: entities
                .into_iter()
                .map(|(e, p)| (e, Shared::new(p)))
                .collect(),
        }
    }

    /// Amount at a cell; absent keys read as zero.
    pub fn value(&self, entity: Entity, metric: Metric, year: Year) -> Decimal {
        self.entities
            .get(&entity)
            .map(|plan| plan.get(metric, year))
            .unwrap_or(Decimal::ZERO)
    }
}

/// Checks that every entity, metric and year key is present.
pub fn check_schema(fin: &Financials) -> Result<(), SchemaError> {
    let checked = first_violation(fin);
    if let Err(e) = &checked {
        warn!(error = %e, "financial table does not match the fixed schema");
    }
    checked
}

fn first_violation(fin: &Financials) -> Result<(), SchemaError> {
    for &entity in Entity::ALL {
        let plan = fin
            .entities
            .get(&entity)
            .ok_or(SchemaError::MissingEntity(entity))?;
        for &metric in Metric::ALL {
            let row = plan
                .metrics
                .get(&metric)
                .ok_or(SchemaError::MissingMetric { entity, metric })?;
            for &year in Year::ALL {
                if !row.values.contains_key(&year) {
                    return Err(SchemaError::MissingYear {
                        entity,
                        metric,
                        year,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_parse_from_label_and_alias() {
        assert_eq!("Net Sales".parse::<Metric>().unwrap(), Metric::NetSales);
        assert_eq!("NetSales".parse::<Metric>().unwrap(), Metric::NetSales);
        assert_eq!("Fiyuu Swap".parse::<Entity>().unwrap(), Entity::FiyuuSwap);
        assert_eq!("2027".parse::<Year>().unwrap(), Year::Y2027);
        assert_eq!(
            "2031".parse::<Year>(),
            Err(SchemaError::UnknownKey {
                kind: "year",
                key: "2031".into()
            })
        );
    }

    #[test]
    fn zeroed_table_satisfies_schema() {
        let fin = Financials::zeroed();
        check_schema(&fin).unwrap();
        assert_eq!(fin.entities.len(), 4);
        assert_eq!(
            fin.value(Entity::AtaBridge, Metric::TotalOpex, Year::Y2028),
            Decimal::ZERO
        );
    }

    #[test]
    fn missing_cells_read_as_zero_and_fail_schema() {
        let fin = Financials::from_rows([(
            Entity::Ertug,
            Metric::NetSales,
            [Decimal::new(5, 0), Decimal::new(6, 0), Decimal::new(7, 0)],
        )]);
        assert_eq!(
            fin.value(Entity::Ertug, Metric::NetSales, Year::Y2027),
            Decimal::new(6, 0)
        );
        assert_eq!(
            fin.value(Entity::FiyuuSales, Metric::NetSales, Year::Y2027),
            Decimal::ZERO
        );
        assert_eq!(
            check_schema(&fin),
            Err(SchemaError::MissingMetric {
                entity: Entity::Ertug,
                metric: Metric::CostOfSales
            })
        );
    }

    #[test]
    fn table_json_uses_labels() {
        let fin = Financials::zeroed();
        let v = serde_json::to_value(&fin).unwrap();
        assert!(v["Fiyuu Sales"]["Cost of Sales"].get("2026").is_some());
        let back: Financials = serde_json::from_value(v).unwrap();
        assert_eq!(back, fin);
    }
}
