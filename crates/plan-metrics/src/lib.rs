#![deny(warnings)]

//! Derived P&L figures for the plan dashboard.
//!
//! - Gross profit: net sales minus cost of sales
//! - EBITDA: gross profit minus total OPEX
//! - The largest EBITDA across all entities and years
//!
//! Lookups go through [`Financials::value`], so a table that lost a key
//! reads that cell as zero instead of failing.

use plan_core::{Entity, Financials, Metric, Year};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Inputs and derived values for one entity in one year.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearFigures {
    pub net_sales: Decimal,
    pub cost_of_sales: Decimal,
    pub total_opex: Decimal,
    pub gross: Decimal,
    pub ebitda: Decimal,
}

impl YearFigures {
    /// Amounts saturate at the `Decimal` range instead of overflowing.
    pub fn new(net_sales: Decimal, cost_of_sales: Decimal, total_opex: Decimal) -> Self {
        let gross = net_sales.saturating_sub(cost_of_sales);
        Self {
            net_sales,
            cost_of_sales,
            total_opex,
            gross,
            ebitda: gross.saturating_sub(total_opex),
        }
    }

    /// EBITDA over net sales; `None` without sales or when the ratio does
    /// not fit a `Decimal`.
    pub fn ebitda_margin(&self) -> Option<Decimal> {
        if self.net_sales.is_zero() {
            None
        } else {
            self.ebitda.checked_div(self.net_sales)
        }
    }

    fn add(self, other: YearFigures) -> YearFigures {
        YearFigures::new(
            self.net_sales.saturating_add(other.net_sales),
            self.cost_of_sales.saturating_add(other.cost_of_sales),
            self.total_opex.saturating_add(other.total_opex),
        )
    }
}

/// Figures for every entity and year plus summary values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub entities: BTreeMap<Entity, BTreeMap<Year, YearFigures>>,
    /// Sum over all entities per year.
    pub totals: BTreeMap<Year, YearFigures>,
    /// Largest EBITDA of any entity in any year, never below zero.
    pub max_ebitda: Decimal,
}

impl Metrics {
    pub fn get(&self, entity: Entity, year: Year) -> YearFigures {
        self.entities
            .get(&entity)
            .and_then(|years| years.get(&year))
            .copied()
            .unwrap_or_default()
    }
}

/// Figures for a single cell group.
pub fn year_figures(fin: &Financials, entity: Entity, year: Year) -> YearFigures {
    YearFigures::new(
        fin.value(entity, Metric::NetSales, year),
        fin.value(entity, Metric::CostOfSales, year),
        fin.value(entity, Metric::TotalOpex, year),
    )
}

/// Computes every derived figure of the table.
pub fn compute_metrics(fin: &Financials) -> Metrics {
    let mut out = Metrics::default();
    for &entity in Entity::ALL {
        let mut years = BTreeMap::new();
        for &year in Year::ALL {
            let f = year_figures(fin, entity, year);
            if f.ebitda > out.max_ebitda {
                out.max_ebitda = f.ebitda;
            }
            let total = out.totals.entry(year).or_default();
            *total = total.add(f);
            years.insert(year, f);
        }
        out.entities.insert(entity, years);
    }
    trace!(max_ebitda = %out.max_ebitda, "metrics computed");
    out
}

/// Largest EBITDA across entities and years, floored at zero.
pub fn max_ebitda(fin: &Financials) -> Decimal {
    compute_metrics(fin).max_ebitda
}

/// Formats an amount the way Turkish locales print numbers: `.` groups
/// thousands, `,` separates at most three fraction digits, so `1234567.8`
/// prints as `1.234.567,8`.
pub fn format_tr(amount: Decimal) -> String {
    let rounded = amount.round_dp(3).normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(f) = frac_part {
        out.push(',');
        out.push_str(f);
    }
    out
}
