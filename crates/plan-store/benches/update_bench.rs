use criterion::{criterion_group, criterion_main, Criterion};
use plan_core::BusinessPlan;
use plan_store::{apply_path_update, toggle_relation, Relation};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::json;

fn bench_updates(c: &mut Criterion) {
    let plan = BusinessPlan::default_with_rng(&mut ChaCha8Rng::seed_from_u64(42));
    c.bench_function("path_update_supplier_name", |b| {
        b.iter(|| apply_path_update(&plan, "suppliers.3.name", json!("Sleuu EV")))
    });
    c.bench_function("path_update_financial_cell", |b| {
        b.iter(|| apply_path_update(&plan, "financials.Fiyuu Swap.Total OPEX.2027", json!("1e6")))
    });
    c.bench_function("toggle_relation", |b| {
        b.iter(|| toggle_relation(&plan, Relation::ErtugFromSuppliers, 4))
    });
}

criterion_group!(benches, bench_updates);
criterion_main!(benches);
