//! The plan every session starts from.

use crate::{
    Actor, BusinessPlan, DiagramConfig, EndUser, EndUserFlow, Entity, Financials, Metric, Product,
    ProductCategory, ProductId, Shared, Supplier,
};
use rand::Rng;
use rust_decimal::Decimal;

fn actor(name: &str, desc: &str) -> Shared<Actor> {
    Shared::new(Actor {
        name: name.to_string(),
        desc: Some(desc.to_string()),
        logo: None,
    })
}

fn supplier(name: &str, desc: &str) -> Shared<Supplier> {
    Shared::new(Supplier {
        name: name.to_string(),
        desc: Some(desc.to_string()),
        logo: None,
    })
}

fn product(
    id: ProductId,
    category: ProductCategory,
    name: &str,
    specs: &str,
    supplier: &str,
) -> Shared<Product> {
    Shared::new(Product {
        id,
        category,
        name: name.to_string(),
        image: Some(String::new()),
        specs: Some(specs.to_string()),
        supplier: Some(supplier.to_string()),
    })
}

fn d(v: i64) -> Decimal {
    Decimal::from(v)
}

fn default_financials() -> Financials {
    use Entity::*;
    use Metric::*;
    Financials::from_rows([
        (Ertug, NetSales, [d(107_949_600), d(213_550_400), d(353_410_000)]),
        (Ertug, CostOfSales, [d(95_891_511), d(176_597_577), d(283_394_827)]),
        (Ertug, TotalOpex, [d(18_720_333), d(27_934_550), d(32_015_104)]),
        (FiyuuSales, NetSales, [d(143_595_000), d(298_530_000), d(516_853_125)]),
        (FiyuuSales, CostOfSales, [d(118_440_000), d(221_520_000), d(365_400_000)]),
        (FiyuuSales, TotalOpex, [d(14_151_352), d(21_224_257), d(28_734_657)]),
        (FiyuuSwap, NetSales, [d(108_889_200), d(469_476_000), d(1_119_787_200)]),
        (FiyuuSwap, CostOfSales, [d(19_963_020), d(74_844_000), d(159_390_000)]),
        (FiyuuSwap, TotalOpex, [d(56_831_112), d(172_439_965), d(377_590_438)]),
        // commission assumption
        (AtaBridge, NetSales, [d(300_000), d(330_000), d(360_000)]),
        (AtaBridge, CostOfSales, [d(0), d(0), d(0)]),
        (AtaBridge, TotalOpex, [d(200_000), d(220_000), d(240_000)]),
    ])
}

impl BusinessPlan {
    /// Startup plan with product identifiers drawn from `rng`.
    pub fn default_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut id = || ProductId::from_rng(rng);
        let products = vec![
            product(id(), ProductCategory::A, "Montaj Hattı", "Jinggong", "Jinggong"),
            product(
                id(),
                ProductCategory::B,
                "BODYGUARD",
                "3000W, 80km/s, 60–80km",
                "Ertug",
            ),
            product(
                id(),
                ProductCategory::C,
                "LFP 72V 40Ah",
                "IP67, Akıllı BMS",
                "Zhizhu",
            ),
            product(
                id(),
                ProductCategory::D,
                "Swap Kabini 10\u{2011}slot",
                "Uzaktan izleme, OTA",
                "Zhizhu",
            ),
        ];

        BusinessPlan {
            actors: Shared::new([
                actor("AtaBridge", "Tedarik ve danışmanlık"),
                actor("Ertug", "Montaj & üretim"),
                actor("Fiyuu", "Satış & swap operasyonu"),
            ]),
            suppliers: Shared::new(vec![
                supplier("Jinggong", "Montaj hattı"),
                supplier("Sanco", "Boru bükme makinası"),
                supplier("Lingping", "Lazer kaynak makinası"),
                supplier("Sleuu", "CKD e\u{2011}moped parçaları"),
                supplier("Zhizhu", "Batarya & swap kabini"),
            ]),
            end_user: Shared::new(EndUser {
                name: "Kurye".to_string(),
                desc: Some("Son Kullanıcı".to_string()),
            }),
            diagram_config: Shared::new(DiagramConfig {
                ata_to_suppliers: vec![0, 1, 2, 3, 4].into(),
                ertug_from_suppliers: vec![0, 1, 2, 3].into(),
                fiyuu_from_suppliers: vec![4].into(),
                fiyuu_from_ertug: true,
                end_user_from_fiyuu: EndUserFlow {
                    moped: true,
                    battery: true,
                },
            }),
            products: Shared::new(products),
            financials: Shared::new(default_financials()),
        }
    }
}

impl Default for BusinessPlan {
    fn default() -> Self {
        Self::default_with_rng(&mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{check_schema, ActorRole, Year};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn default_plan_shape() {
        let plan = BusinessPlan::default();
        assert_eq!(plan.actor(ActorRole::Assembly).name, "Ertug");
        assert_eq!(plan.suppliers.len(), 5);
        assert_eq!(plan.supplier(4).unwrap().name, "Zhizhu");
        assert_eq!(plan.products.len(), 4);
        assert_eq!(plan.diagram_config.fiyuu_from_suppliers.as_slice(), &[4]);
        check_schema(&plan.financials).unwrap();
        assert_eq!(
            plan.financials
                .value(Entity::FiyuuSwap, Metric::NetSales, Year::Y2028),
            d(1_119_787_200)
        );
    }

    #[test]
    fn product_ids_are_unique_and_seedable() {
        let a = BusinessPlan::default_with_rng(&mut ChaCha8Rng::seed_from_u64(1));
        let b = BusinessPlan::default_with_rng(&mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(a, b);
        let mut ids: Vec<_> = a.products.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(a.product(&a.products[2].id).is_some());
    }
}
