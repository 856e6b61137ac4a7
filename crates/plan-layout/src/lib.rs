#![deny(warnings)]

//! Flow diagram layout for the business plan.
//!
//! The diagram is a fixed vertical pipeline: supply actor, supplier row,
//! assembly actor, sales actor, end user. Only the supplier row varies in
//! length; the canvas widens with it but never drops below the minimum
//! width. Edges are derived from the plan's [`plan_core::DiagramConfig`].
//!
//! All functions here are pure: the same input always yields the same
//! geometry, so callers may cache by snapshot identity.

mod diagram;
mod geometry;

pub use diagram::{
    build_diagram, build_diagram_with, derive_edges, end_user_label, Diagram, DiagramInput,
    Edge, EdgeKind, Label, Legend, LegendEntry, NodeBox, NodeId, TextAnchor, ADVISORY_LABEL,
    BATTERY_LABEL, MOPED_LABEL,
};
pub use geometry::{layout, layout_with, Geometry, LayoutConfig, Point, Rect};

#[cfg(test)]
mod tests {
    use super::*;
    use plan_core::{ActorRole, BusinessPlan, DiagramConfig, EndUser, EndUserFlow, Shared, Supplier};
    use plan_store::{apply_path_update, remove_supplier};
    use proptest::prelude::*;
    use serde_json::json;

    fn with_config(supplier_count: usize, cfg: DiagramConfig) -> BusinessPlan {
        let mut plan = BusinessPlan::default();
        let mut suppliers = plan.suppliers.as_ref().clone();
        suppliers.truncate(supplier_count);
        plan.suppliers = suppliers.into();
        plan.diagram_config = cfg.into();
        plan
    }

    const ASSEMBLY: NodeId = NodeId::Actor(ActorRole::Assembly);
    const SALES: NodeId = NodeId::Actor(ActorRole::Sales);

    #[test]
    fn edge_gating_scenario() {
        let cfg = DiagramConfig {
            ata_to_suppliers: vec![0].into(),
            ertug_from_suppliers: vec![0, 1].into(),
            fiyuu_from_suppliers: vec![1].into(),
            fiyuu_from_ertug: true,
            end_user_from_fiyuu: EndUserFlow {
                moped: true,
                battery: false,
            },
        };
        let d = build_diagram(&with_config(2, cfg));
        let summary: Vec<(EdgeKind, NodeId, Option<NodeId>, Option<&str>)> = d
            .edges
            .iter()
            .map(|e| {
                (
                    e.kind,
                    e.source,
                    e.target,
                    e.label.as_ref().map(|l| l.text.as_str()),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (EdgeKind::Dashed, NodeId::Supplier(0), None, Some(ADVISORY_LABEL)),
                (EdgeKind::Solid, NodeId::Supplier(0), Some(ASSEMBLY), None),
                (EdgeKind::Solid, NodeId::Supplier(1), Some(ASSEMBLY), None),
                (EdgeKind::Solid, NodeId::Supplier(1), Some(SALES), None),
                (EdgeKind::Solid, ASSEMBLY, Some(SALES), Some("E\u{2011}moped")),
                (EdgeKind::Solid, SALES, Some(NodeId::EndUser), Some("E\u{2011}moped")),
            ]
        );
    }

    #[test]
    fn edge_anchors() {
        let cfg = DiagramConfig {
            ata_to_suppliers: vec![1].into(),
            ertug_from_suppliers: vec![1].into(),
            ..DiagramConfig::default()
        };
        let d = build_diagram(&with_config(2, cfg));
        let g = layout(2);
        let stub = &d.edges[0];
        assert_eq!(stub.from, Point::new(370.0, 182.0));
        assert_eq!(stub.to, Point::new(370.0, 158.0));
        assert_eq!(stub.label.as_ref().unwrap().at, Point::new(370.0, 150.0));
        let buy = &d.edges[1];
        assert_eq!(buy.from, g.suppliers[1].bottom_center());
        assert_eq!(buy.to, g.ertug.top_center());
        assert_eq!(d.edges.len(), 2);
    }

    #[test]
    fn stale_indices_are_ignored() {
        let cfg = DiagramConfig {
            ertug_from_suppliers: vec![0, 5].into(),
            ..DiagramConfig::default()
        };
        let d = build_diagram(&with_config(1, cfg));
        assert_eq!(d.edges.len(), 1);
        assert_eq!(d.edges[0].source, NodeId::Supplier(0));
    }

    #[test]
    fn removing_a_supplier_drops_edges_past_the_end() {
        let plan = BusinessPlan::default();
        // Zhizhu (4) feeds the sales actor; after removing 0 index 4 is stale
        let next = remove_supplier(&plan, 0);
        let d = build_diagram(&next);
        assert!(d
            .edges
            .iter()
            .all(|e| e.source != NodeId::Supplier(4)));
        assert!(!d
            .edges
            .iter()
            .any(|e| matches!(e.source, NodeId::Supplier(_)) && e.target == Some(SALES)));
    }

    #[test]
    fn end_user_label_joins_flows() {
        let mut cfg = DiagramConfig::default();
        assert_eq!(end_user_label(&cfg), None);
        cfg.end_user_from_fiyuu.battery = true;
        assert_eq!(end_user_label(&cfg).as_deref(), Some("Batarya"));
        cfg.end_user_from_fiyuu.moped = true;
        assert_eq!(
            end_user_label(&cfg).as_deref(),
            Some("E\u{2011}moped + Batarya")
        );

        let d = build_diagram(&with_config(0, DiagramConfig::default()));
        assert!(d.edges.is_empty());
    }

    #[test]
    fn default_plan_diagram() {
        let d = build_diagram(&BusinessPlan::default());
        // 5 stubs, 4 to assembly, 1 to sales, assembly->sales, sales->end user
        assert_eq!(d.edges.len(), 12);
        assert_eq!(d.boxes.len(), 9);
        assert_eq!(d.width, 1200.0);
        assert_eq!(d.boxes[0].title, "AtaBridge");
        assert_eq!(d.node(NodeId::Supplier(4)).unwrap().title, "Zhizhu");
        assert_eq!(d.node(NodeId::EndUser).unwrap().title, "Kurye");
        assert_eq!(d.band_labels[0].at, Point::new(40.0, 60.0));
        assert_eq!(d.band_labels[2].at, Point::new(40.0, 380.0));
        assert_eq!(d.legend.rect, Rect::new(960.0, 590.0, 200.0, 90.0));
        assert_eq!(d.legend.entries[1].kind, EdgeKind::Dashed);
    }

    #[test]
    fn empty_names_fall_back() {
        let plan = BusinessPlan::default();
        let plan = apply_path_update(&plan, "actors.1.name", json!("")).unwrap();
        let plan = apply_path_update(&plan, "endUser.name", json!("")).unwrap();
        let plan = apply_path_update(&plan, "endUser.desc", json!(null)).unwrap();
        let d = build_diagram(&plan);
        assert_eq!(d.node(ASSEMBLY).unwrap().title, "Ertug");
        let end = d.node(NodeId::EndUser).unwrap();
        assert_eq!(end.title, "Kurye");
        assert_eq!(end.desc.as_deref(), Some("Son Kullanıcı"));
    }

    #[test]
    fn diagram_serializes_for_renderers() {
        let d = build_diagram(&BusinessPlan::default());
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["boxes"][1]["id"], json!({"kind": "supplier", "at": 0}));
        assert_eq!(v["edges"][0]["kind"], json!("dashed"));
        assert!(v.get("bandLabels").is_some());
    }

    proptest! {
        #[test]
        fn stale_entries_never_crash(n in 0usize..8, idx in proptest::collection::vec(0usize..32, 0..12)) {
            let cfg = DiagramConfig {
                ata_to_suppliers: idx.clone().into(),
                ertug_from_suppliers: idx.clone().into(),
                fiyuu_from_suppliers: idx.into(),
                ..DiagramConfig::default()
            };
            let expected = cfg.ertug_from_suppliers.iter().filter(|&i| i < n).count() * 3;
            let d = build_diagram_with(
                &LayoutConfig::default(),
                DiagramInput {
                    actors: &BusinessPlan::default().actors,
                    suppliers: &vec![Shared::new(Supplier::default()); n],
                    config: &cfg,
                    end_user: &EndUser::default(),
                },
            );
            prop_assert_eq!(d.edges.len(), expected);
        }
    }
}
