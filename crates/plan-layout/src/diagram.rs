//! Boxes, edges and annotations of the flow diagram.

use crate::geometry::{layout_with, Geometry, LayoutConfig, Point, Rect};
use plan_core::{Actor, ActorRole, BusinessPlan, DiagramConfig, EndUser, Shared, Supplier};
use serde::Serialize;
use tracing::trace;

pub const MOPED_LABEL: &str = "E\u{2011}moped";
pub const BATTERY_LABEL: &str = "Batarya";
pub const ADVISORY_LABEL: &str = "Bağlantı";

const END_USER_FALLBACK_NAME: &str = "Kurye";
const END_USER_FALLBACK_DESC: &str = "Son Kullanıcı";
const BAND_LABEL_X: f64 = 40.0;
const BAND_LABEL_DY: f64 = 40.0;
// advisory stub above a supplier box
const STUB_GAP: f64 = 8.0;
const STUB_LENGTH: f64 = 24.0;
const STUB_LABEL_DY: f64 = 40.0;

/// Which box a node or edge end belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "at")]
pub enum NodeId {
    Actor(ActorRole),
    Supplier(usize),
    EndUser,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeBox {
    pub id: NodeId,
    pub rect: Rect,
    pub title: String,
    pub desc: Option<String>,
}

/// Solid edges are purchases or product flow, dashed ones are advisory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    Solid,
    Dashed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAnchor {
    Start,
    Middle,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub at: Point,
    pub anchor: TextAnchor,
}

impl Label {
    fn new(text: impl Into<String>, at: Point, anchor: TextAnchor) -> Self {
        Self {
            text: text.into(),
            at,
            anchor,
        }
    }
}

/// A directed line. `target` is `None` for the advisory stubs, which stand
/// alone above their supplier.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub kind: EdgeKind,
    pub source: NodeId,
    pub target: Option<NodeId>,
    pub from: Point,
    pub to: Point,
    pub label: Option<Label>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegendEntry {
    pub kind: EdgeKind,
    pub from: Point,
    pub to: Point,
    pub label: Label,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Legend {
    pub rect: Rect,
    pub title: Label,
    pub entries: Vec<LegendEntry>,
}

/// Everything the renderer paints.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub width: f64,
    pub height: f64,
    pub frame: Rect,
    pub boxes: Vec<NodeBox>,
    pub edges: Vec<Edge>,
    pub band_labels: Vec<Label>,
    pub legend: Legend,
}

impl Diagram {
    pub fn node(&self, id: NodeId) -> Option<&NodeBox> {
        self.boxes.iter().find(|b| b.id == id)
    }
}

/// The parts of a plan the diagram reads.
#[derive(Clone, Copy, Debug)]
pub struct DiagramInput<'a> {
    pub actors: &'a [Shared<Actor>; 3],
    pub suppliers: &'a [Shared<Supplier>],
    pub config: &'a DiagramConfig,
    pub end_user: &'a EndUser,
}

impl<'a> From<&'a BusinessPlan> for DiagramInput<'a> {
    fn from(plan: &'a BusinessPlan) -> Self {
        Self {
            actors: &plan.actors,
            suppliers: &plan.suppliers,
            config: &plan.diagram_config,
            end_user: &plan.end_user,
        }
    }
}

/// Diagram of `plan` with the default constants.
pub fn build_diagram(plan: &BusinessPlan) -> Diagram {
    build_diagram_with(&LayoutConfig::default(), plan.into())
}

pub fn build_diagram_with(cfg: &LayoutConfig, input: DiagramInput<'_>) -> Diagram {
    let geom = layout_with(cfg, input.suppliers.len());
    let boxes = boxes(&geom, &input);
    let edges = derive_edges(&geom, input.config);
    trace!(
        suppliers = input.suppliers.len(),
        edges = edges.len(),
        width = geom.width,
        "diagram laid out"
    );
    Diagram {
        width: geom.width,
        height: geom.height,
        frame: geom.frame,
        band_labels: band_labels(cfg, &geom),
        legend: legend(&geom.frame),
        boxes,
        edges,
    }
}

fn actor_box(role: ActorRole, rect: Rect, actor: &Actor) -> NodeBox {
    let title = if actor.name.is_empty() {
        role.fallback_name().to_string()
    } else {
        actor.name.clone()
    };
    NodeBox {
        id: NodeId::Actor(role),
        rect,
        title,
        desc: actor.desc.clone().filter(|d| !d.is_empty()),
    }
}

fn boxes(geom: &Geometry, input: &DiagramInput<'_>) -> Vec<NodeBox> {
    let actor = |role: ActorRole| input.actors[role.index()].as_ref();
    let mut out = Vec::with_capacity(input.suppliers.len() + 4);
    out.push(actor_box(ActorRole::Supply, geom.ata, actor(ActorRole::Supply)));
    for (i, (rect, s)) in geom.suppliers.iter().zip(input.suppliers).enumerate() {
        out.push(NodeBox {
            id: NodeId::Supplier(i),
            rect: *rect,
            title: s.name.clone(),
            desc: s.desc.clone().filter(|d| !d.is_empty()),
        });
    }
    out.push(actor_box(ActorRole::Assembly, geom.ertug, actor(ActorRole::Assembly)));
    out.push(actor_box(ActorRole::Sales, geom.fiyuu, actor(ActorRole::Sales)));

    let end_user = input.end_user;
    out.push(NodeBox {
        id: NodeId::EndUser,
        rect: geom.end_user,
        title: if end_user.name.is_empty() {
            END_USER_FALLBACK_NAME.to_string()
        } else {
            end_user.name.clone()
        },
        desc: Some(
            end_user
                .desc
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| END_USER_FALLBACK_DESC.to_string()),
        ),
    });
    out
}

/// Label on the sales → end user edge, e.g. `E‑moped + Batarya`.
pub fn end_user_label(config: &DiagramConfig) -> Option<String> {
    let flow = config.end_user_from_fiyuu;
    let parts: Vec<&str> = [(flow.moped, MOPED_LABEL), (flow.battery, BATTERY_LABEL)]
        .into_iter()
        .filter_map(|(on, text)| on.then_some(text))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" + "))
    }
}

/// Edges implied by `config`.
///
/// Only positions that exist in the supplier row are tested against the
/// relation sets, so stale or out-of-range entries never produce an edge.
pub fn derive_edges(geom: &Geometry, config: &DiagramConfig) -> Vec<Edge> {
    let mut edges = Vec::new();
    let ertug = NodeId::Actor(ActorRole::Assembly);
    let fiyuu = NodeId::Actor(ActorRole::Sales);

    for (i, rect) in geom.suppliers.iter().enumerate() {
        let source = NodeId::Supplier(i);
        let cx = rect.center_x();
        if config.ata_to_suppliers.contains(i) {
            edges.push(Edge {
                kind: EdgeKind::Dashed,
                source,
                target: None,
                from: Point::new(cx, rect.y - STUB_GAP),
                to: Point::new(cx, rect.y - STUB_GAP - STUB_LENGTH),
                label: Some(Label::new(
                    ADVISORY_LABEL,
                    Point::new(cx, rect.y - STUB_LABEL_DY),
                    TextAnchor::Middle,
                )),
            });
        }
        if config.ertug_from_suppliers.contains(i) {
            edges.push(solid(source, ertug, rect.bottom_center(), geom.ertug.top_center()));
        }
        if config.fiyuu_from_suppliers.contains(i) {
            edges.push(solid(source, fiyuu, rect.bottom_center(), geom.fiyuu.top_center()));
        }
    }

    if config.fiyuu_from_ertug {
        let mut e = solid(ertug, fiyuu, geom.ertug.bottom_center(), geom.fiyuu.top_center());
        e.label = Some(Label::new(
            MOPED_LABEL,
            Point::new(geom.fiyuu.center_x() + 6.0, geom.fiyuu.y - 8.0),
            TextAnchor::Start,
        ));
        edges.push(e);
    }

    if config.end_user_from_fiyuu.any() {
        let mut e = solid(
            fiyuu,
            NodeId::EndUser,
            geom.fiyuu.bottom_center(),
            geom.end_user.top_center(),
        );
        e.label = end_user_label(config).map(|text| {
            Label::new(
                text,
                Point::new(geom.fiyuu.center_x(), geom.fiyuu.bottom() + 20.0),
                TextAnchor::Middle,
            )
        });
        edges.push(e);
    }
    edges
}

fn solid(source: NodeId, target: NodeId, from: Point, to: Point) -> Edge {
    Edge {
        kind: EdgeKind::Solid,
        source,
        target: Some(target),
        from,
        to,
        label: None,
    }
}

fn band_labels(cfg: &LayoutConfig, geom: &Geometry) -> Vec<Label> {
    let at = |y: f64| Point::new(BAND_LABEL_X, y);
    vec![
        Label::new(
            "Danışmanlık & Tedarikçi Bulma",
            at(geom.ata.y - 10.0),
            TextAnchor::Start,
        ),
        Label::new(
            "Tedarikçiler",
            at(cfg.supplier_y + BAND_LABEL_DY),
            TextAnchor::Start,
        ),
        Label::new(
            "Montaj & Üretim",
            at(geom.ertug.y + BAND_LABEL_DY),
            TextAnchor::Start,
        ),
        Label::new(
            "Satış & Swap Operasyonu",
            at(geom.fiyuu.y + BAND_LABEL_DY),
            TextAnchor::Start,
        ),
        Label::new(
            END_USER_FALLBACK_DESC,
            at(geom.end_user.y + BAND_LABEL_DY),
            TextAnchor::Start,
        ),
    ]
}

/// Legend anchored to the bottom-right corner of the frame.
fn legend(frame: &Rect) -> Legend {
    let right = frame.right();
    let bottom = frame.bottom();
    let sample = |kind: EdgeKind, y: f64, text: &str| LegendEntry {
        kind,
        from: Point::new(right - 200.0, y),
        to: Point::new(right - 120.0, y),
        label: Label::new(text, Point::new(right - 200.0, y + 12.0), TextAnchor::Start),
    };
    Legend {
        rect: Rect::new(right - 220.0, bottom - 110.0, 200.0, 90.0),
        title: Label::new(
            "Lejant",
            Point::new(right - 120.0, bottom - 86.0),
            TextAnchor::Middle,
        ),
        entries: vec![
            sample(EdgeKind::Solid, bottom - 64.0, "Satın Alma / Akış"),
            sample(EdgeKind::Dashed, bottom - 34.0, "Bağlantı / Danışmanlık"),
        ],
    }
}
