//! Fixed-band geometry of the flow diagram.

use serde::{Deserialize, Serialize};

/// A point in canvas units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box, origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.center_x(), self.y)
    }

    pub fn bottom_center(&self) -> Point {
        Point::new(self.center_x(), self.bottom())
    }
}

/// Layout constants. The defaults give the standard 720 unit tall canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub height: f64,
    pub min_width: f64,
    /// Inset of the outer frame from the canvas edge.
    pub frame_inset: f64,
    pub margin_x: f64,
    pub supplier_width: f64,
    pub supplier_height: f64,
    /// Horizontal distance between the left edges of adjacent suppliers.
    pub supplier_step: f64,
    pub supplier_y: f64,
    pub actor_width: f64,
    pub ata_y: f64,
    pub ata_height: f64,
    pub ertug_y: f64,
    pub ertug_height: f64,
    pub fiyuu_y: f64,
    pub fiyuu_height: f64,
    pub end_user_y: f64,
    pub end_user_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            height: 720.0,
            min_width: 1200.0,
            frame_inset: 20.0,
            margin_x: 60.0,
            supplier_width: 200.0,
            supplier_height: 70.0,
            supplier_step: 210.0,
            supplier_y: 190.0,
            actor_width: 200.0,
            ata_y: 70.0,
            ata_height: 70.0,
            ertug_y: 340.0,
            ertug_height: 80.0,
            fiyuu_y: 500.0,
            fiyuu_height: 80.0,
            end_user_y: 620.0,
            end_user_height: 70.0,
        }
    }
}

impl LayoutConfig {
    /// Canvas width for `supplier_count` suppliers, never below `min_width`.
    pub fn width_for(&self, supplier_count: usize) -> f64 {
        let gaps = supplier_count.saturating_sub(1) as f64;
        let needed = self.margin_x * 2.0 + gaps * self.supplier_step + self.supplier_width;
        needed.max(self.min_width)
    }
}

/// Positions of every box for a given supplier count.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    pub frame: Rect,
    pub ata: Rect,
    pub suppliers: Vec<Rect>,
    pub ertug: Rect,
    pub fiyuu: Rect,
    pub end_user: Rect,
}

/// Geometry with the default constants.
pub fn layout(supplier_count: usize) -> Geometry {
    layout_with(&LayoutConfig::default(), supplier_count)
}

pub fn layout_with(cfg: &LayoutConfig, supplier_count: usize) -> Geometry {
    let width = cfg.width_for(supplier_count);
    let inset = cfg.frame_inset;
    let actor_x = (width - cfg.actor_width) / 2.0;
    let actor = |y: f64, h: f64| Rect::new(actor_x, y, cfg.actor_width, h);

    let suppliers = (0..supplier_count)
        .map(|i| {
            Rect::new(
                cfg.margin_x + i as f64 * cfg.supplier_step,
                cfg.supplier_y,
                cfg.supplier_width,
                cfg.supplier_height,
            )
        })
        .collect();

    Geometry {
        width,
        height: cfg.height,
        frame: Rect::new(inset, inset, width - inset * 2.0, cfg.height - inset * 2.0),
        ata: actor(cfg.ata_y, cfg.ata_height),
        suppliers,
        ertug: actor(cfg.ertug_y, cfg.ertug_height),
        fiyuu: actor(cfg.fiyuu_y, cfg.fiyuu_height),
        end_user: actor(cfg.end_user_y, cfg.end_user_height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn small_rows_use_minimum_width() {
        assert_eq!(layout(0).width, 1200.0);
        assert_eq!(layout(1).width, 1200.0);
        assert_eq!(layout(5).width, 1200.0);
        // 60 * 2 + 5 * 210 + 200
        assert_eq!(layout(6).width, 1370.0);
    }

    #[test]
    fn bands_are_ordered_top_to_bottom() {
        let g = layout(3);
        assert_eq!(g.height, 720.0);
        assert!(g.ata.bottom() <= g.suppliers[0].y);
        assert!(g.suppliers[0].bottom() <= g.ertug.y);
        assert!(g.ertug.bottom() <= g.fiyuu.y);
        assert!(g.fiyuu.bottom() <= g.end_user.y);
        assert!(g.end_user.bottom() <= g.height);
    }

    #[test]
    fn actors_are_centered() {
        let g = layout(8);
        for r in [g.ata, g.ertug, g.fiyuu, g.end_user] {
            assert_eq!(r.center_x(), g.width / 2.0);
        }
        // 1790 wide: (1790 - 200) / 2
        assert_eq!(g.ata, Rect::new(795.0, 70.0, 200.0, 70.0));
        assert_eq!(layout(5).ata, Rect::new(500.0, 70.0, 200.0, 70.0));
        assert_eq!(layout(0).frame, Rect::new(20.0, 20.0, 1160.0, 680.0));
    }

    #[test]
    fn suppliers_step_left_to_right() {
        let g = layout(3);
        let xs: Vec<f64> = g.suppliers.iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![60.0, 270.0, 480.0]);
        assert!(g.suppliers.iter().all(|r| r.y == 190.0));
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let cfg: LayoutConfig =
            serde_json::from_str(r#"{"height": 800, "margin_x": 80}"#).unwrap();
        assert_eq!(cfg.height, 800.0);
        assert_eq!(cfg.min_width, 1200.0);
        let g = layout_with(&cfg, 2);
        assert_eq!(g.height, 800.0);
        assert_eq!(g.suppliers[1].x, 290.0);
    }

    proptest! {
        #[test]
        fn width_is_monotonic_and_prefix_stable(n1 in 0usize..40, extra in 0usize..40) {
            let n2 = n1 + extra;
            let a = layout(n1);
            let b = layout(n2);
            prop_assert!(b.width >= a.width);
            prop_assert!(a.width >= 1200.0);
            prop_assert_eq!(&a.suppliers[..], &b.suppliers[..n1]);
        }

        #[test]
        fn layout_is_deterministic(n in 0usize..64) {
            prop_assert_eq!(layout(n), layout(n));
        }
    }
}
