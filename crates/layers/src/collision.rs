use std::collections::HashMap;

use foundation::math::Vec2;
use foundation::{Aabb2, LatLng};
use serde::Serialize;

use crate::popup::Popup;
use crate::symbology::IconSpec;
use crate::viewport::ScreenProjector;

/// A marker candidate: where it sits and how big it draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// Index of the source feature in the owning layer.
    pub feature: usize,
    pub position: LatLng,
    pub icon: IconSpec,
    pub z_index_offset: i32,
    pub popup: Option<Popup>,
}

impl Marker {
    /// Icon box with the anchor placed on `screen`.
    pub fn screen_box(&self, screen: Vec2) -> Aabb2 {
        let anchor = self.icon.anchor_px();
        let origin = Vec2::new(screen.x - anchor[0], screen.y - anchor[1]);
        Aabb2::from_origin_size(origin, self.icon.size_px())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CollisionConfig {
    /// Extra clearance added on every side of a marker box.
    pub margin_px: f64,
    /// Broad-phase grid cell size.
    pub cell_px: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            margin_px: 0.0,
            cell_px: 64.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedMarker {
    /// Index into the desired set.
    pub index: usize,
    pub screen_px: Vec2,
    /// Margin-expanded box.
    pub bbox: Aabb2,
}

/// The visible subset of a desired marker set for one viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Placement {
    pub placed: Vec<PlacedMarker>,
}

impl Placement {
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.placed.iter().map(|p| p.index)
    }
}

// Beyond this many cells a box is checked against every placed box instead.
const MAX_CELLS_PER_BOX: i64 = 1024;

/// Greedy placement in insertion order: a marker is kept iff its expanded box
/// overlaps no box kept before it. Not an optimal packing; earlier markers
/// always win.
pub fn place<P: ScreenProjector + ?Sized>(
    markers: &[Marker],
    projector: &P,
    config: &CollisionConfig,
) -> Placement {
    let cell = if config.cell_px > 0.0 { config.cell_px } else { 64.0 };
    let mut placed: Vec<PlacedMarker> = Vec::new();
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    // Placed boxes too large for the grid.
    let mut oversized: Vec<usize> = Vec::new();

    for (index, marker) in markers.iter().enumerate() {
        let Some(screen) = projector.project(marker.position) else {
            continue;
        };
        if !screen.is_finite() {
            continue;
        }
        let bbox = marker.screen_box(screen).expanded(config.margin_px);
        if !bbox.is_finite() {
            continue;
        }

        let (min_c, max_c) = cell_range(&bbox, cell);
        let cells = (max_c.0 - min_c.0 + 1) * (max_c.1 - min_c.1 + 1);
        let in_grid = cells <= MAX_CELLS_PER_BOX;
        let collides = if in_grid {
            let hits_grid = (min_c.1..=max_c.1).any(|cy| {
                (min_c.0..=max_c.0).any(|cx| {
                    grid.get(&(cx, cy)).is_some_and(|slots| {
                        slots.iter().any(|&slot| placed[slot].bbox.intersects(&bbox))
                    })
                })
            });
            hits_grid || oversized.iter().any(|&slot| placed[slot].bbox.intersects(&bbox))
        } else {
            placed.iter().any(|p| p.bbox.intersects(&bbox))
        };
        if collides {
            continue;
        }

        let slot = placed.len();
        if in_grid {
            for cy in min_c.1..=max_c.1 {
                for cx in min_c.0..=max_c.0 {
                    grid.entry((cx, cy)).or_default().push(slot);
                }
            }
        } else {
            oversized.push(slot);
        }
        placed.push(PlacedMarker {
            index,
            screen_px: screen,
            bbox,
        });
    }

    Placement { placed }
}

fn cell_range(bbox: &Aabb2, cell: f64) -> ((i64, i64), (i64, i64)) {
    let min = (
        (bbox.min[0] / cell).floor() as i64,
        (bbox.min[1] / cell).floor() as i64,
    );
    let max = (
        (bbox.max[0] / cell).floor() as i64,
        (bbox.max[1] / cell).floor() as i64,
    );
    (min, max)
}

/// A marker group that only shows non-overlapping members.
///
/// `desired` is replaced wholesale by [`CollisionLayer::set_desired`];
/// `visible` is rebuilt from scratch by [`CollisionLayer::recompute`].
#[derive(Debug, Clone, Default)]
pub struct CollisionLayer {
    config: CollisionConfig,
    desired: Vec<Marker>,
    visible: Placement,
}

impl CollisionLayer {
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            config,
            desired: Vec::new(),
            visible: Placement::default(),
        }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Replaces the candidate set. Nothing is visible until the next recompute.
    pub fn set_desired(&mut self, markers: Vec<Marker>) {
        self.desired = markers;
        self.visible = Placement::default();
    }

    pub fn clear(&mut self) {
        self.set_desired(Vec::new());
    }

    pub fn recompute<P: ScreenProjector + ?Sized>(&mut self, projector: &P) {
        self.visible = place(&self.desired, projector, &self.config);
    }

    pub fn desired(&self) -> &[Marker] {
        &self.desired
    }

    pub fn placement(&self) -> &Placement {
        &self.visible
    }

    pub fn visible(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.visible.indices().filter_map(|i| self.desired.get(i))
    }
}
