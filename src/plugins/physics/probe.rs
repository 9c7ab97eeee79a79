//! Ground, ceiling and line-of-sight probes.
//!
//! Gameplay never talks to `SpatialQuery` directly. It goes through [`WorldProbe`], which keeps
//! the probing rules (multi-point ground rays, ceiling overlap box, terrain-only sight lines)
//! testable against a fake world. Every probe degrades to "no contact" when no spatial index
//! is available.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;

/// Read-only spatial queries against the current tick's settled world.
pub trait WorldProbe {
    /// First standable collider hit by a downward ray, ignoring `exclude`.
    fn ground_below(&self, origin: Vec2, max_distance: f32, exclude: &[Entity]) -> Option<Entity>;

    /// Whether a solid collider (terrain only, never one-way platforms or water) overlaps the
    /// axis-aligned box.
    fn solid_overlap(&self, center: Vec2, size: Vec2, exclude: &[Entity]) -> bool;

    /// Whether the straight segment is free of terrain.
    fn line_clear(&self, from: Vec2, to: Vec2) -> bool;
}

/// [`WorldProbe`] backed by avian's spatial query pipeline.
pub struct AvianProbe<'a, 'w, 's> {
    spatial: &'a SpatialQuery<'w, 's>,
}

impl<'a, 'w, 's> AvianProbe<'a, 'w, 's> {
    pub fn new(spatial: &'a SpatialQuery<'w, 's>) -> Self {
        Self { spatial }
    }
}

impl WorldProbe for AvianProbe<'_, '_, '_> {
    fn ground_below(&self, origin: Vec2, max_distance: f32, exclude: &[Entity]) -> Option<Entity> {
        let filter = SpatialQueryFilter::from_mask(Layer::STANDABLE)
            .with_excluded_entities(exclude.iter().copied());
        // Solid: a probe that starts inside the surface counts as touching it.
        self.spatial
            .cast_ray(origin, Dir2::NEG_Y, max_distance, true, &filter)
            .map(|hit| hit.entity)
    }

    fn solid_overlap(&self, center: Vec2, size: Vec2, exclude: &[Entity]) -> bool {
        let shape = Collider::rectangle(size.x, size.y);
        let filter = SpatialQueryFilter::from_mask(Layer::Ground)
            .with_excluded_entities(exclude.iter().copied());
        !self
            .spatial
            .shape_intersections(&shape, center, 0.0, &filter)
            .is_empty()
    }

    fn line_clear(&self, from: Vec2, to: Vec2) -> bool {
        let delta = to - from;
        let Ok(dir) = Dir2::new(delta) else {
            return true;
        };
        let filter = SpatialQueryFilter::from_mask(Layer::Ground);
        self.spatial
            .cast_ray(from, dir, delta.length(), true, &filter)
            .is_none()
    }
}

/// Left, centre and right probe origins just under a body's footprint.
pub fn ground_probe_origins(center: Vec2, size: Vec2, spread: f32, skin: f32) -> [Vec2; 3] {
    let y = center.y - size.y * 0.5 - skin;
    let dx = size.x * spread;
    [
        Vec2::new(center.x - dx, y),
        Vec2::new(center.x, y),
        Vec2::new(center.x + dx, y),
    ]
}

/// Returns the surface under the first probe that hits, if any.
pub fn is_grounded_at<P: WorldProbe>(
    probe: Option<&P>,
    origins: &[Vec2],
    max_distance: f32,
    exclude: &[Entity],
) -> Option<Entity> {
    let probe = probe?;
    origins
        .iter()
        .find_map(|o| probe.ground_below(*o, max_distance, exclude))
}

/// Whether the body is already inside solid terrain (so jumping would push it into a ceiling).
pub fn has_overlap_above<P: WorldProbe>(
    probe: Option<&P>,
    center: Vec2,
    size: Vec2,
    scale: f32,
    exclude: &[Entity],
) -> bool {
    probe.is_some_and(|p| p.solid_overlap(center, size * scale, exclude))
}

/// Nearest candidate within `max_radius`.
///
/// Ties keep the first candidate in iteration order.
pub fn nearest_within(
    origin: Vec2,
    max_radius: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec2)>,
) -> Option<(Entity, f32)> {
    let mut best: Option<(Entity, f32)> = None;
    for (e, pos) in candidates {
        let d = origin.distance(pos);
        if d > max_radius {
            continue;
        }
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((e, d));
        }
    }
    best
}

#[cfg(test)]
pub mod testing {
    //! Axis-aligned box world for probe consumers' tests.

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum BoxKind {
        Ground,
        OneWay,
        Water,
    }

    #[derive(Default)]
    pub struct BoxWorld {
        pub boxes: Vec<(Entity, Rect, BoxKind)>,
    }

    impl BoxWorld {
        pub fn with(mut self, e: Entity, center: Vec2, size: Vec2, kind: BoxKind) -> Self {
            self.boxes.push((e, Rect::from_center_size(center, size), kind));
            self
        }
    }

    impl WorldProbe for BoxWorld {
        fn ground_below(&self, origin: Vec2, max_distance: f32, exclude: &[Entity]) -> Option<Entity> {
            self.boxes
                .iter()
                .filter(|(e, _, k)| *k != BoxKind::Water && !exclude.contains(e))
                .filter(|(_, r, _)| origin.x >= r.min.x && origin.x <= r.max.x)
                .filter(|(_, r, _)| origin.y >= r.min.y && origin.y - r.max.y <= max_distance)
                .map(|(e, _, _)| *e)
                .next()
        }

        fn solid_overlap(&self, center: Vec2, size: Vec2, exclude: &[Entity]) -> bool {
            let probe = Rect::from_center_size(center, size);
            self.boxes.iter().any(|(e, r, k)| {
                *k == BoxKind::Ground && !exclude.contains(e) && !r.intersect(probe).is_empty()
            })
        }

        fn line_clear(&self, from: Vec2, to: Vec2) -> bool {
            // Coarse march is enough for unit-sized test boxes.
            let steps = 64;
            !(0..=steps).any(|i| {
                let p = from.lerp(to, i as f32 / steps as f32);
                self.boxes
                    .iter()
                    .any(|(_, r, k)| *k == BoxKind::Ground && r.contains(p))
            })
        }
    }
}
