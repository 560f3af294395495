use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::{BBox, Point};
use crate::layer::Layer;
use crate::shape::{Shape, ShapeId};

/// One indexed shape: its id, its position in the layer's paint order and its
/// world bounds.
#[derive(Debug, Clone)]
pub struct ShapeEntry {
    pub id: ShapeId,
    pub z: usize,
    pub bounds: BBox,
}

impl RTreeObject for ShapeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        to_envelope(&self.bounds)
    }
}

fn to_envelope(b: &BBox) -> AABB<[f64; 2]> {
    AABB::from_corners([b.min.x, b.min.y], [b.max.x, b.max.y])
}

/// R-tree over the shapes of a single layer, for picks and marquee queries.
pub struct SpatialIndex {
    tree: RTree<ShapeEntry>,
}

impl SpatialIndex {
    /// Index every shape of `layer` for which `bounds` yields a box. Shapes
    /// without bounds (too few points) are left out.
    pub fn for_layer<F>(layer: &Layer, mut bounds: F) -> Self
    where
        F: FnMut(&Shape) -> Option<BBox>,
    {
        let entries = layer
            .shapes
            .iter()
            .enumerate()
            .filter_map(|(z, shape)| {
                bounds(shape).map(|b| ShapeEntry {
                    id: shape.id.clone(),
                    z,
                    bounds: b,
                })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Entries whose bounds come within `tolerance` of `point`, top-most first.
    pub fn near(&self, point: Point, tolerance: f64) -> Vec<&ShapeEntry> {
        let around = BBox::new(point, point).expand(tolerance);
        let mut hits = self.within(&around);
        hits.reverse();
        hits
    }

    /// Entries whose bounds intersect `region`, in paint order.
    pub fn within(&self, region: &BBox) -> Vec<&ShapeEntry> {
        let mut hits: Vec<&ShapeEntry> = self
            .tree
            .locate_in_envelope_intersecting(&to_envelope(region))
            .collect();
        hits.sort_by_key(|e| e.z);
        hits
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;

    fn layer_with(rects: &[(f64, f64, f64, f64)]) -> Layer {
        let mut layer = Layer::new("Layer 1");
        for &(x1, y1, x2, y2) in rects {
            layer.add_shape(Shape::new(
                ShapeKind::Rect,
                vec![Point::new(x1, y1), Point::new(x2, y2)],
                "#FFFFFF",
                1,
            ));
        }
        layer
    }

    #[test]
    fn test_within_returns_paint_order() {
        let layer = layer_with(&[(20.0, 20.0, 30.0, 30.0), (0.0, 0.0, 10.0, 10.0)]);
        let index = SpatialIndex::for_layer(&layer, Shape::point_bounds);
        assert_eq!(index.len(), 2);

        let region = BBox::new(Point::new(-5.0, -5.0), Point::new(25.0, 25.0));
        let hits = index.within(&region);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, layer.shapes[0].id);
        assert_eq!(hits[1].id, layer.shapes[1].id);
    }

    #[test]
    fn test_near_prefers_top_most() {
        let layer = layer_with(&[(0.0, 0.0, 10.0, 10.0), (5.0, 5.0, 15.0, 15.0)]);
        let index = SpatialIndex::for_layer(&layer, Shape::point_bounds);
        let hits = index.near(Point::new(7.0, 7.0), 0.5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].z, 1);
        assert!(index.near(Point::new(40.0, 40.0), 2.0).is_empty());
    }

    #[test]
    fn test_degenerate_bounds_are_indexed() {
        // Horizontal lines have zero height.
        let layer = layer_with(&[(0.0, 5.0, 10.0, 5.0)]);
        let index = SpatialIndex::for_layer(&layer, Shape::point_bounds);
        let region = BBox::new(Point::new(4.0, 4.0), Point::new(6.0, 6.0));
        assert_eq!(index.within(&region).len(), 1);
    }

    #[test]
    fn test_shapes_without_bounds_skipped() {
        let mut layer = Layer::new("Layer 1");
        layer.add_shape(Shape::new(ShapeKind::Poly, Vec::new(), "#FFFFFF", 1));
        let index = SpatialIndex::for_layer(&layer, Shape::point_bounds);
        assert!(index.is_empty());
    }
}
