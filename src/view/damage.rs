//! Damage propagation from views to outputs
//!
//! View damage is expressed in view-local coordinates. Each output that a
//! view touches receives its own translated copy in that output's local
//! space; the caller's region is never modified.

use log::trace;

use crate::geometry::{Point, Rectangle};
use crate::output::{OutputId, OutputLayout};
use crate::region::Region;

use super::View;

/// Outputs under the four corners of `geo`, de-duplicated
///
/// Corners are probed at the last pixel inside the view, so a view filling
/// or touching the far edge of an output stays on that output. At most four
/// outputs are returned, in top-left, top-right, bottom-left, bottom-right
/// order of first appearance.
pub fn affected_outputs(geo: Rectangle, layout: &OutputLayout) -> Vec<OutputId> {
    let last_x = geo.right().saturating_sub(1).max(geo.x);
    let last_y = geo.bottom().saturating_sub(1).max(geo.y);
    let corners = [
        Point::new(geo.x, geo.y),
        Point::new(last_x, geo.y),
        Point::new(geo.x, last_y),
        Point::new(last_x, last_y),
    ];

    let mut outputs: Vec<OutputId> = Vec::with_capacity(corners.len());
    for corner in corners {
        if let Some(output) = layout.output_at(corner.x, corner.y) {
            if !outputs.contains(&output) {
                outputs.push(output);
            }
        }
    }
    outputs
}

impl View {
    /// Damages part of the view, or all of it when `damage` is `None`
    ///
    /// `damage` is in view-local coordinates. No-op while the backend has no
    /// live surface.
    pub fn damage(&self, layout: &mut OutputLayout, damage: Option<&Region>) {
        if self.surface.current_surface().is_none() {
            return;
        }

        for output in affected_outputs(self.geo, layout) {
            let Some(output_box) = layout.output_box(output) else {
                continue;
            };
            let view_output_geo = self.geo.translated(-output_box.x, -output_box.y);

            let output_damage = match damage {
                Some(region) => region.translated(view_output_geo.x, view_output_geo.y),
                None => Region::from_rect(view_output_geo),
            };

            trace!(
                "View {} damages {} with {:?}",
                self.id,
                output,
                output_damage.rects()
            );
            if let Some(output) = layout.output_mut(output) {
                output.add_damage(&output_damage);
            }
        }
    }

    /// Damages the view's whole bounding box on every output it touches
    pub fn damage_whole(&self, layout: &mut OutputLayout) {
        self.damage(layout, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DamageConfig;
    use crate::headless::{HeadlessXdgToplevel, HeadlessXwaylandSurface};
    use crate::policy::WindowId;
    use crate::surface::{SurfaceId, ViewSurface};

    fn quad_layout() -> (OutputLayout, [OutputId; 4]) {
        let config = DamageConfig {
            merge_on_drain: false,
            ..DamageConfig::default()
        };
        let mut layout = OutputLayout::new(&config);
        let ids = [
            layout.add_output("TL", Rectangle::new(0, 0, 1000, 1000)),
            layout.add_output("TR", Rectangle::new(1000, 0, 1000, 1000)),
            layout.add_output("BL", Rectangle::new(0, 1000, 1000, 1000)),
            layout.add_output("BR", Rectangle::new(1000, 1000, 1000, 1000)),
        ];
        (layout, ids)
    }

    fn view_at(geo: Rectangle) -> View {
        let xdg = HeadlessXdgToplevel::new(SurfaceId(1), geo.size());
        let mut view = View::new(WindowId(1), ViewSurface::xdg(xdg));
        view.adopt_geometry(geo);
        view.set_mapped(true);
        view
    }

    #[test]
    fn test_view_inside_one_output() {
        let (layout, ids) = quad_layout();
        let outputs = affected_outputs(Rectangle::new(100, 100, 200, 200), &layout);
        assert_eq!(outputs, vec![ids[0]]);
    }

    #[test]
    fn test_view_filling_one_output() {
        let (layout, ids) = quad_layout();
        let outputs = affected_outputs(Rectangle::new(0, 0, 1000, 1000), &layout);
        assert_eq!(outputs, vec![ids[0]]);

        let outputs = affected_outputs(Rectangle::new(1000, 1000, 1000, 1000), &layout);
        assert_eq!(outputs, vec![ids[3]]);
    }

    #[test]
    fn test_view_flush_against_far_edges() {
        let (layout, ids) = quad_layout();
        let outputs = affected_outputs(Rectangle::new(800, 800, 200, 200), &layout);
        assert_eq!(outputs, vec![ids[0]]);

        // One pixel further crosses into every neighbour
        let outputs = affected_outputs(Rectangle::new(801, 801, 200, 200), &layout);
        assert_eq!(outputs, ids.to_vec());
    }

    #[test]
    fn test_zero_size_view_probes_its_origin() {
        let (layout, ids) = quad_layout();
        let outputs = affected_outputs(Rectangle::new(1000, 0, 0, 0), &layout);
        assert_eq!(outputs, vec![ids[1]]);
    }

    #[test]
    fn test_view_spanning_two_outputs() {
        let (layout, ids) = quad_layout();
        let outputs = affected_outputs(Rectangle::new(900, 100, 200, 200), &layout);
        assert_eq!(outputs, vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_view_spanning_all_four_outputs() {
        let (layout, ids) = quad_layout();
        let outputs = affected_outputs(Rectangle::new(900, 900, 200, 200), &layout);
        assert_eq!(outputs, ids.to_vec());
    }

    #[test]
    fn test_view_off_layout() {
        let (layout, _) = quad_layout();
        assert!(affected_outputs(Rectangle::new(-500, -500, 100, 100), &layout).is_empty());
    }

    #[test]
    fn test_region_damage_is_output_local_per_output() {
        let (mut layout, ids) = quad_layout();
        let view = view_at(Rectangle::new(900, 100, 200, 200));
        let region = Region::from_rect(Rectangle::new(50, 10, 100, 20));

        view.damage(&mut layout, Some(&region));

        assert_eq!(region.rects(), &[Rectangle::new(50, 10, 100, 20)]);
        assert_eq!(
            layout.output(ids[0]).unwrap().damage().pending(),
            &[Rectangle::new(950, 110, 50, 20)]
        );
        assert_eq!(
            layout.output(ids[1]).unwrap().damage().pending(),
            &[Rectangle::new(0, 110, 50, 20)]
        );
    }

    #[test]
    fn test_whole_damage_uses_view_box() {
        let (mut layout, ids) = quad_layout();
        let view = view_at(Rectangle::new(1100, 1200, 300, 100));

        view.damage_whole(&mut layout);

        assert_eq!(
            layout.output(ids[3]).unwrap().damage().pending(),
            &[Rectangle::new(100, 200, 300, 100)]
        );
        assert!(!layout.output(ids[0]).unwrap().frame_pending());
    }

    #[test]
    fn test_surfaceless_view_damages_nothing() {
        let (mut layout, _) = quad_layout();
        let x11 = HeadlessXwaylandSurface::new(None, Rectangle::new(0, 0, 100, 100));
        let mut view = View::new(WindowId(2), ViewSurface::xwayland(x11));
        view.adopt_geometry(Rectangle::new(0, 0, 100, 100));

        view.damage_whole(&mut layout);

        assert!(layout.outputs().all(|o| !o.frame_pending()));
    }
}
