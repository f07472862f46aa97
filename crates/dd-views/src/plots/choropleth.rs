//! Choropleth map: regions filled by a sequential color scale

use egui::{Align2, Color32, FontId, Mesh, Pos2, Rect, Sense, Shape, Ui, Vec2};
use geo::{BoundingRect, Contains, TriangulateEarcut};
use geo_types::{Coord, Geometry, MultiPolygon, Point, Polygon, Triangle};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::RTree;

use super::utils::{finite_range, normalize, paint_color_bar, yl_or_rd_color, CHART_BACKGROUND};
use crate::ViewError;

type RegionEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// One region to draw
#[derive(Debug, Clone)]
pub struct RegionValue<'a> {
    pub code: &'a str,
    pub value: f64,
    /// Tooltip line shown under the code
    pub label: String,
    pub geometry: &'a Geometry<f64>,
}

/// A filled region of the map
#[derive(Debug, Clone)]
pub struct Region {
    pub code: String,
    pub label: String,
    pub value: f64,
    pub color: Color32,
    shape: MultiPolygon<f64>,
    triangles: Vec<Triangle<f64>>,
}

impl Region {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Triangulated choropleth, ready to paint
pub struct ChoroplethChart {
    title: String,
    regions: Vec<Region>,
    value_range: (f64, f64),
    bounds: geo_types::Rect<f64>,
    index: RTree<RegionEnvelope>,
    show_legend: bool,
}

/// Polygonal parts of a geometry; points and lines have none
fn polygons(geometry: &Geometry<f64>) -> Vec<Polygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => vec![polygon.clone()],
        Geometry::MultiPolygon(multi) => multi.0.clone(),
        Geometry::Rect(rect) => vec![rect.to_polygon()],
        Geometry::Triangle(triangle) => vec![triangle.to_polygon()],
        Geometry::GeometryCollection(collection) => collection.iter().flat_map(polygons).collect(),
        _ => Vec::new(),
    }
}

impl ChoroplethChart {
    /// Triangulate and color the regions.
    ///
    /// Fails when `values` is empty or when none of the geometries has a
    /// fillable polygon.
    pub fn build<'a>(
        title: impl Into<String>,
        values: impl IntoIterator<Item = RegionValue<'a>>,
    ) -> Result<Self, ViewError> {
        let mut regions = Vec::new();
        let mut seen = 0usize;

        for value in values {
            seen += 1;
            let shape = MultiPolygon::new(polygons(value.geometry));
            let triangles: Vec<Triangle<f64>> = shape
                .0
                .iter()
                .flat_map(|polygon| polygon.earcut_triangles())
                .collect();

            if triangles.is_empty() {
                tracing::debug!("Region {} has no fillable polygon, skipped", value.code);
                continue;
            }
            regions.push(Region {
                code: value.code.to_string(),
                label: value.label,
                value: value.value,
                color: Color32::TRANSPARENT,
                shape,
                triangles,
            });
        }

        if seen == 0 {
            return Err(ViewError::NoDrawableRegions);
        }
        let value_range =
            finite_range(regions.iter().map(|r| r.value)).ok_or(ViewError::NoFillablePolygon)?;
        let bounds = regions
            .iter()
            .filter_map(|r| r.shape.bounding_rect())
            .reduce(|a, b| {
                geo_types::Rect::new(
                    Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
            .ok_or(ViewError::NoFillablePolygon)?;

        for region in &mut regions {
            region.color = yl_or_rd_color(normalize(region.value, value_range.0, value_range.1));
        }

        let envelopes = regions
            .iter()
            .enumerate()
            .filter_map(|(i, region)| {
                let rect = region.shape.bounding_rect()?;
                Some(GeomWithData::new(
                    Rectangle::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                    i,
                ))
            })
            .collect();

        Ok(Self {
            title: title.into(),
            regions,
            value_range,
            bounds,
            index: RTree::bulk_load(envelopes),
            show_legend: true,
        })
    }

    pub fn with_legend(mut self, show_legend: bool) -> Self {
        self.show_legend = show_legend;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn value_range(&self) -> (f64, f64) {
        self.value_range
    }

    pub fn has_legend(&self) -> bool {
        self.show_legend
    }

    /// Region containing the map coordinate `(x, y)`
    pub fn region_at(&self, x: f64, y: f64) -> Option<&Region> {
        let point = Point::new(x, y);
        self.index
            .locate_all_at_point(&[x, y])
            .map(|entry| &self.regions[entry.data])
            .find(|region| region.shape.contains(&point))
    }

    /// Paint the map into a `size` area, with a hover tooltip per region
    pub fn show(&self, ui: &mut Ui, size: Vec2) {
        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, CHART_BACKGROUND);

        let title_height = 28.0;
        painter.text(
            Pos2::new(rect.center().x, rect.top() + 6.0),
            Align2::CENTER_TOP,
            &self.title,
            FontId::proportional(16.0),
            Color32::BLACK,
        );

        let legend_width = if self.show_legend { 80.0 } else { 0.0 };
        let plot_rect = Rect::from_min_max(
            rect.min + Vec2::new(8.0, title_height + 4.0),
            rect.max - Vec2::new(legend_width + 8.0, 8.0),
        );
        if plot_rect.width() <= 0.0 || plot_rect.height() <= 0.0 {
            return;
        }
        let projection = Projection::fit(self.bounds, plot_rect);

        let mut mesh = Mesh::default();
        for region in &self.regions {
            for triangle in &region.triangles {
                let base = mesh.vertices.len() as u32;
                for corner in triangle.to_array() {
                    mesh.colored_vertex(projection.to_screen(corner), region.color);
                }
                mesh.add_triangle(base, base + 1, base + 2);
            }
        }
        painter.add(Shape::mesh(mesh));

        if self.show_legend {
            let bar = Rect::from_min_size(
                Pos2::new(plot_rect.max.x + 16.0, plot_rect.min.y + plot_rect.height() * 0.1),
                Vec2::new(16.0, plot_rect.height() * 0.8),
            );
            paint_color_bar(&painter, bar, self.value_range.0, self.value_range.1);
        }

        if let Some(pos) = response.hover_pos().filter(|pos| plot_rect.contains(*pos)) {
            let coord = projection.to_map(pos);
            if let Some(region) = self.region_at(coord.x, coord.y) {
                response.on_hover_text(format!("{}\n{}", region.code, region.label));
            }
        }
    }
}

/// Equal-aspect fit of map coordinates into a screen rectangle, north up
#[derive(Debug, Clone, Copy)]
struct Projection {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset: Pos2,
}

impl Projection {
    fn fit(bounds: geo_types::Rect<f64>, target: Rect) -> Self {
        let width = bounds.width().max(f64::EPSILON);
        let height = bounds.height().max(f64::EPSILON);
        let scale = (target.width() as f64 / width).min(target.height() as f64 / height);
        let drawn = Vec2::new((width * scale) as f32, (height * scale) as f32);

        Self {
            min_x: bounds.min().x,
            max_y: bounds.max().y,
            scale,
            offset: target.center() - drawn / 2.0,
        }
    }

    fn to_screen(&self, coord: Coord<f64>) -> Pos2 {
        Pos2::new(
            self.offset.x + ((coord.x - self.min_x) * self.scale) as f32,
            self.offset.y + ((self.max_y - coord.y) * self.scale) as f32,
        )
    }

    fn to_map(&self, pos: Pos2) -> Coord<f64> {
        Coord {
            x: self.min_x + (pos.x - self.offset.x) as f64 / self.scale,
            y: self.max_y - (pos.y - self.offset.y) as f64 / self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, polygon};

    fn square(x: f64, y: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ])
    }

    fn value<'a>(code: &'a str, value: f64, geometry: &'a Geometry<f64>) -> RegionValue<'a> {
        RegionValue {
            code,
            value,
            label: format!("{:.2}", value),
            geometry,
        }
    }

    #[test]
    fn test_build_colors_by_range() {
        let (a, b) = (square(0.0, 0.0), square(2.0, 0.0));
        let chart = ChoroplethChart::build("test", vec![value("01001", 1.0, &a), value("01002", 3.0, &b)]).unwrap();

        assert_eq!(chart.regions().len(), 2);
        assert_eq!(chart.value_range(), (1.0, 3.0));
        assert_eq!(chart.regions()[0].color, yl_or_rd_color(0.0));
        assert_eq!(chart.regions()[1].color, yl_or_rd_color(1.0));
        assert_eq!(chart.regions()[0].triangle_count(), 2);
    }

    #[test]
    fn test_region_lookup() {
        let (a, b) = (square(0.0, 0.0), square(2.0, 0.0));
        let chart = ChoroplethChart::build("test", vec![value("01001", 1.0, &a), value("01002", 3.0, &b)]).unwrap();

        assert_eq!(chart.region_at(0.5, 0.5).map(|r| r.code.as_str()), Some("01001"));
        assert_eq!(chart.region_at(2.5, 0.5).map(|r| r.code.as_str()), Some("01002"));
        assert!(chart.region_at(1.5, 0.5).is_none());
    }

    #[test]
    fn test_multipolygon_and_collection_parts() {
        let multi = Geometry::MultiPolygon(MultiPolygon::new(vec![
            polygons(&square(0.0, 0.0)).remove(0),
            polygons(&square(5.0, 5.0)).remove(0),
        ]));
        let chart = ChoroplethChart::build("test", vec![value("2A004", 0.0, &multi)]).unwrap();

        assert_eq!(chart.regions()[0].triangle_count(), 4);
        assert!(chart.region_at(5.5, 5.5).is_some());
    }

    #[test]
    fn test_errors() {
        let empty: Vec<RegionValue<'_>> = Vec::new();
        assert!(matches!(
            ChoroplethChart::build("test", empty),
            Err(ViewError::NoDrawableRegions)
        ));

        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        assert!(matches!(
            ChoroplethChart::build("test", vec![value("01001", 1.0, &line)]),
            Err(ViewError::NoFillablePolygon)
        ));
    }

    #[test]
    fn test_projection_round_trip() {
        let bounds = geo_types::Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 1.0 });
        let projection = Projection::fit(bounds, Rect::from_min_size(Pos2::ZERO, Vec2::new(200.0, 200.0)));

        let top_left = projection.to_screen(Coord { x: 0.0, y: 1.0 });
        assert_eq!(top_left, Pos2::new(0.0, 50.0));
        let back = projection.to_map(Pos2::new(100.0, 100.0));
        assert!((back.x - 1.0).abs() < 1e-6 && (back.y - 0.5).abs() < 1e-6);
    }
}
