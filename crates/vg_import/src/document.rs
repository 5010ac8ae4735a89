//! SVG document type and loading

use std::fs;
use std::path::Path as FilePath;

use tracing::debug;
use usvg::{Options, Tree};
use vg_core::{Affine2D, Graphics, Path, Rect};

use crate::error::{ImportError, Result};
use crate::options::ImportOptions;
use crate::path::{to_affine, usvg_path_to_subpaths};
use crate::style::{apply_fill, apply_stroke};

/// A loaded and parsed SVG document
#[derive(Clone, Debug)]
pub struct SvgDocument {
    /// The underlying usvg tree
    tree: Tree,
    /// Scale from SVG pixels to the requested units
    unit_scale: f32,
    /// Original viewBox/size of the SVG, in the requested units
    pub width: f32,
    pub height: f32,
}

impl SvgDocument {
    /// Load an SVG (or gzip-compressed SVGZ) document from a file
    pub fn from_file(path: impl AsRef<FilePath>, options: &ImportOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        if data.is_empty() {
            return Err(ImportError::EmptyFile(path.to_path_buf()));
        }
        Self::from_data(&data, options)
    }

    /// Load an SVG document from raw bytes
    pub fn from_data(data: &[u8], options: &ImportOptions) -> Result<Self> {
        options.validate()?;

        let usvg_options = Options {
            dpi: options.dpi,
            ..Options::default()
        };
        let tree =
            Tree::from_data(data, &usvg_options).map_err(|e| ImportError::Parse(e.to_string()))?;

        let unit_scale = options.units.per_pixel(options.dpi);
        let size = tree.size();
        debug!(
            width = size.width(),
            height = size.height(),
            units = %options.units,
            "parsed svg document"
        );

        Ok(Self {
            tree,
            unit_scale,
            width: size.width() * unit_scale,
            height: size.height() * unit_scale,
        })
    }

    /// Load an SVG document from a string
    pub fn from_str(svg_str: &str, options: &ImportOptions) -> Result<Self> {
        Self::from_data(svg_str.as_bytes(), options)
    }

    /// Get the original size of the SVG
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Convert every visible path of the document, in document order
    pub fn graphics(&self) -> Graphics {
        let mut graphics = Graphics::new();
        let base = Affine2D::scale(self.unit_scale, self.unit_scale);
        self.extract_paths(self.tree.root(), &base, &mut graphics);
        graphics
    }

    /// Recursively extract paths from the node tree
    fn extract_paths(&self, group: &usvg::Group, base: &Affine2D, graphics: &mut Graphics) {
        for child in group.children() {
            match child {
                usvg::Node::Group(g) => {
                    // transforms are handled per-path via abs_transform
                    self.extract_paths(g, base, graphics);
                }
                usvg::Node::Path(p) => {
                    if !p.is_visible() {
                        continue;
                    }
                    let transform = base.then(&to_affine(&p.abs_transform()));

                    let mut path = Path::new().with_name(p.id());
                    path.subpaths = usvg_path_to_subpaths(p.data(), &transform);
                    if let Some(fill) = p.fill() {
                        apply_fill(&mut path, fill, &transform);
                    }
                    if let Some(stroke) = p.stroke() {
                        apply_stroke(&mut path, stroke, &transform);
                    }
                    graphics.add_path(path);
                }
                usvg::Node::Image(image) => {
                    debug!(id = image.id(), "skipping embedded image");
                }
                usvg::Node::Text(text) => {
                    // usvg keeps the outlined glyphs as a group
                    self.extract_paths(text.flattened(), base, graphics);
                }
            }
        }
    }
}

/// Scale the drawing up so its larger side reaches `target_size`.
///
/// Drawings already that large are left alone. Returns the applied scale.
pub fn normalize_graphics(graphics: &mut Graphics, target_size: f32) -> f32 {
    let extent = graphics.bounds().size.max_dimension();
    if extent <= 0.0 {
        return 1.0;
    }
    let s = target_size / extent;
    if s > 1.0 {
        graphics.transform(&Affine2D::scale(s, s), true);
        s
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Units;
    use vg_core::{Color, FillRule, Paint, Point};

    #[test]
    fn test_parse_simple_svg() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <rect id="box" x="10" y="10" width="80" height="80" fill="red"/>
            </svg>
        "#;

        let doc = SvgDocument::from_str(svg, &ImportOptions::default()).unwrap();
        assert_eq!(doc.size(), (100.0, 100.0));

        let graphics = doc.graphics();
        assert_eq!(graphics.num_paths(), 1);
        let path = &graphics.paths()[0];
        assert_eq!(path.name, "box");
        assert_eq!(path.fill, Some(Paint::Color(Color::RED)));
        assert!(path.line.is_none());
        assert!(path.bounds().is_equal_approx(&Rect::new(10.0, 10.0, 80.0, 80.0)));
    }

    #[test]
    fn test_group_transform_and_stroke() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <g transform="translate(50 0) scale(2)">
                    <path d="M0,0 L10,0 L10,10 Z" fill="blue" fill-rule="evenodd"
                          stroke="black" stroke-width="3" stroke-linejoin="round"/>
                </g>
            </svg>
        "#;

        let graphics = SvgDocument::from_str(svg, &ImportOptions::default())
            .unwrap()
            .graphics();
        let path = &graphics.paths()[0];
        assert_eq!(path.fill_rule, FillRule::EvenOdd);
        assert_eq!(path.line_width, 6.0);
        assert_eq!(path.line_join, vg_core::LineJoin::Round);
        assert!(path.bounds().is_equal_approx(&Rect::new(50.0, 0.0, 20.0, 20.0)));
        assert!(path.subpaths[0].is_closed());
    }

    #[test]
    fn test_linear_gradient_follows_path_space() {
        let svg = r#"
            <svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
                <defs>
                    <linearGradient id="g" x1="0" y1="0" x2="1" y2="0">
                        <stop offset="0" stop-color="black"/>
                        <stop offset="1" stop-color="white"/>
                    </linearGradient>
                </defs>
                <rect x="20" y="0" width="60" height="10" fill="url(#g)"/>
            </svg>
        "#;

        let graphics = SvgDocument::from_str(svg, &ImportOptions::default())
            .unwrap()
            .graphics();
        let fill = graphics.paths()[0].fill.as_ref().unwrap();
        assert!(fill.is_gradient());
        let left = fill.color_at(Point::new(20.0, 5.0));
        let right = fill.color_at(Point::new(80.0, 5.0));
        assert!(left.r < 0.01);
        assert!(right.r > 0.99);
    }

    #[test]
    fn test_units_scale_output() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="96" height="96">
            <rect width="96" height="96"/></svg>"#;
        let options = ImportOptions {
            units: Units::In,
            ..Default::default()
        };
        let doc = SvgDocument::from_str(svg, &options).unwrap();
        assert!((doc.width - 1.0).abs() < 1e-5);
        let bounds = doc.graphics().bounds();
        assert!((bounds.width() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_svg_is_a_parse_error() {
        let result = SvgDocument::from_str("<svg", &ImportOptions::default());
        assert!(matches!(result, Err(ImportError::Parse(_))));
    }

    #[test]
    fn test_normalize_only_scales_up() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="32">
            <rect width="64" height="32" fill="red" stroke="black" stroke-width="1"/></svg>"#;
        let mut graphics = SvgDocument::from_str(svg, &ImportOptions::default())
            .unwrap()
            .graphics();

        // stroke is not part of the geometric bounds
        assert_eq!(normalize_graphics(&mut graphics, 256.0), 4.0);
        assert!(graphics
            .bounds()
            .is_equal_approx(&Rect::new(0.0, 0.0, 256.0, 128.0)));
        assert_eq!(graphics.paths()[0].line_width, 4.0);

        assert_eq!(normalize_graphics(&mut graphics, 100.0), 1.0);
        assert_eq!(normalize_graphics(&mut Graphics::new(), 256.0), 1.0);
    }
}
