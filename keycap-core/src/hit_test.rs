//! Hit testing for key selection
//!
//! Computes the user-space bounds of each key's primary shape, taking the
//! `transform` attributes of every ancestor into account, and finds the key
//! under a point.

use crate::diagram::{parse_length, Element, KeyClasses, KeyDiagram};
use crate::registry::{KeyCode, KeyRegistry};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};

/// Bounds of a key's primary shape in diagram user space
pub fn key_bounds(diagram: &KeyDiagram, classes: &KeyClasses, code: &str) -> Option<Rect> {
    let key_path = diagram.root().path_to(&|e: &Element| e.id() == Some(code))?;
    let key = *key_path.last()?;
    let shadow_class = classes.shadow.as_str();
    let shape_path = key.path_to(&|e: &Element| e.is_fill_shape() && !e.has_class(shadow_class))?;

    // The key element appears at the end of the first chain and the start of the second
    let transform = key_path
        .iter()
        .chain(shape_path.iter().skip(1))
        .fold(Affine::IDENTITY, |acc, element| acc * element_transform(element));

    let shape = *shape_path.last()?;
    let local = shape_bounds(shape)?;
    Some(transform.transform_rect_bbox(local))
}

/// Find the active key under `point`
///
/// When bounds overlap the smallest key wins, so nested or stacked visuals
/// resolve to the most specific one.
pub fn hit_test_key(
    diagram: &KeyDiagram,
    registry: &KeyRegistry,
    classes: &KeyClasses,
    point: Point,
    tolerance: f64,
) -> Option<KeyCode> {
    registry
        .active_keys()
        .filter_map(|code| {
            let bounds = key_bounds(diagram, classes, code.as_str())?;
            bounds
                .inflate(tolerance, tolerance)
                .contains(point)
                .then(|| (code, bounds.area()))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(code, _)| code.clone())
}

/// Local bounds of a fill-bearing shape
fn shape_bounds(shape: &Element) -> Option<Rect> {
    let number = |name: &str| shape.attribute(name).and_then(parse_length);
    match shape.name.as_str() {
        "rect" => {
            let x = number("x").unwrap_or(0.0);
            let y = number("y").unwrap_or(0.0);
            Some(Rect::new(x, y, x + number("width")?, y + number("height")?))
        }
        "circle" => {
            let (cx, cy) = (number("cx").unwrap_or(0.0), number("cy").unwrap_or(0.0));
            let r = number("r")?;
            Some(Rect::new(cx - r, cy - r, cx + r, cy + r))
        }
        "ellipse" => {
            let (cx, cy) = (number("cx").unwrap_or(0.0), number("cy").unwrap_or(0.0));
            let (rx, ry) = (number("rx")?, number("ry")?);
            Some(Rect::new(cx - rx, cy - ry, cx + rx, cy + ry))
        }
        "path" => {
            let path = BezPath::from_svg(shape.attribute("d")?).ok()?;
            Some(path.bounding_box())
        }
        "polygon" => {
            let values = parse_numbers(shape.attribute("points")?);
            let mut points = values.chunks_exact(2).map(|p| Point::new(p[0], p[1]));
            let first = points.next()?;
            Some(points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p)))
        }
        _ => None,
    }
}

/// The element's own `transform` attribute as an affine (identity when absent)
pub fn element_transform(element: &Element) -> Affine {
    element
        .attribute("transform")
        .map(parse_transform)
        .unwrap_or(Affine::IDENTITY)
}

/// Parse an SVG transform list; unknown or malformed entries are skipped
pub fn parse_transform(value: &str) -> Affine {
    let mut result = Affine::IDENTITY;
    let mut rest = value;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')').map(|i| open + i) else {
            break;
        };
        let name = rest[..open].trim_matches(|c: char| c.is_whitespace() || c == ',');
        let args = parse_numbers(&rest[open + 1..close]);
        rest = &rest[close + 1..];

        let step = match (name, args.as_slice()) {
            ("translate", [tx]) => Affine::translate((*tx, 0.0)),
            ("translate", [tx, ty]) => Affine::translate((*tx, *ty)),
            ("scale", [s]) => Affine::scale(*s),
            ("scale", [sx, sy]) => Affine::scale_non_uniform(*sx, *sy),
            ("rotate", [a]) => Affine::rotate(a.to_radians()),
            ("rotate", [a, cx, cy]) => {
                Affine::translate((*cx, *cy)) * Affine::rotate(a.to_radians()) * Affine::translate((-cx, -cy))
            }
            ("skewX", [a]) => Affine::skew(a.to_radians().tan(), 0.0),
            ("skewY", [a]) => Affine::skew(0.0, a.to_radians().tan()),
            ("matrix", [a, b, c, d, e, f]) => Affine::new([*a, *b, *c, *d, *e, *f]),
            _ => {
                log::debug!("Ignoring unsupported transform {}({:?})", name, args);
                continue;
            }
        };
        result *= step;
    }
    result
}

fn parse_numbers(value: &str) -> Vec<f64> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (KeyDiagram, KeyRegistry) {
        let diagram = KeyDiagram::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 300 100">
                <g transform="translate(10, 10)">
                    <g id="KeyA"><rect x="0" y="0" width="40" height="40" fill="#fff"/></g>
                    <g id="KeyB" transform="translate(50 0)"><rect width="40" height="40" fill="#fff"/></g>
                    <g id="Space"><path d="M100 0 L200 0 L200 40 L100 40 Z" fill="#fff"/></g>
                    <g id="KeyC"><circle cx="250" cy="20" r="20" fill="#fff"/></g>
                </g>
            </svg>"##,
        )
        .unwrap();
        let registry = KeyRegistry::from_json(
            r#"{"KeyA": true, "KeyB": true, "Space": true, "KeyC": false}"#,
            "{}",
        )
        .unwrap();
        (diagram, registry)
    }

    #[test]
    fn test_key_bounds_apply_ancestor_transforms() {
        let (diagram, _) = fixture();
        let classes = KeyClasses::default();
        assert_eq!(key_bounds(&diagram, &classes, "KeyA"), Some(Rect::new(10.0, 10.0, 50.0, 50.0)));
        assert_eq!(key_bounds(&diagram, &classes, "KeyB"), Some(Rect::new(60.0, 10.0, 100.0, 50.0)));
        assert_eq!(key_bounds(&diagram, &classes, "Space"), Some(Rect::new(110.0, 10.0, 210.0, 50.0)));
        assert_eq!(key_bounds(&diagram, &classes, "KeyC"), Some(Rect::new(240.0, 10.0, 280.0, 50.0)));
        assert_eq!(key_bounds(&diagram, &classes, "KeyZ"), None);
    }

    #[test]
    fn test_hit_test_active_keys_only() {
        let (diagram, registry) = fixture();
        let classes = KeyClasses::default();

        let hit = |x, y| hit_test_key(&diagram, &registry, &classes, Point::new(x, y), 0.0);
        assert_eq!(hit(20.0, 20.0).as_ref().map(KeyCode::as_str), Some("KeyA"));
        assert_eq!(hit(70.0, 20.0).as_ref().map(KeyCode::as_str), Some("KeyB"));
        assert_eq!(hit(150.0, 30.0).as_ref().map(KeyCode::as_str), Some("Space"));
        // KeyC is inactive
        assert_eq!(hit(250.0, 30.0), None);
        // Gap between KeyA and KeyB
        assert_eq!(hit(55.0, 20.0), None);
    }

    #[test]
    fn test_parse_transform() {
        let t = parse_transform("translate(10,20) scale(2)");
        assert_eq!(t * Point::new(1.0, 1.0), Point::new(12.0, 22.0));

        let m = parse_transform("matrix(1 0 0 1 5 5)");
        assert_eq!(m * Point::ORIGIN, Point::new(5.0, 5.0));

        assert_eq!(parse_transform("bogus(1)"), Affine::IDENTITY);
        assert_eq!(parse_transform(""), Affine::IDENTITY);
    }
}
