//! Well-known text geometry codec.
//!
//! The spatial store hands geometries out as WKT (`ST_AsText`); this module
//! turns them into GeoJSON geometries and back. All seven simple-feature types
//! are supported, with an optional `Z`, `M` or `ZM` marker. Without a marker a
//! position carries 2 or 3 ordinates; with one it carries exactly as many as
//! the marker names. Malformed text is rejected as a whole.

use crate::errors::FeaturesError;
use crate::geojson::{Geometry, Position};

/// Parse WKT into a geometry.
pub fn decode(text: &str) -> Result<Geometry, FeaturesError> {
    let mut parser = Parser::new(text);
    let geometry = parser.geometry()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing content"));
    }
    Ok(geometry)
}

/// Render a geometry as WKT.
pub fn encode(geometry: &Geometry) -> String {
    let (tag, body) = match geometry {
        Geometry::Point { coordinates } => ("POINT", position_text(coordinates)),
        Geometry::MultiPoint { coordinates } => ("MULTIPOINT", position_list_text(coordinates)),
        Geometry::LineString { coordinates } => ("LINESTRING", position_list_text(coordinates)),
        Geometry::Polygon { coordinates } => ("POLYGON", ring_list_text(coordinates)),
        Geometry::MultiLineString { coordinates } => {
            ("MULTILINESTRING", ring_list_text(coordinates))
        }
        Geometry::MultiPolygon { coordinates } => {
            let polygons: Vec<String> = coordinates
                .iter()
                .map(|rings| format!("({})", ring_list_text(rings)))
                .collect();
            ("MULTIPOLYGON", polygons.join(","))
        }
        Geometry::GeometryCollection { geometries } => {
            let members: Vec<String> = geometries.iter().map(encode).collect();
            ("GEOMETRYCOLLECTION", members.join(","))
        }
    };

    // Members of a collection carry their own marker
    let marker = match geometry {
        Geometry::GeometryCollection { .. } => "",
        _ if geometry.positions().any(|p| p.len() > 3) => " ZM",
        _ => "",
    };
    format!("{}{}({})", tag, marker, body)
}

fn position_text(position: &Position) -> String {
    position
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn position_list_text(positions: &[Position]) -> String {
    positions
        .iter()
        .map(position_text)
        .collect::<Vec<_>>()
        .join(",")
}

fn ring_list_text(rings: &[Vec<Position>]) -> String {
    rings
        .iter()
        .map(|ring| format!("({})", position_list_text(ring)))
        .collect::<Vec<_>>()
        .join(",")
}

const GEOMETRY_TYPES: [&str; 7] = [
    "POINT",
    "MULTIPOINT",
    "LINESTRING",
    "MULTILINESTRING",
    "POLYGON",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

/// Ordinate count named by a dimension marker.
fn marker_dims(marker: &str) -> Option<usize> {
    match marker {
        "Z" | "M" => Some(3),
        "ZM" => Some(4),
        _ => None,
    }
}

/// Split a marker glued onto the type name, e.g. `POINTZM`.
fn split_glued_marker(tag: &str) -> Option<(&str, usize)> {
    ["ZM", "Z", "M"].into_iter().find_map(|suffix| {
        let base = tag.strip_suffix(suffix)?;
        if GEOMETRY_TYPES.contains(&base) {
            Some((base, marker_dims(suffix)?))
        } else {
            None
        }
    })
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
    /// Ordinates per position fixed by the innermost dimension marker.
    dims: Option<usize>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            dims: None,
        }
    }

    fn error(&self, message: &str) -> FeaturesError {
        FeaturesError::InvalidWkt(format!("{} at offset {} in '{}'", message, self.pos, self.text))
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    fn expect(&mut self, c: char) -> Result<(), FeaturesError> {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    /// Consume `c` if it is the next non-whitespace character.
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn keyword(&mut self) -> String {
        self.skip_ws();
        let len = self
            .rest()
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(self.rest().len());
        let word = self.rest()[..len].to_ascii_uppercase();
        self.pos += len;
        word
    }

    fn geometry(&mut self) -> Result<Geometry, FeaturesError> {
        let keyword = self.keyword();
        if keyword.is_empty() {
            return Err(self.error("expected geometry type"));
        }

        let (tag, mut dims) = match split_glued_marker(&keyword) {
            Some((base, dims)) => (base.to_string(), Some(dims)),
            None => (keyword, None),
        };

        // Separate dimension marker, e.g. "POINT ZM (1 2 3 4)"
        if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            let marker = self.keyword();
            if marker == "EMPTY" {
                return Err(self.error("empty geometries are not supported"));
            }
            match (dims, marker_dims(&marker)) {
                (None, Some(n)) => dims = Some(n),
                _ => return Err(self.error(&format!("unsupported marker '{}'", marker))),
            }
        }

        // Members of a collection inherit the marker unless they carry their own
        let outer = self.dims;
        if dims.is_some() {
            self.dims = dims;
        }
        let geometry = self.geometry_body(&tag);
        self.dims = outer;
        geometry
    }

    fn geometry_body(&mut self, tag: &str) -> Result<Geometry, FeaturesError> {
        match tag {
            "POINT" => {
                self.expect('(')?;
                let coordinates = self.position()?;
                self.expect(')')?;
                Ok(Geometry::Point { coordinates })
            }
            "MULTIPOINT" => Ok(Geometry::MultiPoint {
                coordinates: self.multi_point()?,
            }),
            "LINESTRING" => Ok(Geometry::LineString {
                coordinates: self.position_list()?,
            }),
            "MULTILINESTRING" => Ok(Geometry::MultiLineString {
                coordinates: self.ring_list()?,
            }),
            "POLYGON" => Ok(Geometry::Polygon {
                coordinates: self.ring_list()?,
            }),
            "MULTIPOLYGON" => {
                self.expect('(')?;
                let mut polygons = vec![self.ring_list()?];
                while self.eat(',') {
                    polygons.push(self.ring_list()?);
                }
                self.expect(')')?;
                Ok(Geometry::MultiPolygon {
                    coordinates: polygons,
                })
            }
            "GEOMETRYCOLLECTION" => {
                self.expect('(')?;
                let mut geometries = vec![self.geometry()?];
                while self.eat(',') {
                    geometries.push(self.geometry()?);
                }
                self.expect(')')?;
                Ok(Geometry::GeometryCollection { geometries })
            }
            other => Err(self.error(&format!("unsupported geometry type '{}'", other))),
        }
    }

    fn number(&mut self) -> Result<f64, FeaturesError> {
        self.skip_ws();
        let len = self
            .rest()
            .find(|c: char| c.is_whitespace() || c == ',' || c == ')' || c == '(')
            .unwrap_or(self.rest().len());
        let token = &self.rest()[..len];
        let value: f64 = token
            .parse()
            .map_err(|_| self.error(&format!("invalid number '{}'", token)))?;
        if !value.is_finite() {
            return Err(self.error(&format!("non-finite number '{}'", token)));
        }
        self.pos += len;
        Ok(value)
    }

    fn position(&mut self) -> Result<Position, FeaturesError> {
        let mut position = vec![self.number()?, self.number()?];
        while matches!(self.peek(), Some(c) if c != ',' && c != ')') {
            position.push(self.number()?);
        }
        match self.dims {
            Some(n) if position.len() != n => {
                Err(self.error(&format!("expected {} ordinates per position", n)))
            }
            None if position.len() > 3 => {
                Err(self.error("positions without a ZM marker may have at most 3 ordinates"))
            }
            _ => Ok(position),
        }
    }

    /// `( x y, x y, ... )`
    fn position_list(&mut self) -> Result<Vec<Position>, FeaturesError> {
        self.expect('(')?;
        let mut positions = vec![self.position()?];
        while self.eat(',') {
            positions.push(self.position()?);
        }
        self.expect(')')?;
        Ok(positions)
    }

    /// `((x y, ...), (x y, ...))`, shared by polygons and multi line strings.
    fn ring_list(&mut self) -> Result<Vec<Vec<Position>>, FeaturesError> {
        self.expect('(')?;
        let mut rings = vec![self.position_list()?];
        while self.eat(',') {
            rings.push(self.position_list()?);
        }
        self.expect(')')?;
        Ok(rings)
    }

    /// `(x y, x y)` or `((x y), (x y))`
    fn multi_point(&mut self) -> Result<Vec<Position>, FeaturesError> {
        self.expect('(')?;
        let mut points = Vec::new();
        loop {
            if self.eat('(') {
                points.push(self.position()?);
                self.expect(')')?;
            } else {
                points.push(self.position()?);
            }
            if !self.eat(',') {
                break;
            }
        }
        self.expect(')')?;
        Ok(points)
    }
}
