//! GeoPackage geometry blobs and well-known binary (WKB) decoding
//!
//! A GeoPackage blob is a small header (`GP`, version, flags, SRS id and an
//! optional envelope) followed by a WKB geometry. Z and M ordinates are read
//! and dropped, both ISO (`1000`/`2000`/`3000` offsets) and EWKB flag styles
//! are understood.

use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use thiserror::Error;

const EWKB_Z: u32 = 0x8000_0000;
const EWKB_M: u32 = 0x4000_0000;
const EWKB_SRID: u32 = 0x2000_0000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("geometry blob truncated at byte {0}")]
    Truncated(usize),

    #[error("invalid byte order marker {0}")]
    ByteOrder(u8),

    #[error("invalid GeoPackage envelope indicator {0}")]
    Envelope(u8),

    #[error("unsupported WKB geometry type {0}")]
    UnsupportedType(u32),

    #[error("expected {expected} inside a collection, found type {found}")]
    UnexpectedMember { expected: &'static str, found: u32 },
}

/// Decode a GeoPackage geometry blob.
///
/// Returns `None` for blobs flagged empty. Blobs without the `GP` magic are
/// decoded as plain WKB.
pub fn decode_gpkg_geometry(blob: &[u8]) -> Result<Option<Geometry<f64>>, GeometryError> {
    if blob.len() < 2 || &blob[..2] != b"GP" {
        return decode_wkb(blob).map(Some);
    }

    if blob.len() < 8 {
        return Err(GeometryError::Truncated(blob.len()));
    }

    let flags = blob[3];
    let empty = flags & 0b0001_0000 != 0;
    let envelope_len = match (flags >> 1) & 0b111 {
        0 => 0,
        1 => 32,
        2 | 3 => 48,
        4 => 64,
        other => return Err(GeometryError::Envelope(other)),
    };

    // magic, version, flags, srs_id
    let wkb_start = 8 + envelope_len;
    if empty {
        return Ok(None);
    }
    if blob.len() <= wkb_start {
        return Err(GeometryError::Truncated(blob.len()));
    }

    decode_wkb(&blob[wkb_start..]).map(Some)
}

/// Decode a WKB geometry
pub fn decode_wkb(bytes: &[u8]) -> Result<Geometry<f64>, GeometryError> {
    WkbReader { bytes, pos: 0 }.read_geometry()
}

struct WkbReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

#[derive(Clone, Copy)]
struct Header {
    little_endian: bool,
    kind: u32,
    dims: usize,
}

impl<'a> WkbReader<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], GeometryError> {
        let end = self.pos + N;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(GeometryError::Truncated(self.pos))?;
        self.pos = end;

        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn read_u32(&mut self, little_endian: bool) -> Result<u32, GeometryError> {
        let raw = self.take::<4>()?;
        Ok(if little_endian { u32::from_le_bytes(raw) } else { u32::from_be_bytes(raw) })
    }

    fn read_f64(&mut self, little_endian: bool) -> Result<f64, GeometryError> {
        let raw = self.take::<8>()?;
        Ok(if little_endian { f64::from_le_bytes(raw) } else { f64::from_be_bytes(raw) })
    }

    /// Element count, checked against the bytes left so a corrupt count
    /// cannot trigger a huge allocation.
    fn read_count(&mut self, little_endian: bool, min_item_len: usize) -> Result<usize, GeometryError> {
        let count = self.read_u32(little_endian)? as usize;
        let remaining = self.bytes.len().saturating_sub(self.pos);
        if count.saturating_mul(min_item_len) > remaining {
            return Err(GeometryError::Truncated(self.bytes.len()));
        }
        Ok(count)
    }

    fn read_header(&mut self) -> Result<Header, GeometryError> {
        let [order] = self.take::<1>()?;
        let little_endian = match order {
            0 => false,
            1 => true,
            other => return Err(GeometryError::ByteOrder(other)),
        };

        let raw = self.read_u32(little_endian)?;
        if raw & EWKB_SRID != 0 {
            self.read_u32(little_endian)?;
        }

        let mut has_z = raw & EWKB_Z != 0;
        let mut has_m = raw & EWKB_M != 0;
        let iso = raw & 0x0FFF_FFFF;
        match iso / 1000 {
            1 => has_z = true,
            2 => has_m = true,
            3 => {
                has_z = true;
                has_m = true;
            }
            _ => {}
        }

        Ok(Header {
            little_endian,
            kind: iso % 1000,
            dims: 2 + has_z as usize + has_m as usize,
        })
    }

    fn read_coord(&mut self, header: Header) -> Result<Coord<f64>, GeometryError> {
        let x = self.read_f64(header.little_endian)?;
        let y = self.read_f64(header.little_endian)?;
        for _ in 2..header.dims {
            self.read_f64(header.little_endian)?;
        }
        Ok(Coord { x, y })
    }

    fn read_line_string(&mut self, header: Header) -> Result<LineString<f64>, GeometryError> {
        let count = self.read_count(header.little_endian, header.dims * 8)?;
        let coords = (0..count)
            .map(|_| self.read_coord(header))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LineString::new(coords))
    }

    fn read_polygon(&mut self, header: Header) -> Result<Polygon<f64>, GeometryError> {
        let ring_count = self.read_count(header.little_endian, 4)?;
        let mut rings = (0..ring_count)
            .map(|_| self.read_line_string(header))
            .collect::<Result<Vec<_>, _>>()?;

        if rings.is_empty() {
            return Ok(Polygon::new(LineString::new(Vec::new()), Vec::new()));
        }
        let exterior = rings.remove(0);
        Ok(Polygon::new(exterior, rings))
    }

    fn read_geometry(&mut self) -> Result<Geometry<f64>, GeometryError> {
        let header = self.read_header()?;

        match header.kind {
            1 => {
                let coord = self.read_coord(header)?;
                // GeoPackage encodes an empty point as NaN coordinates
                if coord.x.is_nan() && coord.y.is_nan() {
                    Ok(Geometry::GeometryCollection(GeometryCollection::default()))
                } else {
                    Ok(Geometry::Point(Point(coord)))
                }
            }
            2 => Ok(Geometry::LineString(self.read_line_string(header)?)),
            3 => Ok(Geometry::Polygon(self.read_polygon(header)?)),
            4 => {
                let count = self.read_count(header.little_endian, 5)?;
                let mut points = Vec::with_capacity(count);
                for _ in 0..count {
                    match self.read_geometry()? {
                        Geometry::Point(p) => points.push(p),
                        Geometry::GeometryCollection(gc) if gc.0.is_empty() => {}
                        other => return Err(unexpected("Point", &other)),
                    }
                }
                Ok(Geometry::MultiPoint(MultiPoint::new(points)))
            }
            5 => {
                let count = self.read_count(header.little_endian, 9)?;
                let mut lines = Vec::with_capacity(count);
                for _ in 0..count {
                    match self.read_geometry()? {
                        Geometry::LineString(line) => lines.push(line),
                        other => return Err(unexpected("LineString", &other)),
                    }
                }
                Ok(Geometry::MultiLineString(MultiLineString::new(lines)))
            }
            6 => {
                let count = self.read_count(header.little_endian, 9)?;
                let mut polygons = Vec::with_capacity(count);
                for _ in 0..count {
                    match self.read_geometry()? {
                        Geometry::Polygon(polygon) => polygons.push(polygon),
                        other => return Err(unexpected("Polygon", &other)),
                    }
                }
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
            }
            7 => {
                let count = self.read_count(header.little_endian, 5)?;
                let members = (0..count)
                    .map(|_| self.read_geometry())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Geometry::GeometryCollection(GeometryCollection::new_from(members)))
            }
            other => Err(GeometryError::UnsupportedType(other)),
        }
    }
}

fn unexpected(expected: &'static str, found: &Geometry<f64>) -> GeometryError {
    let found = match found {
        Geometry::Point(_) => 1,
        Geometry::LineString(_) => 2,
        Geometry::Polygon(_) => 3,
        Geometry::MultiPoint(_) => 4,
        Geometry::MultiLineString(_) => 5,
        Geometry::MultiPolygon(_) => 6,
        Geometry::GeometryCollection(_) => 7,
        _ => 0,
    };
    GeometryError::UnexpectedMember { expected, found }
}
