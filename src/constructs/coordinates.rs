use std::fmt::Debug;

use crate::{
    constructs::day::{CELLS_PER_DAY, NUM_COLS, NUM_ROWS},
    Header, OneddError,
};

/// Box center of the first cell of the north-west scan.
pub const FIRST_BOX_CENTER: &str = "(89.5N,0.5E)";
/// Box center of the second cell of the north-west scan.
pub const SECOND_BOX_CENTER: &str = "(89.5N,1.5E)";
/// Box center of the last cell of the north-west scan.
pub const LAST_BOX_CENTER: &str = "(89.5S,359.5E)";

/// Center of one grid cell, in degrees north and degrees east.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}
impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Mapping between scan positions within a day record and grid cells.
///
/// A scheme is selected by [`resolve_scheme`] from the box-center fields of the
/// header. Decoding never depends on the scheme; only the pairing of readings
/// with coordinates does.
pub trait CoordinateScheme: Debug + Send + Sync {
    /// Checks that the header declares this scan order.
    fn validate(&self, header: &Header) -> crate::Result<()>;

    /// Center of the cell at scan position `index` (`index < CELLS_PER_DAY`).
    fn coordinate(&self, index: usize) -> Coordinate;

    /// Scan position of the cell containing `coordinate`, if it is on the globe.
    fn cell_index(&self, coordinate: Coordinate) -> Option<usize>;
}

/// Row-major scan starting at 89.5N 0.5E: rows step south and columns step
/// east by one degree.
#[derive(Debug, Clone, Copy, Default)]
pub struct NorthWestScan;

impl CoordinateScheme for NorthWestScan {
    fn validate(&self, header: &Header) -> crate::Result<()> {
        let declared = [
            ("1st_box_center", FIRST_BOX_CENTER),
            ("2nd_box_center", SECOND_BOX_CENTER),
            ("last_box_center", LAST_BOX_CENTER),
        ];
        for (field, expected) in declared {
            let actual = header
                .get(field)
                .ok_or_else(|| OneddError::MissingField(field.to_string()))?;
            if actual != expected {
                return Err(OneddError::ScanOrderMismatch {
                    field,
                    expected,
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }

    fn coordinate(&self, index: usize) -> Coordinate {
        let row = index / NUM_COLS;
        let col = index % NUM_COLS;
        Coordinate::new(89.5 - row as f64, 0.5 + col as f64)
    }

    fn cell_index(&self, coordinate: Coordinate) -> Option<usize> {
        let Coordinate {
            latitude,
            longitude,
        } = coordinate;
        if !(-90.0..=90.0).contains(&latitude) || !longitude.is_finite() {
            return None;
        }
        let row = ((90.0 - latitude).floor() as usize).min(NUM_ROWS - 1);
        let col = (longitude.rem_euclid(360.0).floor() as usize).min(NUM_COLS - 1);
        Some(row * NUM_COLS + col)
    }
}

static NORTH_WEST: NorthWestScan = NorthWestScan;

/// Known scan orders, in order of preference.
static SCHEMES: [&dyn CoordinateScheme; 1] = [&NORTH_WEST];

/// Picks the scan order declared by the header.
///
/// A header that matches no known scheme is rejected with the error of the
/// preferred scheme rather than reinterpreted.
pub fn resolve_scheme(header: &Header) -> crate::Result<&'static dyn CoordinateScheme> {
    let mut first_err = None;
    for scheme in SCHEMES {
        match scheme.validate(header) {
            Ok(()) => return Ok(scheme),
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }
    Err(first_err.unwrap_or_else(|| OneddError::MissingField("1st_box_center".to_string())))
}

/// Lazy sequence of the cell centers of one day, in scan order.
#[derive(Debug, Clone)]
pub struct Coordinates {
    scheme: &'static dyn CoordinateScheme,
    pos: usize,
}
impl Coordinates {
    pub fn new(scheme: &'static dyn CoordinateScheme) -> Self {
        Self { scheme, pos: 0 }
    }

    pub fn scheme(&self) -> &'static dyn CoordinateScheme {
        self.scheme
    }
}

impl Iterator for Coordinates {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= CELLS_PER_DAY {
            return None;
        }
        let coordinate = self.scheme.coordinate(self.pos);
        self.pos += 1;
        Some(coordinate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = CELLS_PER_DAY - self.pos.min(CELLS_PER_DAY);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Coordinates {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_scan_order() {
        let header = Header::new(1997, 1, 31, -99999.0);
        let scheme = resolve_scheme(&header).unwrap();
        let coords: Vec<_> = Coordinates::new(scheme).collect();

        assert_eq!(coords.len(), CELLS_PER_DAY);
        assert_eq!(coords[0], Coordinate::new(89.5, 0.5));
        assert_eq!(coords[1], Coordinate::new(89.5, 1.5));
        assert_eq!(coords[NUM_COLS - 1], Coordinate::new(89.5, 359.5));
        assert_eq!(coords[NUM_COLS], Coordinate::new(88.5, 0.5));
        assert_eq!(coords[CELLS_PER_DAY - 1], Coordinate::new(-89.5, 359.5));

        for (i, c) in coords.iter().enumerate() {
            let row = i / NUM_COLS;
            let col = i % NUM_COLS;
            assert_eq!(c.latitude, 89.5 - row as f64);
            assert_eq!(c.longitude, 0.5 + col as f64);
        }

        let distinct: HashSet<_> = coords
            .iter()
            .map(|c| (c.latitude.to_bits(), c.longitude.to_bits()))
            .collect();
        assert_eq!(distinct.len(), CELLS_PER_DAY);
    }

    #[test]
    fn test_exact_size() {
        let mut coords = Coordinates::new(&NORTH_WEST);
        assert_eq!(coords.len(), CELLS_PER_DAY);
        coords.next();
        assert_eq!(coords.len(), CELLS_PER_DAY - 1);
        assert_eq!(coords.by_ref().count(), CELLS_PER_DAY - 1);
        assert_eq!(coords.len(), 0);
        assert!(coords.next().is_none());
    }

    #[test]
    fn test_scan_order_mismatch() {
        let mut header = Header::new(1997, 1, 31, -99999.0);
        header.set("1st_box_center", "(89.5S,0.5E)");

        match resolve_scheme(&header) {
            Err(OneddError::ScanOrderMismatch { field, actual, .. }) => {
                assert_eq!(field, "1st_box_center");
                assert_eq!(actual, "(89.5S,0.5E)");
            }
            other => panic!("Expected ScanOrderMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_order_missing_field() {
        let header = Header::from_fields(vec![
            ("year".into(), "1997".into()),
            ("month".into(), "01".into()),
            ("days".into(), "1-31".into()),
        ])
        .unwrap();
        assert!(matches!(
            resolve_scheme(&header),
            Err(OneddError::MissingField(ref field)) if field == "1st_box_center"
        ));
    }

    #[test]
    fn test_cell_index() {
        let scheme = NorthWestScan;
        for index in [0, 1, 359, 360, 32_400, CELLS_PER_DAY - 1] {
            assert_eq!(scheme.cell_index(scheme.coordinate(index)), Some(index));
        }
        assert_eq!(scheme.cell_index(Coordinate::new(90.0, 0.0)), Some(0));
        assert_eq!(
            scheme.cell_index(Coordinate::new(-90.0, 360.0)),
            Some(CELLS_PER_DAY - NUM_COLS)
        );
        assert_eq!(scheme.cell_index(Coordinate::new(0.2, -0.5)), Some(89 * NUM_COLS + 359));
        assert_eq!(scheme.cell_index(Coordinate::new(91.0, 0.0)), None);
        assert_eq!(scheme.cell_index(Coordinate::new(0.0, f64::NAN)), None);
    }
}
