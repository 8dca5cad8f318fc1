mod coordinates;
mod day;
mod header;

pub use coordinates::{
    resolve_scheme, Coordinate, CoordinateScheme, Coordinates, NorthWestScan, FIRST_BOX_CENTER,
    LAST_BOX_CENTER, SECOND_BOX_CENTER,
};
pub(crate) use day::DayDecoder;
pub use day::{
    decode_record, DayGrid, Measurement, Reading, CELLS_PER_DAY, NUM_COLS, NUM_ROWS, RECORD_SIZE,
    VALUE_SIZE,
};
pub use header::{parse_fields, read_header_fields, Header, HEADER_SIZE};
