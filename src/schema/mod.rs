pub mod arrow;
pub mod types;

pub use self::arrow::{known_arrow_type, map_to_arrow_type, pin_known_types};
pub use types::{spec_for, spec_for_source, ColumnKind, ColumnSpec, FILM_COLUMNS};
