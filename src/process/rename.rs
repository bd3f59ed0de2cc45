use tracing::debug;

use crate::schema::spec_for_source;

use super::RawTable;

/// Rename the input headers to their cleaned names. Unknown headers are left alone.
/// Returns how many columns were renamed.
pub fn rename_columns(table: &mut RawTable) -> usize {
    let mut renamed = 0;
    for header in table.headers.iter_mut() {
        if let Some(spec) = spec_for_source(header) {
            debug!(from = %header, to = spec.name, "rename column");
            *header = spec.name.to_string();
            renamed += 1;
        }
    }
    renamed
}
