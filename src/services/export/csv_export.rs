use csv::{Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::model::table::{Table, HEADERS};

pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// BOM-prefixed UTF-8 CSV with the header line first.
pub fn write_table(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut buf: Vec<u8> = UTF8_BOM.to_vec();

    {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut buf);

        writer.write_record(HEADERS)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
    }

    Ok(buf)
}
