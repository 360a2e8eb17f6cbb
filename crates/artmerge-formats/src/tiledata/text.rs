//! `;`-delimited text interchange for tiledata records
//!
//! Export writes one header row and one row per record. Import is
//! best-effort: malformed rows are skipped and reported by line number,
//! everything else is applied in place.

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use super::{ItemRecord, LandRecord, MetadataTable, TileFlags};

/// Header row of a land export, without the flag columns
pub const LAND_TEXT_HEADER: &str = "ID;Name;TextureID;HSAUnk1";

/// Header row of an item export, without the flag and value columns
pub const ITEM_TEXT_HEADER: &str = "ID;Name;Weight/Quantity;Layer/Quality;Gump/AnimID;Height;Hue;Class/Quantity;StackingOffset;MiscData;Unknown1;Unknown2;Unknown3";

/// Trailing item column carrying the record value
pub const VALUE_COLUMN: &str = "Value";

const LAND_FIXED_COLUMNS: usize = 4;
const ITEM_FIXED_COLUMNS: usize = 13;
const FLAG_COLUMNS: usize = 32;

/// Minimum columns of a land row
pub const LAND_MIN_COLUMNS: usize = LAND_FIXED_COLUMNS + FLAG_COLUMNS;

/// Minimum columns of an item row; the trailing value column is optional
pub const ITEM_MIN_COLUMNS: usize = ITEM_FIXED_COLUMNS + FLAG_COLUMNS;

/// Outcome of a text import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows applied to the table
    pub applied: usize,
    /// 1-based line numbers of rows that were skipped
    pub skipped: Vec<usize>,
}

impl ImportReport {
    /// Whether every data row was applied
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

fn header_row(fixed: &str, trailing: Option<&str>) -> String {
    let mut row = String::from(fixed);
    for name in TileFlags::COLUMNS {
        row.push(';');
        row.push_str(name);
    }
    if let Some(column) = trailing {
        row.push(';');
        row.push_str(column);
    }
    row
}

fn push_flags(row: &mut String, flags: TileFlags) {
    for bit in 0..FLAG_COLUMNS as u32 {
        row.push_str(if flags.bit(bit) { ";1" } else { ";0" });
    }
}

/// Parse a number, as hex when it contains `0x`
fn parse_number(field: &str) -> Option<i64> {
    let field = field.trim();
    let lower = field.to_ascii_lowercase();
    if let Some(pos) = lower.find("0x") {
        let digits = &field[pos + 2..];
        let value = i64::from_str_radix(digits, 16).ok()?;
        if field[..pos].trim() == "-" {
            Some(-value)
        } else if field[..pos].trim().is_empty() {
            Some(value)
        } else {
            None
        }
    } else {
        field.parse().ok()
    }
}

fn parse_field<T: TryFrom<i64>>(field: &str) -> Option<T> {
    parse_number(field).and_then(|value| T::try_from(value).ok())
}

/// Signed 32-bit value, also accepting the unsigned spelling of negatives
fn parse_i32_field(field: &str) -> Option<i32> {
    let value = parse_number(field)?;
    i32::try_from(value)
        .ok()
        .or_else(|| u32::try_from(value).ok().map(|v| v as i32))
}

fn parse_flags(fields: &[&str]) -> Option<TileFlags> {
    let mut flags = TileFlags::default();
    for (bit, field) in fields.iter().take(FLAG_COLUMNS).enumerate() {
        flags.set_bit(bit as u32, parse_number(field)? != 0);
    }
    Some(flags)
}

/// Data rows of a text file, paired with their 1-based line numbers
fn data_rows<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("ID;") {
                    None
                } else {
                    Some(Ok((index + 1, trimmed.to_string())))
                }
            }
            Err(e) => Some(Err(e)),
        })
}

/// Names holding a field or line separator cannot be written as one row
fn checked_name<'a>(kind: &str, id: usize, name: &'a str) -> io::Result<&'a str> {
    if name.contains([';', '\r', '\n']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{kind} 0x{id:04X} name {name:?} contains a field or line separator"),
        ));
    }
    Ok(name)
}

impl MetadataTable {
    /// Write every land record as text
    ///
    /// Fails with [`io::ErrorKind::InvalidData`] if a name contains `;`, CR or LF.
    pub fn write_land_text<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "{}", header_row(LAND_TEXT_HEADER, None))?;
        let mut row = String::new();
        for (id, record) in self.land_records().iter().enumerate() {
            row.clear();
            let _ = write!(
                row,
                "0x{:04X};{};0x{:04X};{}",
                id,
                checked_name("land", id, &record.name())?,
                record.texture_id,
                record.extra.unwrap_or(0)
            );
            push_flags(&mut row, record.flags);
            writeln!(writer, "{row}")?;
        }
        writer.flush()
    }

    /// Write every item record as text
    ///
    /// Fails with [`io::ErrorKind::InvalidData`] if a name contains `;`, CR or LF.
    pub fn write_item_text<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "{}", header_row(ITEM_TEXT_HEADER, Some(VALUE_COLUMN)))?;
        let mut row = String::new();
        for (id, record) in self.item_records().iter().enumerate() {
            row.clear();
            let _ = write!(
                row,
                "0x{:04X};{};{};{};0x{:04X};{};{};{};{};{};{};{};{}",
                id,
                checked_name("item", id, &record.name())?,
                record.weight,
                record.quality,
                record.animation,
                record.height,
                record.hue,
                record.quantity,
                record.stacking_offset,
                record.misc_data,
                record.extra.unwrap_or(0),
                record.unknown2,
                record.unknown3
            );
            push_flags(&mut row, record.flags);
            let _ = write!(row, ";{}", record.value);
            writeln!(writer, "{row}")?;
        }
        writer.flush()
    }

    /// Apply land rows from text
    pub fn read_land_text<R: BufRead>(&mut self, reader: R) -> io::Result<ImportReport> {
        let mut report = ImportReport::default();
        for row in data_rows(reader) {
            let (line_no, line) = row?;
            let fields: Vec<&str> = line.split(';').collect();
            let applied = self
                .parse_land_row(&fields)
                .is_some_and(|(id, record)| self.set_land(id, record));
            if applied {
                report.applied += 1;
            } else {
                report.skipped.push(line_no);
            }
        }
        Ok(report)
    }

    /// Apply item rows from text
    pub fn read_item_text<R: BufRead>(&mut self, reader: R) -> io::Result<ImportReport> {
        let mut report = ImportReport::default();
        for row in data_rows(reader) {
            let (line_no, line) = row?;
            let fields: Vec<&str> = line.split(';').collect();
            let applied = self
                .parse_item_row(&fields)
                .is_some_and(|(id, record)| self.set_item(id, record));
            if applied {
                report.applied += 1;
            } else {
                report.skipped.push(line_no);
            }
        }
        Ok(report)
    }

    fn parse_land_row(&self, fields: &[&str]) -> Option<(usize, LandRecord)> {
        if fields.len() < LAND_MIN_COLUMNS {
            return None;
        }
        let id: usize = parse_field(fields[0])?;
        let mut record = self.land(id)?.clone();
        record.set_name(fields[1]);
        record.texture_id = parse_field(fields[2])?;
        let extra = parse_i32_field(fields[3])?;
        if self.format().is_extended() {
            record.extra = Some(extra);
        }
        record.flags = parse_flags(&fields[LAND_FIXED_COLUMNS..])?;
        Some((id, record))
    }

    fn parse_item_row(&self, fields: &[&str]) -> Option<(usize, ItemRecord)> {
        if fields.len() < ITEM_MIN_COLUMNS {
            return None;
        }
        let id: usize = parse_field(fields[0])?;
        let mut record = self.item(id)?.clone();
        record.set_name(fields[1]);
        record.weight = parse_field(fields[2])?;
        record.quality = parse_field(fields[3])?;
        record.animation = parse_field(fields[4])?;
        record.height = parse_field(fields[5])?;
        record.hue = parse_field(fields[6])?;
        record.quantity = parse_field(fields[7])?;
        record.stacking_offset = parse_field(fields[8])?;
        record.misc_data = parse_field(fields[9])?;
        let extra = parse_i32_field(fields[10])?;
        if self.format().is_extended() {
            record.extra = Some(extra);
        }
        record.unknown2 = parse_field(fields[11])?;
        record.unknown3 = parse_field(fields[12])?;
        record.flags = parse_flags(&fields[ITEM_FIXED_COLUMNS..])?;
        if let Some(value) = fields.get(ITEM_MIN_COLUMNS) {
            record.value = parse_field(value)?;
        }
        Some((id, record))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tiledata::TileDataFormat;
    use pretty_assertions::assert_eq;

    fn export_items(table: &MetadataTable) -> String {
        let mut out = Vec::new();
        table.write_item_text(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn export_land(table: &MetadataTable) -> String {
        let mut out = Vec::new();
        table.write_land_text(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0x1F"), Some(31));
        assert_eq!(parse_number("0X1f"), Some(31));
        assert_eq!(parse_number(" 42 "), Some(42));
        assert_eq!(parse_number("-3"), Some(-3));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_i32_field("0xFFFFFFFF"), Some(-1));
        assert_eq!(parse_field::<u8>("256"), None);
    }

    #[test]
    fn test_land_header_and_row() {
        let mut table = MetadataTable::new(TileDataFormat::Legacy, 0);
        let mut record = LandRecord {
            texture_id: 0x00AB,
            flags: TileFlags::new(TileFlags::WET | TileFlags::STAIR_RIGHT),
            ..LandRecord::default()
        };
        record.set_name("water");
        table.set_land(2, record);

        let text = export_land(&table);
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("ID;Name;TextureID;HSAUnk1;Background;Weapon;"));
        assert!(header.ends_with(";StairBack;StairRight"));
        assert_eq!(header.split(';').count(), LAND_MIN_COLUMNS);

        let row = lines.nth(2).unwrap();
        let expected_flags = "0;0;0;0;0;0;0;1;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;1";
        assert_eq!(row, format!("0x0002;water;0x00AB;0;{expected_flags}"));
        assert_eq!(text.lines().count(), 1 + 0x4000);
    }

    #[test]
    fn test_item_columns() {
        let table = MetadataTable::new(TileDataFormat::Legacy, 1);
        let text = export_items(&table);
        let header = text.lines().next().unwrap();
        assert_eq!(header.split(';').count(), ITEM_MIN_COLUMNS + 1);
        assert!(header.ends_with(";StairRight;Value"));
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("0x0000;;0;0;0x0000;"));
        assert_eq!(row.split(';').count(), ITEM_MIN_COLUMNS + 1);
    }

    #[test]
    fn test_separator_in_name_is_refused() {
        let mut table = MetadataTable::new(TileDataFormat::Legacy, 1);
        let mut item = table.item(3).unwrap().clone();
        item.set_name("a;b");
        table.set_item(3, item);
        let err = table.write_item_text(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("item 0x0003"));

        let mut land = table.land(5).unwrap().clone();
        land.set_name("two\nlines");
        table.set_land(5, land);
        let err = table.write_land_text(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_item_text_round_trip() {
        let mut table = MetadataTable::new(TileDataFormat::Extended, 2);
        let mut record = ItemRecord {
            flags: TileFlags::new(TileFlags::WEARABLE | TileFlags::ARTICLE_A),
            extra: Some(-7),
            weight: 255,
            quality: 4,
            misc_data: -300,
            unknown2: 9,
            quantity: 1,
            animation: 0x03CA,
            unknown3: 2,
            hue: 33,
            stacking_offset: 5,
            value: 77,
            height: 12,
            ..ItemRecord::default()
        };
        record.set_name("leather tunic");
        table.set_item(40, record);

        let text = export_items(&table);
        let mut imported = MetadataTable::new(TileDataFormat::Extended, 2);
        let report = imported.read_item_text(text.as_bytes()).unwrap();
        assert_eq!(report.applied, 64);
        assert!(report.is_clean());
        assert_eq!(imported, table);
    }

    #[test]
    fn test_land_text_round_trip_extended() {
        let mut table = MetadataTable::new(TileDataFormat::Extended, 0);
        let mut record = LandRecord {
            flags: TileFlags::new(TileFlags::IMPASSABLE),
            extra: Some(123_456),
            texture_id: 0x1234,
            ..LandRecord::default()
        };
        record.set_name("rock");
        table.set_land(0x3FFF, record);

        let text = export_land(&table);
        let mut imported = MetadataTable::new(TileDataFormat::Extended, 0);
        let report = imported.read_land_text(text.as_bytes()).unwrap();
        assert_eq!(report.applied, 0x4000);
        assert_eq!(imported, table);
    }

    #[test]
    fn test_import_skips_bad_rows() {
        let flags = ";0".repeat(32);
        let text = format!(
            "# comment\n\
             ID;Name;TextureID;HSAUnk1\n\
             \n\
             0x0001;grass;0x0003;0{flags}\n\
             0x0002;short;1\n\
             0x4000;out of range;0x0001;0{flags}\n\
             0x0003;bad;0xZZ;0{flags}\n\
             5;dirt;7;99{flags}\n"
        );
        let mut table = MetadataTable::new(TileDataFormat::Legacy, 0);
        let report = table.read_land_text(text.as_bytes()).unwrap();
        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped, vec![5, 6, 7]);
        assert_eq!(table.land(1).unwrap().name(), "grass");
        assert_eq!(table.land(5).unwrap().texture_id, 7);
        // extra is ignored in the legacy layout
        assert_eq!(table.land(5).unwrap().extra, None);
    }

    #[test]
    fn test_import_without_value_column() {
        let mut table = MetadataTable::new(TileDataFormat::Legacy, 1);
        let mut existing = ItemRecord {
            value: 9,
            ..ItemRecord::default()
        };
        existing.set_name("old");
        table.set_item(3, existing);

        let mut flags = ";0".repeat(32);
        flags.replace_range(flags.len() - 1.., "1");
        let text = format!("0x0003;lamp;2;0;0x0A15;3;0;0;0;0;0;0;0{flags}\n");
        let report = table.read_item_text(text.as_bytes()).unwrap();
        assert_eq!(report.applied, 1);

        let record = table.item(3).unwrap();
        assert_eq!(record.name(), "lamp");
        assert_eq!(record.animation, 0x0A15);
        assert_eq!(record.value, 9);
        assert!(record.flags.has(TileFlags::STAIR_RIGHT));
    }

    #[test]
    fn test_nonzero_flag_values_set_bits() {
        let mut table = MetadataTable::new(TileDataFormat::Legacy, 0);
        let text = format!("0x0000;;0;0;7{}\n", ";0".repeat(31));
        let report = table.read_land_text(text.as_bytes()).unwrap();
        assert_eq!(report.applied, 1);
        assert!(table.land(0).unwrap().flags.has(TileFlags::BACKGROUND));
    }
}
