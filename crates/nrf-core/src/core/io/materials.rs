use super::error::{
    InputError, ParseErrorKind, expect_columns, parse_float, parse_int, record_fields,
};
use super::traits::DataFile;
use crate::core::models::isotope::IsotopeKey;
use crate::core::models::layers::Layers;
use crate::core::models::material::MaterialEntry;
use std::io::BufRead;

const COLUMNS: usize = 6;

/// The material list: one isotope per line,
/// `Z A n_warhead n_foil thickness_warhead thickness_foil`.
///
/// Number densities are in atoms·cm⁻² × 1e-24, thicknesses in cm. Lines whose first
/// token starts with `#` are comments.
pub struct MaterialListFile;

impl DataFile for MaterialListFile {
    type Output = Vec<MaterialEntry>;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, InputError> {
        let mut entries = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let Some(fields) = record_fields(&line) else {
                continue;
            };

            let entry = parse_entry(&fields).map_err(|kind| InputError::Parse {
                line: line_num + 1,
                kind,
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }
}

fn parse_entry(fields: &[&str]) -> Result<MaterialEntry, ParseErrorKind> {
    expect_columns(fields, COLUMNS)?;
    let isotope = IsotopeKey::new(parse_int(fields, 0, "Z")?, parse_int(fields, 1, "A")?);
    let number_density = Layers::new(
        parse_float(fields, 2, "warhead number density")?,
        parse_float(fields, 3, "foil number density")?,
    );
    let thickness = Layers::new(
        parse_float(fields, 4, "warhead thickness")?,
        parse_float(fields, 5, "foil thickness")?,
    );
    Ok(MaterialEntry::new(isotope, number_density, thickness))
}
