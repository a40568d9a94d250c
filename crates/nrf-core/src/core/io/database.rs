use super::error::{
    InputError, ParseErrorKind, expect_columns, parse_float, parse_int, record_fields,
};
use super::traits::DataFile;
use crate::core::models::isotope::IsotopeKey;
use crate::core::models::line::NuclearLine;
use std::io::BufRead;

const COLUMNS: usize = 10;

/// The standalone NRF line database.
///
/// One gamma transition per line, whitespace separated:
/// `Z A E_level E_gamma width b_final b_ground J0 Jr T_Debye`. Energies and widths are
/// in MeV, the Debye temperature in K. Trailing columns are ignored. Records are returned
/// unfiltered, including widths of `inf` or `nan`.
pub struct LineDatabaseFile;

impl DataFile for LineDatabaseFile {
    type Output = Vec<NuclearLine>;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, InputError> {
        let mut records = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let Some(fields) = record_fields(&line) else {
                continue;
            };

            let record = parse_record(&fields).map_err(|kind| InputError::Parse {
                line: line_num + 1,
                kind,
            })?;
            records.push(record);
        }

        Ok(records)
    }
}

fn parse_record(fields: &[&str]) -> Result<NuclearLine, ParseErrorKind> {
    expect_columns(fields, COLUMNS)?;
    Ok(NuclearLine {
        isotope: IsotopeKey::new(parse_int(fields, 0, "Z")?, parse_int(fields, 1, "A")?),
        level_energy: parse_float(fields, 2, "level energy")?,
        gamma_energy: parse_float(fields, 3, "gamma energy")?,
        level_width: parse_float(fields, 4, "level width")?,
        branch_to_final: parse_float(fields, 5, "branch to final state")?,
        branch_to_ground: parse_float(fields, 6, "branch to ground state")?,
        ground_spin: parse_float(fields, 7, "ground spin")?,
        resonance_spin: parse_float(fields, 8, "resonance spin")?,
        debye_temperature: parse_float(fields, 9, "Debye temperature")?,
    })
}
