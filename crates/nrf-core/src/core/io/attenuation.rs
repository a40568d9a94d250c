use super::error::{InputError, ParseErrorKind};
use super::traits::DataFile;
use crate::core::physics::lookup;
use std::io::BufRead;

/// Tabulated non-resonant attenuation cross sections by energy and element.
///
/// Each row holds an energy (MeV) followed by the cross sections of elements
/// `Z = 1, 2, …, max_z` at that energy. The energy grid is ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct AttenuationTable {
    energies: Vec<f64>,
    rows: Vec<Vec<f64>>,
}

impl AttenuationTable {
    pub fn new(energies: Vec<f64>, rows: Vec<Vec<f64>>) -> Result<Self, InputError> {
        if energies.is_empty() {
            return Err(InputError::Inconsistency(
                "attenuation table has no rows".to_string(),
            ));
        }
        if energies.len() != rows.len() {
            return Err(InputError::Inconsistency(format!(
                "{} energies but {} rows of cross sections",
                energies.len(),
                rows.len()
            )));
        }
        let width = rows[0].len();
        if width == 0 {
            return Err(InputError::Inconsistency(
                "attenuation table has no element columns".to_string(),
            ));
        }
        if let Some(i) = rows.iter().position(|r| r.len() != width) {
            return Err(InputError::Inconsistency(format!(
                "row {} has {} element columns, expected {}",
                i + 1,
                rows[i].len(),
                width
            )));
        }
        if !lookup::is_ascending(&energies) {
            return Err(InputError::Inconsistency(
                "attenuation energy grid is not ascending".to_string(),
            ));
        }
        Ok(Self { energies, rows })
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// Highest atomic number with a column in the table.
    pub fn max_z(&self) -> u32 {
        self.rows[0].len() as u32
    }

    pub fn covers(&self, z: u32) -> bool {
        z >= 1 && z <= self.max_z()
    }

    /// Index of the tabulated energy nearest to `energy`.
    pub fn nearest_index(&self, energy: f64) -> Option<usize> {
        lookup::nearest_index(&self.energies, energy)
    }

    /// Cross section of element `z` at the grid point `energy_index`.
    ///
    /// Column `z` of a row after its energy field, i.e. `Z = 1` is the first data column.
    pub fn cross_section(&self, energy_index: usize, z: u32) -> Option<f64> {
        if z == 0 {
            return None;
        }
        self.rows
            .get(energy_index)
            .and_then(|row| row.get(z as usize - 1))
            .copied()
    }
}

/// Reader for the `|`-delimited attenuation table: `energy | σ(Z=1) | σ(Z=2) | …`.
pub struct AttenuationTableFile;

impl DataFile for AttenuationTableFile {
    type Output = AttenuationTable;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, InputError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut energies = Vec::new();
        let mut rows = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(energies.len() + 1);

            let mut values = Vec::with_capacity(record.len());
            for (column, field) in record.iter().enumerate() {
                let value = field.parse::<f64>().map_err(|_| InputError::Parse {
                    line,
                    kind: ParseErrorKind::InvalidFloat {
                        column: column + 1,
                        name: if column == 0 { "energy" } else { "cross section" },
                        value: field.to_string(),
                    },
                })?;
                values.push(value);
            }

            let mut values = values.into_iter();
            let Some(energy) = values.next() else {
                continue;
            };
            energies.push(energy);
            rows.push(values.collect());
        }

        AttenuationTable::new(energies, rows)
    }
}
