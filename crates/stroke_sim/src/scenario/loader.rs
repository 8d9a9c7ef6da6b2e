//! Loader for the two-section hospital configuration CSV.
//!
//! Layout, one cell per comma:
//!
//! ```text
//! Parameters
//! <label>,<ischemic mean duration>
//! <label>,<hemorrhagic mean duration>
//! <label>,<non-stroke mean duration>
//! <label>,<ischemic transfer-needed probability>
//! <label>,<simulation duration>
//! <label>,<number of replications>
//! [Hemorrhagic Probability,<p>]
//! [Non-Stroke Routing,transfer-all|local|follow-transfer-rate]
//! [Admission Boundary,strict|inclusive]
//! CSC Configuration:
//! <index>,<name>,<beds>,<stroke rate>,<non-stroke rate>
//! PSC Configuration:
//! <index>,<name>,<transfer rate>,<stroke rate>,<non-stroke rate>
//! ```
//!
//! Blank rows anywhere are skipped. Facility rows with a missing column are
//! skipped as incomplete; a missing section marker is fatal.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::scenario::params::{
    AdmissionBoundary, CscConfig, NetworkConfig, NonStrokeRouting, PscConfig, SimulationParams,
};

pub const PARAMETERS_MARKER: &str = "Parameters";
pub const CSC_MARKER: &str = "CSC Configuration:";
pub const PSC_MARKER: &str = "PSC Configuration:";

/// A trimmed CSV row and its 1-based line number.
#[derive(Debug)]
struct Row {
    line: usize,
    cells: Vec<String>,
}

impl Row {
    fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }

    fn has_marker(&self, marker: &str) -> bool {
        let marker = marker.trim_end_matches(':');
        self.cells
            .iter()
            .any(|cell| cell.trim_end_matches(':') == marker)
    }

    fn cell(&self, column: usize) -> Option<&str> {
        self.cells
            .get(column)
            .map(String::as_str)
            .filter(|cell| !cell.is_empty())
    }

    fn parse<T: FromStr>(&self, column: usize, expected: &'static str) -> Result<T, ConfigError> {
        let raw = self.cell(column).unwrap_or_default();
        raw.parse().map_err(|_| ConfigError::InvalidField {
            row: self.line,
            column,
            expected,
            found: raw.to_string(),
        })
    }

    /// A facility row is complete when every column up to `last` has a value.
    fn is_complete(&self, last: usize) -> bool {
        (1..=last).all(|column| self.cell(column).is_some())
    }
}

/// Load and validate a network configuration from a CSV file.
pub fn load_network_config(path: impl AsRef<Path>) -> Result<NetworkConfig, ConfigError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading network configuration");
    parse_network_config(File::open(path)?)
}

/// Parse and validate a network configuration from any CSV source.
pub fn parse_network_config<R: Read>(reader: R) -> Result<NetworkConfig, ConfigError> {
    let rows = read_rows(reader)?;

    let parameters = find_marker(&rows, 0, PARAMETERS_MARKER)?;
    let csc = find_marker(&rows, parameters + 1, CSC_MARKER)?;
    let psc = find_marker(&rows, csc + 1, PSC_MARKER)?;

    let params = parse_parameters(&rows[parameters + 1..csc])?;
    let cscs = rows[csc + 1..psc]
        .iter()
        .filter_map(|row| complete_row(row, 4, "CSC"))
        .map(parse_csc)
        .collect::<Result<Vec<_>, _>>()?;
    let pscs = rows[psc + 1..]
        .iter()
        .filter_map(|row| complete_row(row, 4, "PSC"))
        .map(parse_psc)
        .collect::<Result<Vec<_>, _>>()?;

    let config = NetworkConfig::new(params, cscs, pscs);
    config.validate()?;
    debug!(
        cscs = config.cscs.len(),
        pscs = config.pscs.len(),
        duration = config.params.duration,
        replications = config.params.replications,
        "network configuration loaded"
    );
    Ok(config)
}

fn read_rows<R: Read>(reader: R) -> Result<Vec<Row>, ConfigError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv.records()
        .enumerate()
        .map(|(index, record)| {
            let record = record?;
            let cells = record
                .iter()
                .map(|cell| cell.trim_start_matches('\u{feff}').trim().to_string())
                .collect();
            let line = record
                .position()
                .map_or(index + 1, |position| position.line() as usize);
            Ok(Row { line, cells })
        })
        .collect()
}

fn find_marker(rows: &[Row], from: usize, marker: &'static str) -> Result<usize, ConfigError> {
    rows.iter()
        .enumerate()
        .skip(from)
        .find(|(_, row)| row.has_marker(marker))
        .map(|(index, _)| index)
        .ok_or(ConfigError::MissingSection(marker))
}

fn complete_row<'a>(row: &'a Row, last: usize, section: &str) -> Option<&'a Row> {
    if row.is_blank() {
        return None;
    }
    if !row.is_complete(last) {
        debug!(line = row.line, section, "skipping incomplete row");
        return None;
    }
    Some(row)
}

const POSITIONAL_PARAMETERS: [&str; 6] = [
    "ischemic mean duration",
    "hemorrhagic mean duration",
    "non-stroke mean duration",
    "ischemic transfer-needed probability",
    "simulation duration",
    "number of replications",
];

fn parse_parameters(rows: &[Row]) -> Result<SimulationParams, ConfigError> {
    let mut rows = rows.iter().filter(|row| !row.is_blank());
    let mut positional = Vec::with_capacity(POSITIONAL_PARAMETERS.len());
    for field in POSITIONAL_PARAMETERS {
        let row = rows.next().ok_or(ConfigError::MissingField {
            row: positional.last().map_or(0, |row: &&Row| row.line) + 1,
            field,
        })?;
        if row.cell(1).is_none() {
            return Err(ConfigError::MissingField {
                row: row.line,
                field,
            });
        }
        positional.push(row);
    }

    let mut params = SimulationParams {
        ischemic_mean_duration: positional[0].parse(1, "a duration")?,
        hemorrhagic_mean_duration: positional[1].parse(1, "a duration")?,
        non_stroke_mean_duration: positional[2].parse(1, "a duration")?,
        transfer_needed_probability: positional[3].parse(1, "a probability")?,
        duration: positional[4].parse(1, "a duration")?,
        replications: positional[5].parse(1, "a replication count")?,
        ..SimulationParams::default()
    };

    for row in rows {
        let label = row.cell(0).unwrap_or_default().to_ascii_lowercase();
        if label.contains("hemorrhagic prob") {
            params.hemorrhagic_probability = row.parse(1, "a probability")?;
        } else if label.contains("non-stroke routing") {
            params.non_stroke_routing = parse_routing(row)?;
        } else if label.contains("admission boundary") {
            params.admission_boundary = parse_boundary(row)?;
        } else {
            warn!(line = row.line, label = %label, "ignoring unknown parameter row");
        }
    }

    Ok(params)
}

fn parse_routing(row: &Row) -> Result<NonStrokeRouting, ConfigError> {
    match row.cell(1).unwrap_or_default().to_ascii_lowercase().as_str() {
        "transfer-all" => Ok(NonStrokeRouting::TransferAll),
        "local" => Ok(NonStrokeRouting::Local),
        "follow-transfer-rate" => Ok(NonStrokeRouting::FollowTransferRate),
        other => Err(ConfigError::InvalidField {
            row: row.line,
            column: 1,
            expected: "transfer-all, local or follow-transfer-rate",
            found: other.to_string(),
        }),
    }
}

fn parse_boundary(row: &Row) -> Result<AdmissionBoundary, ConfigError> {
    match row.cell(1).unwrap_or_default().to_ascii_lowercase().as_str() {
        "strict" => Ok(AdmissionBoundary::Strict),
        "inclusive" => Ok(AdmissionBoundary::Inclusive),
        other => Err(ConfigError::InvalidField {
            row: row.line,
            column: 1,
            expected: "strict or inclusive",
            found: other.to_string(),
        }),
    }
}

fn parse_csc(row: &Row) -> Result<CscConfig, ConfigError> {
    Ok(CscConfig::new(
        row.cell(1).unwrap_or_default(),
        row.parse(2, "a bed count")?,
        row.parse(3, "an arrival rate")?,
        row.parse(4, "an arrival rate")?,
    ))
}

fn parse_psc(row: &Row) -> Result<PscConfig, ConfigError> {
    Ok(PscConfig::new(
        row.cell(1).unwrap_or_default(),
        row.parse(2, "a transfer rate")?,
        row.parse(3, "an arrival rate")?,
        row.parse(4, "an arrival rate")?,
    ))
}
