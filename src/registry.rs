//! The schema registry: operating modes, their contracts of output tables,
//! the mandatory-field sets, and the curated synonym dictionary.
//!
//! Everything here is immutable static data resolved at compile time; the
//! registry is a pure lookup surface with no failure modes.

use clap::ValueEnum;
use std::fmt;

/// Operating mode selected before a run; fixed for the run's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Planning,
    NoPlanning,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Planning => write!(f, "planning"),
            Mode::NoPlanning => write!(f, "no-planning"),
        }
    }
}

/// One output CSV: its name and required logical columns in declared order.
#[derive(Debug, Clone, Copy)]
pub struct OutputTableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// A mode's full set of output table specs.
#[derive(Debug, Clone, Copy)]
pub struct Contract {
    pub mode: Mode,
    pub tables: &'static [OutputTableSpec],
}

const DRIVER_VEHICLE: OutputTableSpec = OutputTableSpec {
    name: "driver_vehicle",
    columns: &["driver_id", "site_id", "document", "phone", "vehicle_id"],
};

const VEHICLE_PLATE: OutputTableSpec = OutputTableSpec {
    name: "vehicle_plate",
    columns: &["vehicle_id", "plate", "site_id"],
};

const PLANNING_CONTRACT: Contract = Contract {
    mode: Mode::Planning,
    tables: &[
        OutputTableSpec {
            name: "depara",
            columns: &["pdv_ids", "driver_id"],
        },
        DRIVER_VEHICLE,
        VEHICLE_PLATE,
    ],
};

const NO_PLANNING_CONTRACT: Contract = Contract {
    mode: Mode::NoPlanning,
    tables: &[
        OutputTableSpec {
            name: "order_driver",
            columns: &["order_id", "date", "vehicle_id", "driver_id"],
        },
        DRIVER_VEHICLE,
        VEHICLE_PLATE,
    ],
};

const PLANNING_MANDATORY: &[&str] = &["pdv_ids", "driver_id", "vehicle_id"];
const NO_PLANNING_MANDATORY: &[&str] = &["order_id", "driver_id", "vehicle_id"];

/// Known alternate raw labels per logical column. Order within each list is
/// the tie-break when several synonyms are present in an upload. Assists
/// matching only; never authoritative.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("pdv_ids", &["poc", "pdv", "ponto_de_venda"]),
    ("driver_id", &["id_motorista", "motorista", "driver"]),
    ("vehicle_id", &["carro", "veiculo", "vehicle"]),
    ("plate", &["placa"]),
    ("site_id", &["cdd", "site"]),
    ("document", &["documento", "cpf"]),
    ("phone", &["telefone", "celular"]),
    ("order_id", &["order", "ordem", "pedido"]),
    ("date", &["data", "dia"]),
];

pub fn contract_for(mode: Mode) -> &'static Contract {
    match mode {
        Mode::Planning => &PLANNING_CONTRACT,
        Mode::NoPlanning => &NO_PLANNING_CONTRACT,
    }
}

pub fn mandatory_fields(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Planning => PLANNING_MANDATORY,
        Mode::NoPlanning => NO_PLANNING_MANDATORY,
    }
}

/// Union of every table's columns for the mode, lexicographically sorted for
/// stable display and iteration order.
pub fn all_logical_columns(mode: Mode) -> Vec<String> {
    let mut columns: Vec<String> = contract_for(mode)
        .tables
        .iter()
        .flat_map(|table| table.columns.iter().map(|c| (*c).to_string()))
        .collect();
    columns.sort();
    columns.dedup();
    columns
}

pub fn synonyms_for(logical: &str) -> Option<&'static [&'static str]> {
    SYNONYMS
        .iter()
        .find(|(name, _)| *name == logical)
        .map(|(_, list)| *list)
}
