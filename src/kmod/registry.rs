// File: src/kmod/registry.rs
//
// Parsing of the loaded module registry (/proc/modules).

use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// Returns true when a line of `registry` names `module` as its first column.
///
/// The match is anchored at the start of the line and requires the separating
/// space, so `myvrf_custom` or `vrf_helper` never satisfy `vrf`.
pub fn is_listed(registry: &str, module: &str) -> bool {
    registry.split('\n').any(|line| {
        line.strip_prefix(module)
            .map_or(false, |rest| rest.starts_with(' '))
    })
}

/// Parsed entries of `registry`, skipping blank lines.
pub fn entries(registry: &str) -> impl Iterator<Item = Result<ModuleEntry, RegistryError>> + '_ {
    registry
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(str::parse)
}

/// First well-formed entry whose name is exactly `module`.
pub fn find(registry: &str, module: &str) -> Option<ModuleEntry> {
    entries(registry)
        .filter_map(Result::ok)
        .find(|e| e.name == module)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Live,
    Loading,
    Unloading,
}

impl FromStr for ModuleState {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Live" => Ok(ModuleState::Live),
            "Loading" => Ok(ModuleState::Loading),
            "Unloading" => Ok(ModuleState::Unloading),
            _ => Err(RegistryError::InvalidField {
                field: "state",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ModuleState::Live => "Live",
            ModuleState::Loading => "Loading",
            ModuleState::Unloading => "Unloading",
        };
        write!(f, "{}", s)
    }
}

/// One line of the registry:
/// `name size refcount dependents state address [taint]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub name: String,
    pub size: u64,
    pub refcount: u32,
    pub dependents: Vec<String>,
    pub state: ModuleState,
    pub address: u64,
    pub taint: Option<String>,
}

fn field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<&'a str, RegistryError> {
    fields.next().ok_or(RegistryError::MissingField(name))
}

fn invalid(field: &'static str, value: &str) -> RegistryError {
    RegistryError::InvalidField {
        field,
        value: value.to_string(),
    }
}

impl FromStr for ModuleEntry {
    type Err = RegistryError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_whitespace();

        let name = field(&mut fields, "name")?.to_string();

        let size = field(&mut fields, "size")?;
        let size: u64 = size.parse().map_err(|_| invalid("size", size))?;

        // "-" when the refcount is not tracked (built without unload support)
        let refcount: u32 = match field(&mut fields, "refcount")? {
            "-" => 0,
            r => r.parse().map_err(|_| invalid("refcount", r))?,
        };

        let dependents = match field(&mut fields, "dependents")? {
            "-" => vec![],
            d => d
                .split(',')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        };

        let state: ModuleState = field(&mut fields, "state")?.parse()?;

        let address = field(&mut fields, "address")?;
        let hex = address
            .strip_prefix("0x")
            .ok_or_else(|| invalid("address", address))?;
        let address = u64::from_str_radix(hex, 16).map_err(|_| invalid("address", address))?;

        let taint = fields
            .next()
            .map(|t| t.trim_start_matches('(').trim_end_matches(')').to_string());

        Ok(ModuleEntry {
            name,
            size,
            refcount,
            dependents,
            state,
            address,
            taint,
        })
    }
}
