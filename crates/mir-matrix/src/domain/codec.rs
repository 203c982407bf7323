//! Sequence state codec.
//!
//! Status encoders have renumbered the sequence state enum between releases,
//! so the code -> phase table is pinned to a [`SchemaVersion`] instead of
//! being hard-coded into the renderer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use mir_status_types::SequenceCode;
use serde::{Deserialize, Serialize};

/// Status document schema the sequence codes were produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaVersion {
    /// First demo encoder: queued, digested, invalid, validated, prepared, committed
    #[default]
    V1,
    /// Later encoder: allocated, pending requests, ready, preprepared, prepared, committed
    V2,
}

impl SchemaVersion {
    /// Phases for codes 1 through 6, in code order.
    fn phases(&self) -> [SequencePhase; 6] {
        match self {
            SchemaVersion::V1 => [
                SequencePhase::Queued,
                SequencePhase::Digested,
                SequencePhase::Invalid,
                SequencePhase::Validated,
                SequencePhase::Prepared,
                SequencePhase::Committed,
            ],
            SchemaVersion::V2 => [
                SequencePhase::Allocated,
                SequencePhase::Queued,
                SequencePhase::Ready,
                SequencePhase::Preprepared,
                SequencePhase::Prepared,
                SequencePhase::Committed,
            ],
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 => write!(f, "v1"),
            SchemaVersion::V2 => write!(f, "v2"),
        }
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(SchemaVersion::V1),
            "v2" | "2" => Ok(SchemaVersion::V2),
            other => Err(format!("unknown schema version '{other}' (expected v1 or v2)")),
        }
    }
}

/// Protocol phase a sequence number has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePhase {
    /// No activity yet
    Empty,
    Allocated,
    Queued,
    Digested,
    Invalid,
    Validated,
    Ready,
    Preprepared,
    Prepared,
    Committed,
    /// Code not present in the active table
    Unknown,
}

impl SequencePhase {
    /// Single-glyph label for table cells.
    pub fn text(&self) -> &'static str {
        match self {
            SequencePhase::Empty => "",
            SequencePhase::Allocated => "A",
            SequencePhase::Queued => "Q",
            SequencePhase::Digested => "D",
            SequencePhase::Invalid => "I",
            SequencePhase::Validated => "V",
            SequencePhase::Ready => "R",
            // the batch has been validated by the time it is preprepared
            SequencePhase::Preprepared => "V",
            SequencePhase::Prepared => "P",
            SequencePhase::Committed => "C",
            SequencePhase::Unknown => "?",
        }
    }

    pub fn color(&self) -> SymbolColor {
        match self {
            SequencePhase::Empty => SymbolColor::Blank,
            SequencePhase::Invalid => SymbolColor::Invalid,
            SequencePhase::Committed => SymbolColor::Committed,
            SequencePhase::Unknown => SymbolColor::Unknown,
            _ => SymbolColor::Progress,
        }
    }
}

/// Color class of a rendered cell. The rendering layer picks actual colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolColor {
    Blank,
    /// In-flight phase (drawn yellow)
    Progress,
    Invalid,
    Committed,
    Unknown,
}

/// Display form of one sequence state code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequenceSymbol {
    pub code: SequenceCode,
    pub phase: SequencePhase,
    pub text: &'static str,
    pub color: SymbolColor,
}

/// Maps sequence state codes to display symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCodec {
    version: Option<SchemaVersion>,
    table: BTreeMap<SequenceCode, SequencePhase>,
}

impl Default for SequenceCodec {
    fn default() -> Self {
        Self::for_version(SchemaVersion::default())
    }
}

impl SequenceCodec {
    /// Codec pinned to a known schema version.
    pub fn for_version(version: SchemaVersion) -> Self {
        let table = (1..)
            .zip(version.phases())
            .collect::<BTreeMap<SequenceCode, SequencePhase>>();
        Self {
            version: Some(version),
            table,
        }
    }

    /// Codec for a custom schema. Code 0 is always blank; an entry for it is ignored.
    pub fn from_table(entries: impl IntoIterator<Item = (SequenceCode, SequencePhase)>) -> Self {
        let table = entries.into_iter().filter(|(code, _)| *code != 0).collect();
        Self {
            version: None,
            table,
        }
    }

    /// Schema this codec was built for, `None` for custom tables.
    pub fn version(&self) -> Option<SchemaVersion> {
        self.version
    }

    /// Phase for `code`. Never fails: unmapped codes resolve to `Unknown`.
    pub fn phase_for(&self, code: SequenceCode) -> SequencePhase {
        if code == 0 {
            return SequencePhase::Empty;
        }
        self.table
            .get(&code)
            .copied()
            .unwrap_or(SequencePhase::Unknown)
    }

    pub fn symbol_for(&self, code: SequenceCode) -> SequenceSymbol {
        let phase = self.phase_for(code);
        SequenceSymbol {
            code,
            phase,
            text: phase.text(),
            color: phase.color(),
        }
    }
}
