//! Parsing of human readable resource amounts.
//!
//! Cpu amounts are normalized to millicores and memory amounts to bytes.
//! Each parsed amount can be rendered as the bare integer used in scheduler
//! hint labels or as a unit suffixed [`Quantity`] for container resources.
//!
//! Memory suffixes follow the Kubernetes convention: `k`, `M`, `G`, `T`, `P`, `E`
//! are powers of 1000 and `Ki`, `Mi`, `Gi`, `Ti`, `Pi`, `Ei` are powers of 1024.
use std::fmt;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

const MILLIS_PER_CORE: u64 = 1000;

const DECIMAL_SUFFIXES: [(&str, u64); 6] = [
    ("k", 1_000),
    ("M", 1_000_000),
    ("G", 1_000_000_000),
    ("T", 1_000_000_000_000),
    ("P", 1_000_000_000_000_000),
    ("E", 1_000_000_000_000_000_000),
];

const BINARY_SUFFIXES: [(&str, u64); 6] = [
    ("Ki", 1 << 10),
    ("Mi", 1 << 20),
    ("Gi", 1 << 30),
    ("Ti", 1 << 40),
    ("Pi", 1 << 50),
    ("Ei", 1 << 60),
];

/// Kind of a container resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    /// Cpu, measured in millicores
    Cpu,
    /// Memory, measured in bytes
    Memory,
}

impl ResourceKind {
    /// Name of the resource as used in container resource maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Memory => "memory",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource string did not match the grammar of its field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field} quantity {value:?}")]
pub struct InvalidQuantity {
    /// Field that failed to parse, i.e. cpu, memory or duration
    pub field: &'static str,
    /// The raw value
    pub value: String,
}

impl InvalidQuantity {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_owned(),
        }
    }
}

/// Which suffix family a memory amount was written in, used when rendering.
#[derive(Clone, Copy, Debug)]
enum SuffixFamily {
    Decimal,
    Binary,
}

/// A parsed resource amount.
///
/// Equality is numeric: `"2"` and `"2000m"` cpu are equal, as are `"1G"` and `"1000M"`.
#[derive(Clone, Copy, Debug)]
pub struct ResourceQuantity {
    kind: ResourceKind,
    value: u64,
    family: SuffixFamily,
}

impl PartialEq for ResourceQuantity {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

impl Eq for ResourceQuantity {}

impl ResourceQuantity {
    /// Parse a raw amount of the given kind.
    pub fn parse(raw: &str, kind: ResourceKind) -> Result<Self, InvalidQuantity> {
        let invalid = || InvalidQuantity::new(kind.as_str(), raw);
        match kind {
            ResourceKind::Cpu => Ok(Self {
                kind,
                value: parse_millicores(raw).ok_or_else(invalid)?,
                family: SuffixFamily::Decimal,
            }),
            ResourceKind::Memory => {
                let (value, family) = parse_bytes(raw).ok_or_else(invalid)?;
                Ok(Self {
                    kind,
                    value,
                    family,
                })
            }
        }
    }

    /// Build a cpu amount from millicores.
    pub fn millicores(value: u64) -> Self {
        Self {
            kind: ResourceKind::Cpu,
            value,
            family: SuffixFamily::Decimal,
        }
    }

    /// Build a memory amount from bytes.
    pub fn bytes(value: u64) -> Self {
        Self {
            kind: ResourceKind::Memory,
            value,
            family: SuffixFamily::Decimal,
        }
    }

    /// Kind of the resource.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Amount in the base unit of its kind: millicores for cpu, bytes for memory.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Compact numeric form used in scheduler hint labels.
    pub fn hint(&self) -> String {
        self.value.to_string()
    }

    /// Unit suffixed form used in container resource requests and limits.
    pub fn to_quantity(&self) -> Quantity {
        let rendered = match self.kind {
            ResourceKind::Cpu if self.value % MILLIS_PER_CORE == 0 => {
                (self.value / MILLIS_PER_CORE).to_string()
            }
            ResourceKind::Cpu => format!("{}m", self.value),
            ResourceKind::Memory => {
                let suffixes = match self.family {
                    SuffixFamily::Decimal => &DECIMAL_SUFFIXES,
                    SuffixFamily::Binary => &BINARY_SUFFIXES,
                };
                suffixes
                    .iter()
                    .rev()
                    .find(|(_, factor)| self.value != 0 && self.value % factor == 0)
                    .map(|(suffix, factor)| format!("{}{}", self.value / factor, suffix))
                    .unwrap_or_else(|| self.value.to_string())
            }
        };
        Quantity(rendered)
    }
}

/// Parse a sleep duration in whole seconds.
pub fn parse_duration_seconds(raw: &str) -> Result<u64, InvalidQuantity> {
    parse_digits(raw).ok_or_else(|| InvalidQuantity::new("duration", raw))
}

fn parse_digits(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn parse_millicores(raw: &str) -> Option<u64> {
    if let Some(millis) = raw.strip_suffix('m') {
        return parse_digits(millis);
    }
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    if raw.contains('.') && fraction.is_empty() {
        return None;
    }
    let cores = if whole.is_empty() && !fraction.is_empty() {
        0
    } else {
        parse_digits(whole)?
    };
    // Anything finer than a millicore must be zero padding.
    let (millis, rest) = fraction.split_at(fraction.len().min(3));
    if !rest.bytes().all(|b| b == b'0') {
        return None;
    }
    let millis = if millis.is_empty() {
        0
    } else {
        parse_digits(millis)? * 10u64.pow(3 - millis.len() as u32)
    };
    cores.checked_mul(MILLIS_PER_CORE)?.checked_add(millis)
}

fn parse_bytes(raw: &str) -> Option<(u64, SuffixFamily)> {
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, suffix) = raw.split_at(split);
    let amount = parse_digits(digits)?;
    if suffix.is_empty() {
        return Some((amount, SuffixFamily::Decimal));
    }
    if let Some((_, factor)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some((amount.checked_mul(*factor)?, SuffixFamily::Binary));
    }
    let (_, factor) = DECIMAL_SUFFIXES.iter().find(|(s, _)| *s == suffix)?;
    Some((amount.checked_mul(*factor)?, SuffixFamily::Decimal))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu(raw: &str) -> ResourceQuantity {
        ResourceQuantity::parse(raw, ResourceKind::Cpu).unwrap()
    }
    fn memory(raw: &str) -> ResourceQuantity {
        ResourceQuantity::parse(raw, ResourceKind::Memory).unwrap()
    }

    #[test]
    fn cores_and_millicores_are_equal() {
        assert_eq!(cpu("2"), cpu("2000m"));
        assert_eq!(cpu("2").value(), 2000);
        assert_eq!(cpu("0.5"), cpu("500m"));
        assert_eq!(cpu(".25").value(), 250);
        assert_eq!(cpu("1.5000").value(), 1500);
    }

    #[test]
    fn memory_suffixes() {
        assert_eq!(memory("8G").value(), 8_000_000_000);
        assert_eq!(memory("8Gi").value(), 8_589_934_592);
        assert_eq!(memory("512Mi").value(), 536_870_912);
        assert_eq!(memory("4k").value(), 4_000);
        assert_eq!(memory("1000").value(), 1_000);
        assert_eq!(memory("1G"), memory("1000M"));
        assert_eq!(memory("8G"), memory("8000000000"));
    }

    #[test]
    fn rejects_malformed_values() {
        for raw in ["abc", "", "2x", "1.", "0.0005", "-1", "2 m", "1e3"] {
            assert_eq!(
                ResourceQuantity::parse(raw, ResourceKind::Cpu),
                Err(InvalidQuantity {
                    field: "cpu",
                    value: raw.to_owned()
                }),
                "{raw:?} should not parse as cpu"
            );
        }
        for raw in ["8GB", "G", "1.5G", "8g", "20E"] {
            assert!(
                ResourceQuantity::parse(raw, ResourceKind::Memory).is_err(),
                "{raw:?} should not parse as memory"
            );
        }
    }

    #[test]
    fn hint_is_base_unit() {
        assert_eq!(cpu("2").hint(), "2000");
        assert_eq!(cpu("250m").hint(), "250");
        assert_eq!(memory("8G").hint(), "8000000000");
    }

    #[test]
    fn quantity_is_canonical() {
        assert_eq!(cpu("2").to_quantity(), Quantity("2".to_owned()));
        assert_eq!(cpu("2000m").to_quantity(), Quantity("2".to_owned()));
        assert_eq!(cpu("0.5").to_quantity(), Quantity("500m".to_owned()));
        assert_eq!(memory("8G").to_quantity(), Quantity("8G".to_owned()));
        assert_eq!(memory("8000M").to_quantity(), Quantity("8G".to_owned()));
        assert_eq!(memory("1536Mi").to_quantity(), Quantity("1536Mi".to_owned()));
        assert_eq!(memory("1500").to_quantity(), Quantity("1500".to_owned()));
        assert_eq!(memory("0").to_quantity(), Quantity("0".to_owned()));
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration_seconds("50"), Ok(50));
        assert_eq!(
            parse_duration_seconds("50s"),
            Err(InvalidQuantity {
                field: "duration",
                value: "50s".to_owned()
            })
        );
    }
}
