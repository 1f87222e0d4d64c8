//! Quantity parsing for SDL resource values.

use crate::error::DeployError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A YAML scalar that may be written as a number or a string
/// (`units: 0.5`, `units: "500m"`, `amount: 1000`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Number(n) => write!(f, "{}", n),
            Quantity::Text(s) => f.write_str(s),
        }
    }
}

/// CPU units to millicores: `1` → 1000, `0.5` → 500, `"250m"` → 250.
pub fn cpu_millis(units: &Quantity) -> Result<u64, DeployError> {
    let millis = match units {
        Quantity::Number(n) => cores_to_millis(*n)?,
        Quantity::Text(s) => match s.trim().strip_suffix('m') {
            Some(m) => m
                .parse::<u64>()
                .map_err(|_| DeployError::Sdl(format!("invalid cpu units: {}", s)))?,
            None => {
                let cores = s
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| DeployError::Sdl(format!("invalid cpu units: {}", s)))?;
                cores_to_millis(cores)?
            }
        },
    };

    if millis == 0 {
        return Err(DeployError::Sdl("cpu units must be positive".into()));
    }
    Ok(millis)
}

fn cores_to_millis(cores: f64) -> Result<u64, DeployError> {
    if !cores.is_finite() || cores < 0.0 {
        return Err(DeployError::Sdl(format!("invalid cpu units: {}", cores)));
    }
    Ok((cores * 1000.0).round() as u64)
}

/// Memory/storage size to bytes.
///
/// Binary suffixes (`Ki`, `Mi`, `Gi`, `Ti`) are powers of 1024; decimal
/// suffixes (`k`, `M`, `G`, `T`, also lowercase `Mb`/`Gb` forms) are powers
/// of 1000. A bare number is bytes.
pub fn size_bytes(size: &str) -> Result<u64, DeployError> {
    const SUFFIXES: &[(&str, u64)] = &[
        ("Ki", 1 << 10),
        ("Mi", 1 << 20),
        ("Gi", 1 << 30),
        ("Ti", 1 << 40),
        ("Kb", 1_000),
        ("Mb", 1_000_000),
        ("Gb", 1_000_000_000),
        ("Tb", 1_000_000_000_000),
        ("k", 1_000),
        ("K", 1_000),
        ("M", 1_000_000),
        ("G", 1_000_000_000),
        ("T", 1_000_000_000_000),
    ];

    let size = size.trim();
    let (num, multiplier) = SUFFIXES
        .iter()
        .find_map(|(suffix, mult)| size.strip_suffix(suffix).map(|n| (n, *mult)))
        .unwrap_or((size, 1));

    let num: u64 = num
        .trim()
        .parse()
        .map_err(|_| DeployError::Sdl(format!("invalid size: {}", size)))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| DeployError::Sdl(format!("size overflows: {}", size)))
}

/// Number of fractional digits in a Cosmos `Dec`.
const DEC_PRECISION: usize = 18;

/// Encode a decimal amount the way a Cosmos `DecCoin` carries it on the
/// wire: the integer value of `amount * 10^18`, no decimal point.
///
/// `"1000"` → `"1000000000000000000000"`, `"0.5"` → `"500000000000000000"`.
pub fn dec_amount(amount: &Quantity) -> Result<String, DeployError> {
    let text = match amount {
        Quantity::Number(n) if n.is_finite() && *n >= 0.0 => format!("{}", n),
        Quantity::Number(n) => {
            return Err(DeployError::Sdl(format!("invalid price amount: {}", n)))
        }
        Quantity::Text(s) => s.trim().to_string(),
    };

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text.as_str(), ""),
    };

    let valid = !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit());
    if !valid {
        return Err(DeployError::Sdl(format!("invalid price amount: {}", text)));
    }
    if frac_part.len() > DEC_PRECISION {
        return Err(DeployError::Sdl(format!(
            "price amount has more than {} decimals: {}",
            DEC_PRECISION, text
        )));
    }

    let mut digits = String::with_capacity(int_part.len() + DEC_PRECISION);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    digits.extend(std::iter::repeat('0').take(DEC_PRECISION - frac_part.len()));

    let trimmed = digits.trim_start_matches('0');
    Ok(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_millis() {
        assert_eq!(cpu_millis(&Quantity::Number(1.0)).unwrap(), 1000);
        assert_eq!(cpu_millis(&Quantity::Number(0.5)).unwrap(), 500);
        assert_eq!(cpu_millis(&Quantity::Text("250m".into())).unwrap(), 250);
        assert_eq!(cpu_millis(&Quantity::Text("2".into())).unwrap(), 2000);
        assert!(cpu_millis(&Quantity::Number(0.0)).is_err());
        assert!(cpu_millis(&Quantity::Text("lots".into())).is_err());
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(size_bytes("1Gi").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(size_bytes("512Mi").unwrap(), 512 * 1024 * 1024);
        assert_eq!(size_bytes("1024Ki").unwrap(), 1024 * 1024);
        assert_eq!(size_bytes("1G").unwrap(), 1_000_000_000);
        assert_eq!(size_bytes("100Mb").unwrap(), 100_000_000);
        assert_eq!(size_bytes("4096").unwrap(), 4096);
        assert!(size_bytes("big").is_err());
        assert!(size_bytes("99999999999999Ti").is_err());
    }

    #[test]
    fn test_dec_amount() {
        assert_eq!(
            dec_amount(&Quantity::Number(1000.0)).unwrap(),
            "1000000000000000000000"
        );
        assert_eq!(
            dec_amount(&Quantity::Text("0.5".into())).unwrap(),
            "500000000000000000"
        );
        assert_eq!(dec_amount(&Quantity::Text("0".into())).unwrap(), "0");
        assert!(dec_amount(&Quantity::Text("-1".into())).is_err());
        assert!(dec_amount(&Quantity::Text("1.0000000000000000001".into())).is_err());
    }
}
