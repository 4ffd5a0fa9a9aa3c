use std::time::Duration;

use lumen_core::error::{LumenError, Result};

/// Parse a collector-style duration: one or more `<int><unit>` terms with
/// units `y w d h m s ms`, largest first (`1h30m`, `5m`, `500ms`).
pub fn parse_duration(s: &str) -> Result<Duration> {
    let bad = || LumenError::Configuration(format!("invalid duration {s:?}"));
    if s.is_empty() {
        return Err(bad());
    }

    let mut total_ms: u64 = 0;
    let mut last_rank = usize::MAX;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(bad)?;
        if digits == 0 {
            return Err(bad());
        }
        let n: u64 = rest[..digits].parse().map_err(|_| bad())?;
        rest = &rest[digits..];

        let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let (unit, tail) = rest.split_at(unit_len);
        let (rank, ms) = match unit {
            "y" => (6, 365 * 24 * 3_600_000),
            "w" => (5, 7 * 24 * 3_600_000),
            "d" => (4, 24 * 3_600_000),
            "h" => (3, 3_600_000),
            "m" => (2, 60_000),
            "s" => (1, 1_000),
            "ms" => (0, 1),
            _ => return Err(bad()),
        };
        if rank >= last_rank {
            return Err(bad());
        }
        last_rank = rank;
        total_ms = n
            .checked_mul(ms)
            .and_then(|v| total_ms.checked_add(v))
            .ok_or_else(bad)?;
        rest = tail;
    }
    Ok(Duration::from_millis(total_ms))
}
