use rand::Rng;

use crate::srv::record::SrvRecord;

/// Picks one record the way RFC 2782 clients do: only the lowest priority
/// value is considered, and within it each record is chosen with probability
/// proportional to its weight.
///
/// When every candidate has weight 0 the first one is returned, so the result
/// is deterministic. A zero-weight record is never picked by the weighted draw.
pub fn select_target<'a, R>(records: &'a [SrvRecord], rng: &mut R) -> Option<&'a SrvRecord>
where
    R: Rng + ?Sized,
{
    let min_priority = records.iter().map(|record| record.priority).min()?;
    let candidates: Vec<&SrvRecord> = records
        .iter()
        .filter(|record| record.priority == min_priority)
        .collect();

    let total_weight: u64 = candidates.iter().map(|record| u64::from(record.weight)).sum();
    if total_weight == 0 {
        return candidates.first().copied();
    }

    let draw = rng.gen_range(0..total_weight);
    let mut cumulative = 0;
    for &candidate in &candidates {
        cumulative += u64::from(candidate.weight);
        if cumulative > draw {
            return Some(candidate);
        }
    }
    candidates.last().copied()
}
