use std::collections::HashMap;

use crate::receipt::ReceiptRecord;
use crate::types::StatusText;

/// Aggregate delivery outcome counts over a receipt-log snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliveryTally {
    pub total: usize,
    pub statuses: usize,
    pub per_status: Vec<StatusShare>,
}

/// Per-status share of a snapshot for presentation-layer summaries.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusShare {
    pub status: StatusText,
    pub count: usize,
    pub share: f64,
}

/// Compute delivery counts per status text from a log snapshot.
pub fn delivery_tally(records: &[ReceiptRecord]) -> Option<DeliveryTally> {
    if records.is_empty() {
        return None;
    }
    let mut counts: HashMap<&StatusText, usize> = HashMap::new();
    for record in records {
        *counts.entry(&record.status_info).or_insert(0) += 1;
    }
    let total = records.len();
    let statuses = counts.len();
    let mut per_status: Vec<StatusShare> = counts
        .into_iter()
        .map(|(status, count)| StatusShare {
            status: status.clone(),
            count,
            share: count as f64 / total as f64,
        })
        .collect();
    per_status.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    Some(DeliveryTally {
        total,
        statuses,
        per_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(idx: usize, status: &str) -> ReceiptRecord {
        ReceiptRecord::new(format!("S1-{idx}-E00"), status).expect("record")
    }

    #[test]
    fn tally_of_empty_snapshot_is_none() {
        assert!(delivery_tally(&[]).is_none());
    }

    #[test]
    fn tally_orders_statuses_by_count_then_name() {
        let records = vec![
            record(1, "OK"),
            record(2, "OK"),
            record(3, "failed"),
            record(4, "OK"),
        ];
        let tally = delivery_tally(&records).expect("tally");
        assert_eq!(tally.total, 4);
        assert_eq!(tally.statuses, 2);
        assert_eq!(tally.per_status[0].status, "OK");
        assert_eq!(tally.per_status[0].count, 3);
        assert!((tally.per_status[0].share - 0.75).abs() < 1e-6);
        assert_eq!(tally.per_status[1].status, "failed");
    }
}
