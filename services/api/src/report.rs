use leave_portal::workflows::leave::{
    compute_balances, LeaveRecord, LeaveType, LeaveTypeLimits, UserId,
};
use serde::Serialize;

/// Per-type balance line as rendered by the CLI and the report endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BalanceLine {
    pub(crate) leave_type: LeaveType,
    pub(crate) limit: f64,
    pub(crate) used: f64,
    pub(crate) remaining: f64,
    pub(crate) overdrawn: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BalanceReport {
    pub(crate) user_id: UserId,
    pub(crate) year: i32,
    pub(crate) records_considered: usize,
    pub(crate) balances: Vec<BalanceLine>,
}

impl BalanceReport {
    /// Balance report for one user out of a mixed export.
    pub(crate) fn build(
        records: &[LeaveRecord],
        user_id: UserId,
        year: i32,
        limits: &LeaveTypeLimits,
    ) -> Self {
        let owned: Vec<&LeaveRecord> = records
            .iter()
            .filter(|record| record.user_id == user_id)
            .collect();
        let balances = compute_balances(owned.iter().copied(), year, limits)
            .into_iter()
            .map(|(leave_type, balance)| BalanceLine {
                leave_type,
                limit: balance.limit,
                used: balance.used,
                remaining: balance.remaining,
                overdrawn: balance.overdrawn(),
            })
            .collect();

        Self {
            user_id,
            year,
            records_considered: owned.len(),
            balances,
        }
    }

    pub(crate) fn render(&self) {
        println!("Leave balances for {} ({})", self.user_id, self.year);
        println!("Records considered: {}", self.records_considered);
        for line in &self.balances {
            let flag = if line.overdrawn { " (overdrawn)" } else { "" };
            println!(
                "- {}: {} used of {} | {} remaining{}",
                line.leave_type, line.used, line.limit, line.remaining, flag
            );
        }
    }
}
