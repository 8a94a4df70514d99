use super::common::*;

use crate::workflows::leave::balance::{compute_balances, LeaveLimitsError, LeaveTypeLimits};
use crate::workflows::leave::domain::{LeaveRecord, LeaveStatus, LeaveType, Session};

#[test]
fn counts_only_approved_usage() {
    let records = vec![
        record(
            "l-1",
            "alice",
            LeaveType::Casual,
            days_from_today(1),
            days_from_today(2),
            Session::FullDay,
            LeaveStatus::Approved,
        ),
        record(
            "l-2",
            "alice",
            LeaveType::Casual,
            days_from_today(5),
            days_from_today(5),
            Session::FullDay,
            LeaveStatus::Pending,
        ),
        record(
            "l-3",
            "alice",
            LeaveType::Casual,
            days_from_today(6),
            days_from_today(6),
            Session::FullDay,
            LeaveStatus::Rejected,
        ),
    ];

    let balances = compute_balances(&records, 2025, &LeaveTypeLimits::default());
    let casual = balances[&LeaveType::Casual];
    assert_eq!(casual.limit, 12.0);
    assert_eq!(casual.used, 2.0);
    assert_eq!(casual.remaining, 10.0);
    assert!(!casual.overdrawn());
}

#[test]
fn reports_every_configured_type() {
    let records: Vec<LeaveRecord> = Vec::new();
    let balances = compute_balances(&records, 2025, &LeaveTypeLimits::default());
    assert_eq!(balances.len(), LeaveType::ALL.len());
    for balance in balances.values() {
        assert_eq!(balance.used, 0.0);
        assert_eq!(balance.remaining, balance.limit);
    }
}

#[test]
fn half_days_accumulate() {
    let records: Vec<_> = [Session::Forenoon, Session::Afternoon]
        .into_iter()
        .enumerate()
        .map(|(index, session)| {
            record(
                &format!("l-{index}"),
                "alice",
                LeaveType::Duty,
                days_from_today(3),
                days_from_today(3),
                session,
                LeaveStatus::Approved,
            )
        })
        .collect();

    let balances = compute_balances(&records, 2025, &LeaveTypeLimits::default());
    assert_eq!(balances[&LeaveType::Duty].used, 1.0);
    assert_eq!(balances[&LeaveType::Duty].remaining, 14.0);
}

#[test]
fn usage_is_bucketed_by_start_year() {
    let records = vec![record(
        "l-1",
        "alice",
        LeaveType::Vacation,
        days_from_today(-80),
        days_from_today(-60),
        Session::FullDay,
        LeaveStatus::Approved,
    )];

    let previous = compute_balances(&records, 2024, &LeaveTypeLimits::default());
    assert_eq!(previous[&LeaveType::Vacation].used, 21.0);

    let current = compute_balances(&records, 2025, &LeaveTypeLimits::default());
    assert_eq!(current[&LeaveType::Vacation].used, 0.0);
}

#[test]
fn overdrawn_balances_clamp_remaining_at_zero() {
    let limits = LeaveTypeLimits::from_pairs([(LeaveType::Casual, 1.0)]);
    let records = vec![record(
        "l-1",
        "alice",
        LeaveType::Casual,
        days_from_today(1),
        days_from_today(3),
        Session::FullDay,
        LeaveStatus::Approved,
    )];

    let balances = compute_balances(&records, 2025, &limits);
    let casual = balances[&LeaveType::Casual];
    assert_eq!(casual.used, 3.0);
    assert_eq!(casual.remaining, 0.0);
    assert!(casual.overdrawn());
}

#[test]
fn unconfigured_usage_shows_with_zero_limit() {
    let limits = LeaveTypeLimits::from_pairs([(LeaveType::Casual, 12.0)]);
    let records = vec![record(
        "l-1",
        "alice",
        LeaveType::Maternity,
        days_from_today(1),
        days_from_today(1),
        Session::FullDay,
        LeaveStatus::Approved,
    )];

    let balances = compute_balances(&records, 2025, &limits);
    assert_eq!(balances.len(), 2);
    assert_eq!(balances[&LeaveType::Maternity].limit, 0.0);
    assert!(balances[&LeaveType::Maternity].overdrawn());
}

#[test]
fn limits_load_from_csv() {
    let csv = "leave_type,limit\nCasual Leave,8\nduty,12.5\n";
    let limits = LeaveTypeLimits::from_reader(csv.as_bytes()).expect("limits parse");
    assert_eq!(limits.limit_for(LeaveType::Casual), Some(8.0));
    assert_eq!(limits.limit_for(LeaveType::Duty), Some(12.5));
    assert_eq!(limits.limit_for(LeaveType::Vacation), None);
}

#[test]
fn limits_reject_unknown_types_and_fractional_days() {
    let unknown = "leave_type,limit\nSabbatical,30\n";
    assert!(matches!(
        LeaveTypeLimits::from_reader(unknown.as_bytes()),
        Err(LeaveLimitsError::UnknownType(_))
    ));

    let fractional = "leave_type,limit\nCasual,2.25\n";
    assert!(matches!(
        LeaveTypeLimits::from_reader(fractional.as_bytes()),
        Err(LeaveLimitsError::InvalidLimit {
            leave_type: LeaveType::Casual,
            ..
        })
    ));

    let negative = "leave_type,limit\nCasual,-1\n";
    assert!(matches!(
        LeaveTypeLimits::from_reader(negative.as_bytes()),
        Err(LeaveLimitsError::InvalidLimit { .. })
    ));
}
