use crate::infra::{InMemoryDirectory, InMemoryLeaveRepository};
use crate::report::BalanceReport;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime};
use clap::Args;
use leave_portal::config::{AppConfig, ConfigError};
use leave_portal::error::AppError;
use leave_portal::workflows::leave::{
    ActorContext, Clock, FixedClock, LeaveRecord, LeaveRecordImporter, LeaveRequestDraft,
    LeaveService, LeaveType, LeaveTypeLimits, Role, Session, SystemClock, UserId,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct BalanceArgs {
    /// CSV export of leave records
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// User whose balances should be reported
    #[arg(long)]
    pub(crate) user: String,
    /// Calendar year to report (defaults to the current year)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Leave limit table (defaults to LEAVE_LIMITS_PATH or the built-in allowances)
    #[arg(long)]
    pub(crate) limits: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for the walk-through (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_balances(args: BalanceArgs) -> Result<(), AppError> {
    let BalanceArgs {
        records,
        user,
        year,
        limits,
    } = args;

    let limits = match limits {
        Some(path) => LeaveTypeLimits::from_path(&path)
            .map_err(|source| ConfigError::LeaveLimits { path, source })?,
        None => AppConfig::load()?.leave.load_limits()?,
    };
    let records = LeaveRecordImporter::from_path(records)?;
    let year = year.unwrap_or_else(|| SystemClock.now().year());

    BalanceReport::build(&records, UserId(user), year, &limits).render();
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let morning = today.and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default());

    let repository = Arc::new(InMemoryLeaveRepository::default());
    let service = LeaveService::new(
        repository,
        Arc::new(InMemoryDirectory::sample()),
        LeaveTypeLimits::default(),
    )
    .with_clock(Arc::new(FixedClock(morning)));

    let asha = ActorContext::new("asha", Role::Staff, Some("CSE"));
    let meera = ActorContext::new("meera", Role::Staff, Some("EEE"));
    let hod_cse = ActorContext::new("hod-cse", Role::Hod, Some("CSE"));
    let hod_eee = ActorContext::new("hod-eee", Role::Hod, Some("EEE"));
    let director = ActorContext::new("director", Role::Director, None);
    let principal = ActorContext::new("principal", Role::Principal, None);
    let admin = ActorContext::new("admin", Role::Admin, None);

    println!("Leave portal demo (reference time {morning})");

    let window = service.submission_window(Some(today));
    let sessions: Vec<&str> = window
        .available_sessions
        .iter()
        .map(|session| session.label())
        .collect();
    println!(
        "Earliest start date {} | sessions open today: {}",
        window.min_start_date,
        sessions.join(", ")
    );

    println!("\nCasual leave through HOD and principal");
    let casual = service.submit(
        &asha,
        demo_draft(
            LeaveType::Casual,
            today + Duration::days(1),
            today + Duration::days(2),
            Session::FullDay,
            "Sister's wedding",
        ),
    )?;
    print_record("submitted", &casual);

    match service.submit(
        &asha,
        demo_draft(
            LeaveType::Duty,
            today + Duration::days(2),
            today + Duration::days(2),
            Session::Forenoon,
            "Exam duty",
        ),
    ) {
        Ok(record) => print_record("unexpectedly accepted", &record),
        Err(err) => println!("- overlapping request refused: {err}"),
    }

    let casual = service.recommend(&hod_cse, &casual.id)?;
    print_record("recommended", &casual);
    let casual = service.approve(&principal, &casual.id)?;
    print_record("approved", &casual);

    println!("\nCompensatory leave through the director");
    let compensatory = service.submit(
        &meera,
        demo_draft(
            LeaveType::Compensatory,
            today + Duration::days(5),
            today + Duration::days(5),
            Session::Afternoon,
            "Weekend lab duty",
        ),
    )?;
    print_record("submitted", &compensatory);
    let compensatory = service.recommend(&hod_eee, &compensatory.id)?;
    print_record("recommended", &compensatory);

    if let Err(err) = service.approve(&principal, &compensatory.id) {
        println!("- principal held back: {err}");
    }
    let compensatory = service.recommend(&director, &compensatory.id)?;
    print_record("recommended", &compensatory);
    let compensatory = service.approve(&principal, &compensatory.id)?;
    print_record("approved", &compensatory);

    println!("\nBalances for {} ({})", asha.user_id, today.year());
    for (leave_type, balance) in service.balances(&asha.user_id, today.year())? {
        println!(
            "- {}: {} used of {} | {} remaining",
            leave_type, balance.used, balance.limit, balance.remaining
        );
    }

    let summary = service.summary(&admin)?;
    println!(
        "\nPortal summary: {} total | {} pending | {} recommended | {} approved | {} rejected",
        summary.total, summary.pending, summary.recommended, summary.approved, summary.rejected
    );

    Ok(())
}

fn demo_draft(
    leave_type: LeaveType,
    from_date: NaiveDate,
    to_date: NaiveDate,
    session: Session,
    reason: &str,
) -> LeaveRequestDraft {
    LeaveRequestDraft {
        leave_type,
        from_date,
        to_date,
        session,
        reason: reason.to_string(),
        description: None,
    }
}

fn print_record(verb: &str, record: &LeaveRecord) {
    let recommender = record
        .recommended_by
        .map(|role| format!(" (recommended by {role})"))
        .unwrap_or_default();
    println!(
        "- {} {} {} {} -> {} [{}, {} day(s)] status {}{}",
        verb,
        record.id,
        record.leave_type,
        record.from_date,
        record.to_date,
        record.session,
        record.leave_value,
        record.status,
        recommender
    );
}
