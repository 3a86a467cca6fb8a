//! Agreement status rules.
//!
//! An agreement moves out of `Aberto` in exactly two ways:
//!
//! * any linked installment paid after the end of the due date breaks it (`Quebra`);
//! * otherwise, once every linked installment is paid it is `Concluído`.
//!
//! The due date is inclusive: a payment at 23:59:59.999 local time on the due
//! date is on time. "Local" is the business time zone from configuration.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::entities::{agreement::AgreementStatus, installment, InstallmentStatus};

/// The slice of an installment the evaluator looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentRecord {
    pub status: InstallmentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    pub fn open() -> Self {
        Self {
            status: InstallmentStatus::Open,
            paid_at: None,
        }
    }

    pub fn paid_at(at: DateTime<Utc>) -> Self {
        Self {
            status: InstallmentStatus::Paid,
            paid_at: Some(at),
        }
    }

    fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }
}

impl From<&installment::Model> for PaymentRecord {
    fn from(model: &installment::Model) -> Self {
        Self {
            status: model.status,
            paid_at: model.paid_at,
        }
    }
}

/// Outcome of evaluating one agreement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEvaluation {
    pub previous: AgreementStatus,
    pub status: AgreementStatus,
    pub paid_count: usize,
    pub installment_count: usize,
    pub is_late: bool,
    /// Past the deadline with installments still open. Never changes `status`.
    pub is_overdue: bool,
    pub deadline: DateTime<Utc>,
}

impl StatusEvaluation {
    pub fn changed(&self) -> bool {
        self.status != self.previous
    }

    pub fn fully_paid(&self) -> bool {
        self.installment_count > 0 && self.paid_count == self.installment_count
    }
}

/// Last instant (UTC) at which a payment still counts as on time.
///
/// Saturates at the ends of the representable range instead of overflowing.
pub fn deadline(due_date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    due_date
        .succ_opt()
        .and_then(|next| {
            next.and_time(NaiveTime::MIN)
                .checked_sub_signed(Duration::milliseconds(1))
        })
        .and_then(|local_end_of_day| {
            local_end_of_day
                .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        })
        .map(|utc_end_of_day| Utc.from_utc_datetime(&utc_end_of_day))
        .unwrap_or(if due_date.year() > 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}

/// Computes the status an agreement should have given its linked installments.
pub fn evaluate(
    current: AgreementStatus,
    due_date: NaiveDate,
    records: &[PaymentRecord],
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> StatusEvaluation {
    let deadline = deadline(due_date, offset);
    let installment_count = records.len();
    let paid_count = records.iter().filter(|r| r.is_paid()).count();
    let is_late = records
        .iter()
        .filter(|r| r.is_paid())
        .any(|r| matches!(r.paid_at, Some(at) if at > deadline));
    let fully_paid = installment_count > 0 && paid_count == installment_count;

    let status = if installment_count == 0 {
        current
    } else if is_late {
        AgreementStatus::Broken
    } else if fully_paid {
        AgreementStatus::Completed
    } else {
        current
    };

    StatusEvaluation {
        previous: current,
        status,
        paid_count,
        installment_count,
        is_late,
        is_overdue: now > deadline && !fully_paid,
        deadline,
    }
}
