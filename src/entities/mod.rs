pub mod agreement;
pub mod agreement_installment;
pub mod installment;

pub use agreement::AgreementStatus;
pub use installment::InstallmentStatus;
