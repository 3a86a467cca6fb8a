// Pure status rules shared by the payment flow
pub mod agreement_status;

pub mod agreements;
pub mod installments;

pub use agreements::{AgreementService, CreateAgreementInput};
pub use installments::{InstallmentService, PayInstallmentInput};
