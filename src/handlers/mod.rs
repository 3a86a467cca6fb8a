pub mod agreements;
pub mod common;
pub mod health;
pub mod installments;

use crate::{
    db::DbPool,
    services::{AgreementService, InstallmentService},
};
use chrono::FixedOffset;
use std::sync::Arc;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub agreements: Arc<AgreementService>,
    pub installments: Arc<InstallmentService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, business_offset: FixedOffset) -> Self {
        Self {
            agreements: Arc::new(AgreementService::new(db_pool.clone())),
            installments: Arc::new(InstallmentService::new(db_pool, business_offset)),
        }
    }
}
