//! Licensing precondition.
//!
//! Entitlement lives outside this engine; the facade only consults it, once
//! per export, before any encoding work starts.

use crate::format::ExportFormat;

/// External entitlement check per format and tenant.
pub trait LicenseGate: Send + Sync {
    fn is_entitled(&self, format: ExportFormat, tenant_id: &str) -> bool;
}

/// Gate that entitles everything; the default for single-tenant deployments
/// and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl LicenseGate for AllowAll {
    fn is_entitled(&self, _format: ExportFormat, _tenant_id: &str) -> bool {
        true
    }
}
