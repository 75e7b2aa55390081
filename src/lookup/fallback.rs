//! Degraded record returned when a real lookup cannot complete.

use crate::lookup::error::FailureCause;
use crate::lookup::record::{AddressRecord, PostalCode};

/// Marker placed in street, neighborhood and city of a fallback record.
pub const UNAVAILABLE: &str = "Indisponível";

/// Region placeholder; no Brazilian state uses this code.
pub const UNKNOWN_REGION: &str = "NA";

/// Build the fallback record for `code`.
///
/// Total: it cannot fail, whatever the cause.
pub fn produce(code: &PostalCode, cause: &FailureCause) -> AddressRecord {
    // The breaker logs its trip at warn; short-circuited requests stay at debug.
    if *cause == FailureCause::BreakerOpen {
        tracing::debug!(cep = %code, cause = cause.kind(), "Returning fallback address");
    } else {
        tracing::warn!(
            cep = %code,
            cause = cause.kind(),
            error = %cause,
            "Returning fallback address"
        );
    }

    AddressRecord {
        code: Some(code.as_str().to_string()),
        street: Some(UNAVAILABLE.to_string()),
        neighborhood: Some(UNAVAILABLE.to_string()),
        city: Some(UNAVAILABLE.to_string()),
        region: Some(UNKNOWN_REGION.to_string()),
        ..AddressRecord::default()
    }
}

/// True if `record` was built by [`produce`].
pub fn is_fallback(record: &AddressRecord) -> bool {
    record.region.as_deref() == Some(UNKNOWN_REGION)
        && record.street.as_deref() == Some(UNAVAILABLE)
        && record.city.as_deref() == Some(UNAVAILABLE)
}
