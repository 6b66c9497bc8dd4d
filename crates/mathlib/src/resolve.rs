use tracing::{debug, enabled, trace, Level};

use crate::error::{MathError, Result};
use crate::library::MathLibrary;
use crate::native::native_library;
use crate::value::Value;

/// Find the library able to operate on every one of `operands`.
///
/// Plain numeric operands short-circuit to the native library without
/// looking at any advertised library. Otherwise each operand that
/// advertises a library is tried in order, and the first library that
/// accepts all operands wins. No ranking is attempted between several
/// libraries that would all accept the set; when that happens the
/// alternatives are reported at debug level.
pub fn library_for(operands: &[&Value]) -> Result<&'static dyn MathLibrary> {
    if operands.iter().all(|v| v.is_native()) {
        trace!(operands = operands.len(), "native fast path");
        return Ok(native_library());
    }

    let accepts_all = |library: &dyn MathLibrary| operands.iter().all(|o| library.accepts(o));
    let mut advertised = operands.iter().filter_map(|o| o.advertised_library());

    let Some(chosen) = advertised.by_ref().find(|lib| accepts_all(*lib)) else {
        return Err(MathError::NoLibrary {
            operands: operands.iter().map(|o| o.describe()).collect(),
        });
    };
    trace!(library = chosen.name(), "resolved math library");

    if enabled!(Level::DEBUG) {
        let others: Vec<&'static str> = advertised
            .filter(|lib| lib.name() != chosen.name() && accepts_all(*lib))
            .map(|lib| lib.name())
            .collect();
        if !others.is_empty() {
            debug!(
                chosen = chosen.name(),
                ?others,
                "several math libraries accept these operands; using the first found"
            );
        }
    }

    Ok(chosen)
}
