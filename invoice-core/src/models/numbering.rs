/// Prefix for estimate numbers, e.g. `EST-000001`.
pub const ESTIMATE_PREFIX: &str = "EST";

/// Prefix for invoice numbers, e.g. `INV-000001`.
pub const INVOICE_PREFIX: &str = "INV";

/// Formats a human-facing document number as `PREFIX-` plus a zero-padded
/// six digit sequence. Sequences past 999999 simply grow wider.
pub fn format_document_number(
    prefix: &str,
    sequence: i64,
) -> String {
    format!("{prefix}-{sequence:06}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn pads_to_six_digits() {
        assert_eq!(format_document_number(ESTIMATE_PREFIX, 1), "EST-000001");
        assert_eq!(format_document_number(INVOICE_PREFIX, 4321), "INV-004321");
    }

    #[test]
    fn wide_sequences_are_not_truncated() {
        assert_eq!(format_document_number(INVOICE_PREFIX, 1_234_567), "INV-1234567");
    }
}
