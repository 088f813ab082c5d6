use super::model::PracticeRecord;
use crate::normalize::compact_postcode;

// ---------------------------------------------------------------------------
// Postcode-prefix selection
// ---------------------------------------------------------------------------

/// Whether a record's postcode, with whitespace removed, starts with `prefix`.
/// Records without a postcode never match.
pub fn matches_prefix(record: &PracticeRecord, prefix: &str) -> bool {
    record
        .postcode
        .as_deref()
        .is_some_and(|postcode| compact_postcode(postcode).starts_with(prefix))
}

/// Records in the postcode area `prefix`, in their original order.
pub fn records_with_prefix<'a>(
    records: &'a [PracticeRecord],
    prefix: &str,
) -> Vec<&'a PracticeRecord> {
    records
        .iter()
        .filter(|record| matches_prefix(record, prefix))
        .collect()
}
