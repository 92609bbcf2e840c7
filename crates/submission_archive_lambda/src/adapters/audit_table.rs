use submission_archive_core::contract::AuditRecord;

pub trait AuditTable {
    fn put_record(&self, table: &str, record: &AuditRecord) -> Result<(), String>;
}
