/// A registered identity. `nik` is the natural key (national ID number) and is
/// unique across the store; `id` is assigned once at creation and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: u64,
    pub nik: String,
    pub role: String,
    /// Generated credential, stored as issued.
    pub password: String,
}
