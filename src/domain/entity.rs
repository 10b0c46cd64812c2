/// A record that lives in an entity list and is addressed by id.
pub trait Entity: Clone + Send + Sync + 'static {
    // ---
    /// Label used in logs and metrics, e.g. `"report"`.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Overwrites the id. Used to tag optimistic placeholders.
    fn set_id(&mut self, id: String);
}
