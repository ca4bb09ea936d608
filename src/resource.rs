#[derive(Clone, Copy, Debug)]
pub struct ResourceLimiter {
    pub max_messages: usize,
    pub max_participants: usize,
    pub max_text_length: usize,
    pub max_name_length: usize,
    pub max_script_bytes: usize,
}

impl Default for ResourceLimiter {
    fn default() -> Self {
        Self {
            max_messages: 10_000,
            max_participants: 256,
            max_text_length: 4_096,
            max_name_length: 128,
            max_script_bytes: 512 * 1024,
        }
    }
}

/// Byte accounting for script content checked against `max_script_bytes`.
pub(crate) trait StringBudget {
    fn string_bytes(&self) -> usize;
}
