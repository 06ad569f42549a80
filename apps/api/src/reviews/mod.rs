// Review records: one stored analysis per uploaded résumé, plus free-review usage per user.
// Persistence goes through the ReviewStore trait; handlers never touch the pool directly.

pub mod handlers;
pub mod models;
pub mod store;
