// All repository functions are generic over `E: Executor<'e, Database = Postgres>`
// so they accept both a `&PgPool` (direct query) and a `&mut Transaction` (atomic operations).

pub mod assignment;
pub mod attempt;
pub mod confidence;
pub mod drill;
pub mod user;
