pub mod barber_profiles;
pub mod shop_profiles;
pub mod users;

/// Whether a query failed on a unique constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
