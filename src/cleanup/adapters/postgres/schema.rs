//! Diesel schema for the deleted-record log.

diesel::table! {
    /// Parent-row deletion events appended by database triggers.
    loose_foreign_keys_deleted_records (id) {
        /// Monotonically increasing event identifier.
        id -> Int8,
        /// Schema-qualified name of the table the deleted row belonged to.
        #[max_length = 150]
        fully_qualified_table_name -> Varchar,
        /// Primary key value(s) of the deleted row; scalar keys persist as
        /// plain numbers, composite keys as arrays.
        primary_key_value -> Jsonb,
        /// Processing status (1 = pending, 2 = processed).
        status -> Int2,
        /// Capture timestamp.
        created_at -> Timestamptz,
    }
}
