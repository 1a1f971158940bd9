//! Database access. Each repository owns its table; derived fields (search
//! shadow fields, order numbers) are computed here, right before the write,
//! never by schema-side triggers.

pub mod orders;
pub mod products;
pub mod users;
