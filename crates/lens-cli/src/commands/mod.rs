pub mod analyze;
pub mod dispatch;
pub mod highlight;
pub mod personas;
pub mod scan;
pub mod schema;
