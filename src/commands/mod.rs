pub mod create_admin;
pub mod run;

pub use create_admin::handle_create_admin;
pub use run::handle_run;
