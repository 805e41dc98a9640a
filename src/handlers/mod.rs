mod short_link;

pub use short_link::{create_handler, redirect_handler, stats_handler};
