pub mod render_failure;
