pub mod render_reference;
