pub mod compute_kernel;
