pub const K_KERNEL_NAME: &str = "TermOS";
pub const K_KERNEL_VERSION: &str = env!("CARGO_PKG_VERSION");
